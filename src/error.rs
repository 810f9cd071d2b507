use thiserror::Error;

use crate::metadata::token::Token;

/// The generic Error type, which provides coverage for all errors this library
/// can potentially return.
///
/// Note that the repair pass itself never fails: unresolvable references
/// degrade to skipped members, counted and reported by the engine. Errors
/// exist for misuse of the graph construction API.
#[derive(Error, Debug)]
pub enum Error {
    /// An assembly with the same identity is already registered in the graph.
    #[error("Assembly is already present in the graph - {0}")]
    DuplicateAssembly(String),

    /// Failed to insert a new type into the graph.
    ///
    /// The associated [`Token`] identifies which type caused the failure,
    /// typically a full-name collision with an existing type.
    #[error("Failed to insert new type into the graph - {0}")]
    TypeInsert(Token),

    /// Failed to find a type in the graph.
    ///
    /// The associated [`Token`] identifies which type was not found.
    #[error("Failed to find type in the graph - {0}")]
    TypeNotFound(Token),

    /// Generic error for miscellaneous graph construction failures.
    #[error("{0}")]
    GraphError(String),
}
