//! The repair pipeline: coordinate map, imports, resolver, and the engine.
//!
//! # Key Components
//!
//! - [`context::MendContext`]: both graphs plus the name-keyed pairing between them
//! - [`imports::ModuleImports`]: per-target-module cross-module import tables
//! - [`resolver::TypeResolver`]: the pure cross-graph type resolver
//! - [`unstrip::MemberRestorer`]: the member-reconstruction engine
//! - [`collaborators`]: trait seams for stub generation, body filling and
//!   overload synthesis, with shipped defaults

pub mod collaborators;
pub mod context;
pub mod imports;
pub mod resolver;
pub mod unstrip;
