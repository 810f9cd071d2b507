//! # dotmend Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! from the dotmend library. Import this module to get quick access to the
//! essential types for repairing stripped metadata graphs.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dotmend operations
pub use crate::Error;

/// The result type used throughout dotmend
pub use crate::Result;

// ================================================================================================
// Metadata System - Core Types
// ================================================================================================

/// Metadata token type for referencing table entries
pub use crate::metadata::token::{TableKind, Token};

/// The graph arenas
pub use crate::metadata::graph::{AssemblyNode, AssemblyRc, MetadataGraph};

/// Core type system components
pub use crate::metadata::typesystem::{
    CilTypeNode, CilTypeNodeRc, MethodBuilder, PropertyBuilder, TypeAttributes, TypeBuilder,
    TypeFlavor, TypeNodeRef, TypeRef,
};

/// Method, field and property nodes with their flag groups
pub use crate::metadata::method::{
    BodyKind, FieldNode, GenericParamFlags, GenericParamNode, MethodAccessFlags, MethodBody,
    MethodImplFlags, MethodModifiers, MethodNode, MethodRc, MethodSemantics, ParamFlags,
    ParamNode, PropertyNode, PropertyRc,
};

// ================================================================================================
// Repair Pipeline
// ================================================================================================

/// The coordinate map between the two graphs
pub use crate::mend::context::{AssemblyContext, MendContext, TypeContext, ENGINE_HOST};

/// Per-module import tables
pub use crate::mend::imports::{ModuleImports, WellKnownRefs, CORLIB};

/// The cross-graph type resolver
pub use crate::mend::resolver::TypeResolver;

/// The member-reconstruction engine
pub use crate::mend::unstrip::{MemberRestorer, RestoreStats};

/// Collaborator seams and their shipped defaults
pub use crate::mend::collaborators::{
    BodyFiller, DeferredBodyQueue, DelegateStubGenerator, IcallStubGenerator, NoOverloads,
    OverloadSynthesizer,
};
