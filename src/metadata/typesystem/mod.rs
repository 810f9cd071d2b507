//! Type system for the repair graphs.
//!
//! This module provides the structural type-reference grammar shared by both
//! graphs, the type nodes the graphs own, and the builders that assemble them.
//!
//! # Key Components
//!
//! - [`TypeRef`]: structural description of a type reference (shape, not identity)
//! - [`TypeFlavor`]: classification carried on every named reference
//! - [`CilTypeNode`]: a type definition with append-only member lists
//! - [`TypeBuilder`], [`MethodBuilder`], [`PropertyBuilder`]: fluent node construction

mod base;
mod builder;
mod node;

pub use base::{TypeFlavor, TypeRef};
pub use builder::{MethodBuilder, PropertyBuilder, TypeBuilder};
pub use node::{CilTypeNode, CilTypeNodeRc, TypeAttributes, TypeNodeRef, TypeNodeRefList};
