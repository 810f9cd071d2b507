//! The metadata graph arenas.
//!
//! A [`MetadataGraph`] owns an ordered set of [`AssemblyNode`]s; each assembly
//! owns its types in token-ordered primary storage with a full-name secondary
//! index. Two graphs exist per repair run: the read-only **reference graph**
//! (the complete build) and the append-only **target graph** (the stripped
//! build being repaired). Nodes are never shared between the two; everything
//! crossing the boundary is spelled as a name-carrying [`TypeRef`].
//!
//! # Architecture
//!
//! - **Primary storage**: token-ordered skip list; tokens are allocated
//!   sequentially, so iteration order is declaration order
//! - **Secondary indices**: hash maps for name-based lookup
//! - **Ownership**: `Arc` nodes, weak references for nesting back-edges

use std::sync::Arc;

use crossbeam_skiplist::SkipMap;
use dashmap::{mapref::entry::Entry, DashMap};

use crate::metadata::token::{TableKind, Token, TokenAllocator};
use crate::metadata::typesystem::{CilTypeNode, CilTypeNodeRc, TypeFlavor};
use crate::{Error, Result};

/// Reference to an `AssemblyNode`
pub type AssemblyRc = Arc<AssemblyNode>;

/// One assembly inside a metadata graph.
///
/// Owns every type defined in the assembly (top-level and nested) and hands
/// out tokens for new rows. Lookup by full name covers top-level types only;
/// nested types are reached through their enclosing type.
pub struct AssemblyNode {
    /// Assembly identity, file extension stripped
    pub name: String,
    /// Primary type storage indexed by metadata tokens
    types: SkipMap<Token, CilTypeNodeRc>,
    /// Secondary index: top-level types by full name (namespace.name)
    by_fullname: DashMap<String, Token>,
    /// Row allocation for every table in this assembly
    alloc: TokenAllocator,
}

impl AssemblyNode {
    /// Create an empty assembly
    pub fn new(name: impl Into<String>) -> AssemblyRc {
        Arc::new(AssemblyNode {
            name: name.into(),
            types: SkipMap::new(),
            by_fullname: DashMap::new(),
            alloc: TokenAllocator::new(),
        })
    }

    /// Allocate the next row in `kind` for this assembly
    #[must_use]
    pub fn alloc(&self, kind: TableKind) -> Token {
        self.alloc.next(kind)
    }

    /// Define a new top-level type.
    ///
    /// # Errors
    /// Returns [`Error::TypeInsert`] if a type with the same full name is
    /// already defined in this assembly.
    pub fn define_type(
        &self,
        namespace: &str,
        name: &str,
        flavor: TypeFlavor,
        flags: u32,
    ) -> Result<CilTypeNodeRc> {
        let token = self.alloc.next(TableKind::TypeDef);
        let node = Arc::new(CilTypeNode::new(
            token,
            namespace.to_string(),
            name.to_string(),
            flavor,
            flags,
            false,
        ));

        match self.by_fullname.entry(node.fullname()) {
            Entry::Occupied(_) => return Err(Error::TypeInsert(token)),
            Entry::Vacant(entry) => {
                entry.insert(token);
            }
        }

        self.types.insert(token, node.clone());
        Ok(node)
    }

    /// Define a new type nested inside `outer`. The assembly keeps strong
    /// ownership; `outer` records a weak back-edge.
    pub fn define_nested(
        &self,
        outer: &CilTypeNodeRc,
        name: &str,
        flavor: TypeFlavor,
        flags: u32,
    ) -> CilTypeNodeRc {
        let token = self.alloc.next(TableKind::TypeDef);
        let node = Arc::new(CilTypeNode::new(
            token,
            String::new(),
            name.to_string(),
            flavor,
            flags,
            true,
        ));

        self.types.insert(token, node.clone());
        outer.push_nested(&node);
        node
    }

    /// Look up a top-level type by full name
    #[must_use]
    pub fn type_by_fullname(&self, full_name: &str) -> Option<CilTypeNodeRc> {
        let token = *self.by_fullname.get(full_name)?;
        self.type_by_token(token)
    }

    /// Look up any type by token
    #[must_use]
    pub fn type_by_token(&self, token: Token) -> Option<CilTypeNodeRc> {
        self.types.get(&token).map(|entry| entry.value().clone())
    }

    /// Top-level types in declaration order
    #[must_use]
    pub fn types(&self) -> Vec<CilTypeNodeRc> {
        self.types
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|t| !t.nested)
            .collect()
    }

    /// Number of types defined in this assembly, nested included
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }
}

/// An ordered set of assemblies forming one metadata graph
pub struct MetadataGraph {
    assemblies: boxcar::Vec<AssemblyRc>,
    by_name: DashMap<String, AssemblyRc>,
}

impl MetadataGraph {
    /// Create an empty graph
    #[must_use]
    pub fn new() -> Self {
        MetadataGraph {
            assemblies: boxcar::Vec::new(),
            by_name: DashMap::new(),
        }
    }

    /// Add an assembly to the graph.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateAssembly`] if the name is already taken.
    pub fn add_assembly(&self, name: impl Into<String>) -> Result<AssemblyRc> {
        let name = name.into();
        let assembly = AssemblyNode::new(name.clone());
        match self.by_name.entry(name) {
            Entry::Occupied(entry) => return Err(Error::DuplicateAssembly(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(assembly.clone());
            }
        }

        self.assemblies.push(assembly.clone());
        Ok(assembly)
    }

    /// Look up an assembly by identity
    #[must_use]
    pub fn assembly_by_name(&self, name: &str) -> Option<AssemblyRc> {
        self.by_name.get(name).map(|entry| entry.value().clone())
    }

    /// Assemblies in registration order
    #[must_use]
    pub fn assemblies(&self) -> Vec<AssemblyRc> {
        self.assemblies.iter().map(|(_, a)| a.clone()).collect()
    }
}

impl Default for MetadataGraph {
    fn default() -> Self {
        Self::new()
    }
}
