//! The coordinate map pairing reference-graph names with target-graph nodes.
//!
//! A [`MendContext`] owns the two graphs of a repair run and the name-keyed
//! pairing between them. Pairings are registered by whatever built the target
//! graph (types may have been renamed or relocated there, so pairing is
//! knowledge the caller holds); [`MendContext::pair_by_name`] covers the
//! common case where identities survived stripping unchanged.
//!
//! All lookups are pure and keyed by *reference-graph* names: the engine walks
//! the reference graph and asks "where did this land in the target?".

use std::sync::Arc;

use dashmap::DashMap;

use crate::mend::imports::ModuleImports;
use crate::metadata::graph::{AssemblyRc, MetadataGraph};
use crate::metadata::typesystem::CilTypeNodeRc;

/// Default engine-host assembly identity. A reference assembly with this
/// identity may have been split over several target modules sharing the
/// prefix.
pub const ENGINE_HOST: &str = "UnityEngine";

/// One reference type paired with its target counterpart
pub struct TypeContext {
    /// The type as it exists in the reference graph
    pub reference: CilTypeNodeRc,
    /// The type shell in the target graph
    pub target: CilTypeNodeRc,
}

/// One reference assembly paired with its target counterpart
pub struct AssemblyContext {
    /// The assembly in the reference graph
    pub reference: AssemblyRc,
    /// The assembly in the target graph
    pub target: AssemblyRc,
    /// Pairs keyed by reference-graph full name
    types: DashMap<String, Arc<TypeContext>>,
    /// Import table of the target module
    imports: Arc<ModuleImports>,
}

impl AssemblyContext {
    fn new(reference: AssemblyRc, target: AssemblyRc) -> Self {
        let imports = Arc::new(ModuleImports::new(target.clone()));
        AssemblyContext {
            reference,
            target,
            types: DashMap::new(),
            imports,
        }
    }

    /// Pair a reference type with its target counterpart. Keyed by the
    /// reference type's full name.
    pub fn register_type(
        &self,
        reference: &CilTypeNodeRc,
        target: &CilTypeNodeRc,
    ) -> Arc<TypeContext> {
        let ctx = Arc::new(TypeContext {
            reference: reference.clone(),
            target: target.clone(),
        });
        self.types.insert(reference.fullname(), ctx.clone());
        ctx
    }

    /// Look up the pairing for a reference-graph full name
    #[must_use]
    pub fn type_by_ref_name(&self, full_name: &str) -> Option<Arc<TypeContext>> {
        self.types.get(full_name).map(|entry| entry.value().clone())
    }

    /// The import table of this pairing's target module
    #[must_use]
    pub fn imports(&self) -> &Arc<ModuleImports> {
        &self.imports
    }
}

/// Global context of one repair run: both graphs plus the coordinate map
pub struct MendContext {
    reference: Arc<MetadataGraph>,
    target: Arc<MetadataGraph>,
    assemblies: boxcar::Vec<Arc<AssemblyContext>>,
    by_ref_name: DashMap<String, Arc<AssemblyContext>>,
    engine_prefix: String,
}

impl MendContext {
    /// Create a context over a reference graph and the target graph to repair
    #[must_use]
    pub fn new(reference: Arc<MetadataGraph>, target: Arc<MetadataGraph>) -> Self {
        MendContext {
            reference,
            target,
            assemblies: boxcar::Vec::new(),
            by_ref_name: DashMap::new(),
            engine_prefix: ENGINE_HOST.to_string(),
        }
    }

    /// Override the engine-host identity prefix
    #[must_use]
    pub fn with_engine_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.engine_prefix = prefix.into();
        self
    }

    /// The complete reference graph
    #[must_use]
    pub fn reference(&self) -> &Arc<MetadataGraph> {
        &self.reference
    }

    /// The stripped target graph being repaired
    #[must_use]
    pub fn target(&self) -> &Arc<MetadataGraph> {
        &self.target
    }

    /// The engine-host identity prefix used by the resolver's fallback scan
    #[must_use]
    pub fn engine_prefix(&self) -> &str {
        &self.engine_prefix
    }

    /// Pair a reference assembly with its target counterpart. Keyed by the
    /// reference assembly's identity; pairings enumerate in registration
    /// order.
    pub fn register(&self, reference: &AssemblyRc, target: &AssemblyRc) -> Arc<AssemblyContext> {
        let ctx = Arc::new(AssemblyContext::new(reference.clone(), target.clone()));
        self.assemblies.push(ctx.clone());
        self.by_ref_name.insert(reference.name.clone(), ctx.clone());
        ctx
    }

    /// Look up the pairing for a reference-graph assembly identity
    #[must_use]
    pub fn assembly_by_ref_name(&self, name: &str) -> Option<Arc<AssemblyContext>> {
        self.by_ref_name.get(name).map(|entry| entry.value().clone())
    }

    /// Assembly pairings in registration order
    #[must_use]
    pub fn assemblies(&self) -> Vec<Arc<AssemblyContext>> {
        self.assemblies.iter().map(|(_, c)| c.clone()).collect()
    }

    /// Pair every same-named assembly, and within each pair every same-named
    /// top-level type. Assemblies and types already paired are left alone.
    pub fn pair_by_name(&self) {
        for ref_asm in self.reference.assemblies() {
            let actx = match self.assembly_by_ref_name(&ref_asm.name) {
                Some(existing) => existing,
                None => match self.target.assembly_by_name(&ref_asm.name) {
                    Some(target_asm) => self.register(&ref_asm, &target_asm),
                    None => continue,
                },
            };

            for ref_type in ref_asm.types() {
                let full_name = ref_type.fullname();
                if actx.type_by_ref_name(&full_name).is_some() {
                    continue;
                }
                if let Some(target_type) = actx.target.type_by_fullname(&full_name) {
                    actx.register_type(&ref_type, &target_type);
                }
            }
        }
    }
}
