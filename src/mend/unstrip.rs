//! The member-reconstruction engine.
//!
//! Walks the reference graph type by type, method by method, in declaration
//! order, and synthesizes every member missing from the paired target type.
//! Signatures are rebuilt through the [`TypeResolver`]; anything that gives
//! members behavior is delegated to the collaborator seams.
//!
//! No failure in this engine is fatal: a method whose return type or any
//! parameter type cannot be resolved is skipped whole (no partial parameter
//! lists are ever emitted) and counted as ignored. Re-running over the same
//! graphs is safe: members that already exist are detected by name and
//! parameter-type-name sequence and never duplicated.

use std::sync::Arc;

use tracing::{info, trace};

use crate::mend::collaborators::{BodyFiller, IcallStubGenerator, OverloadSynthesizer};
use crate::mend::context::{MendContext, TypeContext};
use crate::mend::imports::ModuleImports;
use crate::mend::resolver::TypeResolver;
use crate::metadata::method::{
    GenericParamNode, MethodAccessFlags, MethodNode, MethodRc, ParamNode, PropertyNode,
    PropertyRc, METHOD_ACCESS_MASK,
};
use crate::metadata::token::TableKind;
use crate::metadata::typesystem::TypeRef;

/// Aggregate outcome of one reconstruction run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RestoreStats {
    /// Members synthesized into the target graph
    pub restored: usize,
    /// Methods skipped because part of their signature did not resolve
    pub ignored: usize,
}

/// Drives member synthesis over one (reference, target) graph pair
pub struct MemberRestorer<'a> {
    stubs: &'a dyn IcallStubGenerator,
    bodies: &'a dyn BodyFiller,
    overloads: &'a dyn OverloadSynthesizer,
}

impl<'a> MemberRestorer<'a> {
    /// Create an engine wired to the given collaborators
    pub fn new(
        stubs: &'a dyn IcallStubGenerator,
        bodies: &'a dyn BodyFiller,
        overloads: &'a dyn OverloadSynthesizer,
    ) -> Self {
        MemberRestorer {
            stubs,
            bodies,
            overloads,
        }
    }

    /// Run the reconstruction pass and return the accumulated counts.
    ///
    /// Enumeration order is fixed: assemblies, types and methods are visited
    /// in the declaration order captured when the graphs were built, so two
    /// runs over identical inputs synthesize identical member sequences.
    pub fn run(&self, context: &MendContext) -> RestoreStats {
        let mut stats = RestoreStats::default();

        for ref_asm in context.reference().assemblies() {
            let Some(actx) = context.assembly_by_ref_name(&ref_asm.name) else {
                continue;
            };
            let imports = actx.imports().clone();

            for ref_type in ref_asm.types() {
                let Some(tctx) = actx.type_by_ref_name(&ref_type.fullname()) else {
                    continue;
                };

                for (_, ref_method) in ref_type.methods.iter() {
                    self.restore_method(context, &tctx, ref_method, &imports, &mut stats);
                }
            }
        }

        info!(count = stats.restored, "restored methods");
        info!(count = stats.ignored, "failed to restore methods");
        stats
    }

    fn restore_method(
        &self,
        context: &MendContext,
        tctx: &TypeContext,
        ref_method: &MethodRc,
        imports: &Arc<ModuleImports>,
        stats: &mut RestoreStats,
    ) {
        let is_icall = ref_method.is_internal_call();
        if ref_method.is_constructor() {
            return;
        }
        if ref_method.is_abstract() {
            return;
        }
        // a bodyless non-icall method cannot be restored faithfully
        if !ref_method.has_body() && !is_icall {
            return;
        }
        if tctx
            .target
            .method_by_signature(&ref_method.name, &ref_method.param_type_names())
            .is_some()
        {
            return;
        }

        let resolver = TypeResolver::new(context, imports);

        // a member synthesized by an earlier run stores target-coordinate
        // parameter names; compare the translated signature too before
        // concluding the member is missing
        let translated: Option<Vec<String>> = ref_method
            .params
            .iter()
            .map(|(_, p)| resolver.resolve(&p.param_type).map(|t| t.full_name()))
            .collect();
        if let Some(names) = translated {
            if tctx
                .target
                .method_by_signature(&ref_method.name, &names)
                .is_some()
            {
                return;
            }
        }

        let Some(return_type) = resolver.resolve(&ref_method.return_type) else {
            trace!(
                method = %ref_method,
                declaring_type = %tctx.reference.fullname(),
                return_type = %ref_method.return_type,
                "method has unsupported return type"
            );
            stats.ignored += 1;
            return;
        };

        // stripped targets must be at least as accessible as they were
        // before, so the access mask is forced to public
        let flags = (ref_method.flags & !METHOD_ACCESS_MASK) | MethodAccessFlags::PUBLIC.bits();
        let new_method = MethodNode::new(
            imports.module().alloc(TableKind::Method),
            ref_method.name.clone(),
            flags,
            ref_method.impl_flags,
            ref_method.semantics,
            return_type,
        );

        for (_, ref_param) in ref_method.params.iter() {
            let Some(param_type) = resolver.resolve(&ref_param.param_type) else {
                trace!(
                    method = %ref_method,
                    declaring_type = %tctx.reference.fullname(),
                    parameter = %ref_param.param_type,
                    "method has unsupported parameter type"
                );
                stats.ignored += 1;
                return;
            };
            new_method.push_param(ParamNode {
                name: ref_param.name.clone(),
                flags: ref_param.flags,
                param_type,
            });
        }

        for (_, ref_gp) in ref_method.generic_params.iter() {
            let new_gp = GenericParamNode::new(ref_gp.name.clone(), ref_gp.number, ref_gp.flags);
            for (_, constraint) in ref_gp.constraints.iter() {
                // redundant with the parameter's own value-type flag
                if constraint.full_name() == "System.ValueType" {
                    continue;
                }
                // interface constraints are not re-emitted
                if constraint.is_interface() {
                    continue;
                }
                if let Some(resolved) = resolver.resolve(constraint) {
                    new_gp.constraints.push(resolved);
                }
            }
            new_method.push_generic_param(Arc::new(new_gp));
        }

        let new_method = Arc::new(new_method);
        if is_icall {
            tctx.target.push_method(&new_method);
            self.stubs.generate(ref_method, &new_method, tctx, imports);
        } else {
            self.bodies.push(ref_method, &new_method, tctx, imports);
            tctx.target.push_method(&new_method);
        }

        if ref_method.is_getter() {
            if let Some(property) = self.find_or_create_property(tctx, ref_method, &new_method, imports) {
                property.set_getter(&new_method);
            }
        } else if ref_method.is_setter() {
            if let Some(property) = self.find_or_create_property(tctx, ref_method, &new_method, imports) {
                property.set_setter(&new_method);
            }
        }

        if let Some(extra) =
            self.overloads
                .synthesize(ref_method, &new_method, imports, &|ty| resolver.resolve(ty))
        {
            tctx.target.push_method(&extra);
        }

        stats.restored += 1;
    }

    /// Locate the target property the accessor belongs to, creating it if
    /// this is the first accessor restored. Matching is by name and
    /// parameter-type-name sequence against the reference property's indexer
    /// parameters.
    fn find_or_create_property(
        &self,
        tctx: &TypeContext,
        ref_method: &MethodRc,
        new_method: &MethodRc,
        imports: &Arc<ModuleImports>,
    ) -> Option<PropertyRc> {
        let ref_property = tctx.reference.properties.iter().find_map(|(_, p)| {
            let owns = p.getter().is_some_and(|g| g.token == ref_method.token)
                || p.setter().is_some_and(|s| s.token == ref_method.token);
            owns.then(|| p.clone())
        })?;

        let ref_param_names = ref_property.param_type_names();
        if let Some(existing) = tctx
            .target
            .property_by_identity(&ref_property.name, &ref_param_names)
        {
            return Some(existing);
        }

        let param_count = new_method.params.count();
        let (property_type, indexer_arity) = if ref_method.is_getter() {
            (new_method.return_type.clone(), param_count)
        } else {
            let value_index = param_count.checked_sub(1)?;
            (
                new_method.params.get(value_index)?.param_type.clone(),
                value_index,
            )
        };
        let params: Vec<TypeRef> = new_method
            .params
            .iter()
            .filter(|(i, _)| *i < indexer_arity)
            .map(|(_, p)| p.param_type.clone())
            .collect();

        let property = Arc::new(PropertyNode::new(
            imports.module().alloc(TableKind::Property),
            ref_property.name.clone(),
            0,
            property_type,
            params,
        ));
        tctx.target.push_property(&property);
        Some(property)
    }
}
