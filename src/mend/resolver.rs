//! The cross-graph type resolver.
//!
//! Translates a type reference spelled in the reference graph's coordinate
//! space into the equivalent reference in the target graph's coordinate
//! space, or proves it unresolvable. Resolution is a pure function: it never
//! mutates either graph, and every reference it returns is target-native.
//!
//! Unresolvable comes in two kinds, both answered with `None` rather than an
//! error: shapes this resolver does not model (bare generic parameters,
//! multi-dimensional arrays) and well-shaped references naming an assembly,
//! type, or nested type the target graph does not contain.

use crate::mend::context::MendContext;
use crate::mend::imports::ModuleImports;
use crate::metadata::typesystem::{CilTypeNodeRc, TypeRef};

/// Resolves reference-graph type references against one destination module.
///
/// The destination module matters: every successful top-level resolution is
/// passed through that module's [`ModuleImports`] so the returned reference
/// is usable where the caller needs it.
pub struct TypeResolver<'a> {
    context: &'a MendContext,
    imports: &'a ModuleImports,
}

impl<'a> TypeResolver<'a> {
    /// Create a resolver emitting references for the module behind `imports`
    #[must_use]
    pub fn new(context: &'a MendContext, imports: &'a ModuleImports) -> Self {
        TypeResolver { context, imports }
    }

    /// Resolve `ty` into the target graph and import the result into the
    /// destination module. `None` means unsupported or unresolvable.
    #[must_use]
    pub fn resolve(&self, ty: &TypeRef) -> Option<TypeRef> {
        self.resolve_ext(ty, false)
    }

    /// Like [`TypeResolver::resolve`], with value types resolved as their
    /// wrapped reference-type counterparts instead of being imported from
    /// the core library.
    #[must_use]
    pub fn resolve_ext(&self, ty: &TypeRef, resolve_value_types: bool) -> Option<TypeRef> {
        let resolved = self.resolve_raw_ext(ty, resolve_value_types)?;
        Some(self.imports.import(&resolved))
    }

    /// Resolve without the final cross-module import step
    #[must_use]
    pub fn resolve_raw(&self, ty: &TypeRef) -> Option<TypeRef> {
        self.resolve_raw_ext(ty, false)
    }

    /// Resolve without the final cross-module import step, optionally
    /// treating value types as reference types
    #[must_use]
    pub fn resolve_raw_ext(&self, ty: &TypeRef, resolve_value_types: bool) -> Option<TypeRef> {
        match ty {
            TypeRef::ByRef(element) => {
                let element = self.resolve(element)?;
                Some(TypeRef::byref(element))
            }

            // Bare generic parameters have no mapping here: the equivalent
            // parameter would live on the not-yet-built target member, so the
            // reference is refused and the caller skips the whole member.
            TypeRef::GenericParameter { .. } => None,

            TypeRef::Array { element, rank } => {
                if *rank != 1 {
                    return None;
                }
                let element = self.resolve_ext(element, resolve_value_types)?;
                if element.full_name() == "System.String" {
                    return Some(self.imports.string_array());
                }
                let container = if element.is_value_type() {
                    self.imports.value_array()
                } else {
                    self.imports.reference_array()
                };
                Some(TypeRef::generic_instance(container, vec![element]))
            }

            TypeRef::Nested { outer, name, .. } => {
                let outer = self.resolve_raw_ext(outer, resolve_value_types)?;
                let outer_node = self.find_target_node(&outer)?;
                let nested = outer_node.nested_by_name(name)?;
                Some(TypeRef::nested(outer, nested.name.clone(), nested.flavor))
            }

            TypeRef::Pointer(element) => {
                let element = self.resolve_ext(element, resolve_value_types)?;
                Some(TypeRef::pointer(element))
            }

            TypeRef::GenericInstance { base, args } => {
                let base = self.resolve_raw_ext(base, resolve_value_types)?;
                let mut resolved_args = Vec::with_capacity(args.len());
                for arg in args {
                    resolved_args.push(self.resolve(arg)?);
                }
                Some(TypeRef::generic_instance(base, resolved_args))
            }

            TypeRef::Simple { assembly, namespace, name, .. } => {
                self.resolve_simple(ty, assembly, namespace, name, resolve_value_types)
            }
        }
    }

    fn resolve_simple(
        &self,
        ty: &TypeRef,
        assembly: &str,
        namespace: &str,
        name: &str,
        resolve_value_types: bool,
    ) -> Option<TypeRef> {
        let scope = assembly.strip_suffix(".dll").unwrap_or(assembly);
        let full_name = ty.full_name();

        // Core-library short-circuit: primitive and value types are spelled
        // identically in both graphs, so a graph walk is unnecessary and
        // sometimes fails for them.
        if (scope == "mscorlib" || scope == "netstandard")
            && ((!resolve_value_types && (ty.is_value_type() || full_name == "System.String"))
                || full_name == "System.Void"
                || ty.is_primitive())
            && full_name != "System.RuntimeTypeHandle"
        {
            return Some(self.imports.import_corlib(namespace, name));
        }

        // One engine-host assembly may have been split into several target
        // modules; scan them in registration order, first match wins.
        if scope == self.context.engine_prefix() {
            for actx in self.context.assemblies() {
                if !actx.target.name.starts_with(self.context.engine_prefix()) {
                    continue;
                }
                if let Some(tctx) = actx.type_by_ref_name(&full_name) {
                    return Some(tctx.target.as_type_ref(&actx.target.name));
                }
            }
        }

        let actx = self.context.assembly_by_ref_name(scope)?;
        let tctx = actx.type_by_ref_name(&full_name)?;
        Some(tctx.target.as_type_ref(&actx.target.name))
    }

    /// Walk a target-coordinate reference back to the node it names, for
    /// nested-type scans
    fn find_target_node(&self, ty: &TypeRef) -> Option<CilTypeNodeRc> {
        match ty {
            TypeRef::Simple { assembly, .. } => {
                let asm = self.context.target().assembly_by_name(assembly)?;
                asm.type_by_fullname(&ty.full_name())
            }
            TypeRef::Nested { outer, name, .. } => {
                self.find_target_node(outer)?.nested_by_name(name)
            }
            _ => None,
        }
    }
}
