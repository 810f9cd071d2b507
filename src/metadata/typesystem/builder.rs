//! Fluent builders for assembling graph nodes.
//!
//! Graph loading is out of scope for this crate, so everything that needs a
//! populated graph (external loaders and the test suites alike) constructs
//! one through these builders.
//!
//! # Examples
//!
//! ```rust
//! use dotmend::metadata::graph::MetadataGraph;
//! use dotmend::metadata::typesystem::{MethodBuilder, TypeBuilder, TypeFlavor, TypeRef};
//!
//! let graph = MetadataGraph::new();
//! let asm = graph.add_assembly("Game.Core")?;
//! let player = TypeBuilder::new(&asm, "Player").namespace("Game").build()?;
//! MethodBuilder::new(&asm, &player, "GetHealth")
//!     .returns(TypeRef::simple("mscorlib", "System", "Int32", TypeFlavor::I4))
//!     .build();
//! # Ok::<(), dotmend::Error>(())
//! ```

use std::sync::Arc;

use crate::metadata::graph::AssemblyRc;
use crate::metadata::method::{
    MethodAccessFlags, MethodBody, MethodImplFlags, MethodModifiers, MethodNode, MethodRc,
    MethodSemantics, BodyKind, GenericParamNode, ParamNode, PropertyNode, PropertyRc,
};
use crate::metadata::token::TableKind;
use crate::metadata::typesystem::{CilTypeNodeRc, TypeAttributes, TypeFlavor, TypeRef};
use crate::Result;

fn corlib_void() -> TypeRef {
    TypeRef::simple("mscorlib", "System", "Void", TypeFlavor::Void)
}

/// Builder for type nodes
pub struct TypeBuilder<'a> {
    assembly: &'a AssemblyRc,
    namespace: String,
    name: String,
    flavor: TypeFlavor,
    flags: TypeAttributes,
    nested_in: Option<&'a CilTypeNodeRc>,
}

impl<'a> TypeBuilder<'a> {
    /// Start building a class named `name`
    pub fn new(assembly: &'a AssemblyRc, name: impl Into<String>) -> Self {
        TypeBuilder {
            assembly,
            namespace: String::new(),
            name: name.into(),
            flavor: TypeFlavor::Class,
            flags: TypeAttributes::PUBLIC,
            nested_in: None,
        }
    }

    /// Set the namespace
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set an explicit flavor
    #[must_use]
    pub fn flavor(mut self, flavor: TypeFlavor) -> Self {
        self.flavor = flavor;
        self
    }

    /// Make this a value type
    #[must_use]
    pub fn value_type(self) -> Self {
        self.flavor(TypeFlavor::ValueType)
    }

    /// Make this an interface
    #[must_use]
    pub fn interface(mut self) -> Self {
        self.flavor = TypeFlavor::Interface;
        self.flags |= TypeAttributes::INTERFACE | TypeAttributes::ABSTRACT;
        self
    }

    /// Replace the attribute flags
    #[must_use]
    pub fn flags(mut self, flags: TypeAttributes) -> Self {
        self.flags = flags;
        self
    }

    /// Nest the new type inside `outer`
    #[must_use]
    pub fn nested_in(mut self, outer: &'a CilTypeNodeRc) -> Self {
        self.nested_in = Some(outer);
        self
    }

    /// Define the type in its assembly.
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeInsert`] for a duplicate top-level full name.
    pub fn build(self) -> Result<CilTypeNodeRc> {
        match self.nested_in {
            Some(outer) => Ok(self.assembly.define_nested(
                outer,
                &self.name,
                self.flavor,
                self.flags.bits(),
            )),
            None => self.assembly.define_type(
                &self.namespace,
                &self.name,
                self.flavor,
                self.flags.bits(),
            ),
        }
    }
}

/// Builder for method nodes
pub struct MethodBuilder<'a> {
    assembly: &'a AssemblyRc,
    ty: &'a CilTypeNodeRc,
    name: String,
    access: MethodAccessFlags,
    modifiers: MethodModifiers,
    impl_flags: MethodImplFlags,
    semantics: MethodSemantics,
    return_type: TypeRef,
    params: Vec<ParamNode>,
    generic_params: Vec<(String, u32, Vec<TypeRef>)>,
    managed_body: bool,
}

impl<'a> MethodBuilder<'a> {
    /// Start building a public method named `name` returning void, with an
    /// ordinary managed body
    pub fn new(assembly: &'a AssemblyRc, ty: &'a CilTypeNodeRc, name: impl Into<String>) -> Self {
        MethodBuilder {
            assembly,
            ty,
            name: name.into(),
            access: MethodAccessFlags::PUBLIC,
            modifiers: MethodModifiers::HIDE_BY_SIG,
            impl_flags: MethodImplFlags::empty(),
            semantics: MethodSemantics::empty(),
            return_type: corlib_void(),
            params: Vec::new(),
            generic_params: Vec::new(),
            managed_body: true,
        }
    }

    /// Set the return type
    #[must_use]
    pub fn returns(mut self, return_type: TypeRef) -> Self {
        self.return_type = return_type;
        self
    }

    /// Append a parameter
    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>, param_type: TypeRef) -> Self {
        self.params.push(ParamNode {
            name: name.into(),
            flags: 0,
            param_type,
        });
        self
    }

    /// Append a parameter with explicit direction flags
    #[must_use]
    pub fn parameter_with_flags(
        mut self,
        name: impl Into<String>,
        param_type: TypeRef,
        flags: u32,
    ) -> Self {
        self.params.push(ParamNode {
            name: name.into(),
            flags,
            param_type,
        });
        self
    }

    /// Set the access level
    #[must_use]
    pub fn access(mut self, access: MethodAccessFlags) -> Self {
        self.access = access;
        self
    }

    /// Make the method private
    #[must_use]
    pub fn private(self) -> Self {
        self.access(MethodAccessFlags::PRIVATE)
    }

    /// Add modifier flags
    #[must_use]
    pub fn modifiers(mut self, modifiers: MethodModifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    /// Mark the method abstract (implies no body)
    #[must_use]
    pub fn abstract_method(mut self) -> Self {
        self.modifiers |= MethodModifiers::ABSTRACT;
        self.managed_body = false;
        self
    }

    /// Mark the method as a runtime-internal call (no managed body)
    #[must_use]
    pub fn internal_call(mut self) -> Self {
        self.impl_flags |= MethodImplFlags::INTERNAL_CALL;
        self.managed_body = false;
        self
    }

    /// Strip the managed body, as the AOT pipeline would
    #[must_use]
    pub fn no_body(mut self) -> Self {
        self.managed_body = false;
        self
    }

    /// Mark the method as a property getter
    #[must_use]
    pub fn getter(mut self) -> Self {
        self.semantics |= MethodSemantics::GETTER;
        self.modifiers |= MethodModifiers::SPECIAL_NAME;
        self
    }

    /// Mark the method as a property setter
    #[must_use]
    pub fn setter(mut self) -> Self {
        self.semantics |= MethodSemantics::SETTER;
        self.modifiers |= MethodModifiers::SPECIAL_NAME;
        self
    }

    /// Declare a generic parameter with constraint types
    #[must_use]
    pub fn generic(
        mut self,
        name: impl Into<String>,
        flags: u32,
        constraints: Vec<TypeRef>,
    ) -> Self {
        self.generic_params.push((name.into(), flags, constraints));
        self
    }

    /// Define the method and append it to its type
    pub fn build(self) -> MethodRc {
        let token = self.assembly.alloc(TableKind::Method);
        let method = MethodNode::new(
            token,
            self.name,
            self.access.bits() | self.modifiers.bits(),
            self.impl_flags.bits(),
            self.semantics.bits(),
            self.return_type,
        );
        for param in self.params {
            method.push_param(param);
        }
        for (number, (name, flags, constraints)) in self.generic_params.into_iter().enumerate() {
            let gp = GenericParamNode::new(name, number as u32, flags);
            for constraint in constraints {
                gp.constraints.push(constraint);
            }
            method.push_generic_param(Arc::new(gp));
        }
        if self.managed_body {
            method.set_body(MethodBody {
                kind: BodyKind::Managed,
            });
        }

        let method = Arc::new(method);
        self.ty.push_method(&method);
        method
    }
}

/// Builder for property nodes
pub struct PropertyBuilder<'a> {
    assembly: &'a AssemblyRc,
    ty: &'a CilTypeNodeRc,
    name: String,
    property_type: Option<TypeRef>,
    params: Vec<TypeRef>,
    getter: Option<MethodRc>,
    setter: Option<MethodRc>,
}

impl<'a> PropertyBuilder<'a> {
    /// Start building a property named `name`
    pub fn new(assembly: &'a AssemblyRc, ty: &'a CilTypeNodeRc, name: impl Into<String>) -> Self {
        PropertyBuilder {
            assembly,
            ty,
            name: name.into(),
            property_type: None,
            params: Vec::new(),
            getter: None,
            setter: None,
        }
    }

    /// Set the declared property type
    #[must_use]
    pub fn property_type(mut self, property_type: TypeRef) -> Self {
        self.property_type = Some(property_type);
        self
    }

    /// Append an indexer parameter type
    #[must_use]
    pub fn index_param(mut self, param_type: TypeRef) -> Self {
        self.params.push(param_type);
        self
    }

    /// Attach the getter method
    #[must_use]
    pub fn getter(mut self, method: &MethodRc) -> Self {
        self.getter = Some(method.clone());
        self
    }

    /// Attach the setter method
    #[must_use]
    pub fn setter(mut self, method: &MethodRc) -> Self {
        self.setter = Some(method.clone());
        self
    }

    /// Define the property and append it to its type. The declared type
    /// defaults to the getter's return type, then the setter's last
    /// parameter type.
    pub fn build(self) -> PropertyRc {
        let property_type = self
            .property_type
            .or_else(|| self.getter.as_ref().map(|g| g.return_type.clone()))
            .or_else(|| {
                self.setter.as_ref().and_then(|s| {
                    let count = s.params.count();
                    s.params.get(count.saturating_sub(1)).map(|p| p.param_type.clone())
                })
            })
            .unwrap_or_else(corlib_void);

        let token = self.assembly.alloc(TableKind::Property);
        let property = Arc::new(PropertyNode::new(
            token,
            self.name,
            0,
            property_type,
            self.params,
        ));
        if let Some(getter) = &self.getter {
            property.set_getter(getter);
        }
        if let Some(setter) = &self.setter {
            property.set_setter(setter);
        }

        self.ty.push_property(&property);
        property
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::graph::MetadataGraph;

    #[test]
    fn test_type_and_method_builders() -> Result<()> {
        let graph = MetadataGraph::new();
        let asm = graph.add_assembly("Game.Core")?;
        let player = TypeBuilder::new(&asm, "Player").namespace("Game").build()?;

        let int32 = TypeRef::simple("mscorlib", "System", "Int32", TypeFlavor::I4);
        let method = MethodBuilder::new(&asm, &player, "Damage")
            .returns(int32.clone())
            .parameter("amount", int32)
            .build();

        assert!(method.has_body());
        assert_eq!(method.params.count(), 1);
        assert!(player
            .method_by_signature("Damage", &["System.Int32".to_string()])
            .is_some());
        Ok(())
    }

    #[test]
    fn test_property_builder_infers_type_from_getter() -> Result<()> {
        let graph = MetadataGraph::new();
        let asm = graph.add_assembly("Game.Core")?;
        let player = TypeBuilder::new(&asm, "Player").namespace("Game").build()?;

        let int32 = TypeRef::simple("mscorlib", "System", "Int32", TypeFlavor::I4);
        let getter = MethodBuilder::new(&asm, &player, "get_Health")
            .returns(int32.clone())
            .getter()
            .build();
        let property = PropertyBuilder::new(&asm, &player, "Health")
            .getter(&getter)
            .build();

        assert_eq!(property.property_type, int32);
        assert!(property.setter().is_none());
        Ok(())
    }

    #[test]
    fn test_internal_call_has_no_body() -> Result<()> {
        let graph = MetadataGraph::new();
        let asm = graph.add_assembly("Game.Core")?;
        let player = TypeBuilder::new(&asm, "Player").namespace("Game").build()?;

        let icall = MethodBuilder::new(&asm, &player, "NativeTick")
            .internal_call()
            .build();
        assert!(!icall.has_body());
        assert!(icall.is_internal_call());
        Ok(())
    }
}
