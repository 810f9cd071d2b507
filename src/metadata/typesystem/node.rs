//! Type nodes and the weak reference handle used between them.

use std::sync::{Arc, Weak};

use bitflags::bitflags;

use crate::metadata::method::{FieldList, FieldRc, MethodList, MethodRc, PropertyList, PropertyRc};
use crate::metadata::token::Token;
use crate::metadata::typesystem::{TypeFlavor, TypeRef};

/// Reference to a `CilTypeNode`
pub type CilTypeNodeRc = Arc<CilTypeNode>;
/// A vector that holds `TypeNodeRef` instances (weak references)
pub type TypeNodeRefList = Arc<boxcar::Vec<TypeNodeRef>>;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Type attribute flags
    pub struct TypeAttributes: u32 {
        /// Type is visible outside the assembly
        const PUBLIC = 0x0001;
        /// Nested type, visible outside the enclosing type
        const NESTED_PUBLIC = 0x0002;
        /// Nested type, visible only to the enclosing type
        const NESTED_PRIVATE = 0x0003;
        /// Type is an interface
        const INTERFACE = 0x0020;
        /// Type is abstract
        const ABSTRACT = 0x0080;
        /// Type cannot be derived from
        const SEALED = 0x0100;
        /// Type name is special
        const SPECIAL_NAME = 0x0400;
    }
}

/// A smart reference to a `CilTypeNode` that automatically handles weak
/// references to prevent circular reference memory leaks while providing a
/// clean API
#[derive(Clone)]
pub struct TypeNodeRef {
    weak_ref: Weak<CilTypeNode>,
}

impl TypeNodeRef {
    /// Create a new `TypeNodeRef` from a strong reference
    #[must_use]
    pub fn new(strong_ref: &CilTypeNodeRc) -> Self {
        TypeNodeRef {
            weak_ref: Arc::downgrade(strong_ref),
        }
    }

    /// Get a strong reference to the type, returning None if the type has
    /// been dropped
    #[must_use]
    pub fn upgrade(&self) -> Option<CilTypeNodeRc> {
        self.weak_ref.upgrade()
    }

    /// Get the name of the referenced type (if still alive)
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.upgrade().map(|t| t.name.clone())
    }
}

impl From<CilTypeNodeRc> for TypeNodeRef {
    fn from(strong_ref: CilTypeNodeRc) -> Self {
        Self::new(&strong_ref)
    }
}

/// A type definition owned by one graph.
///
/// Member lists are append-only: synthesized members are pushed by the
/// reconstruction engine and never removed. Nested types are held weakly;
/// strong ownership of every node lives in the owning assembly's primary
/// storage.
pub struct CilTypeNode {
    /// Token
    pub token: Token,
    /// `TypeNamespace` (can be empty)
    pub namespace: String,
    /// `TypeName`
    pub name: String,
    /// Classification of this type
    pub flavor: TypeFlavor,
    /// Raw `TypeAttributes` word
    pub flags: u32,
    /// Whether this type is nested inside another type
    pub nested: bool,
    /// All methods this type has
    pub methods: MethodList,
    /// All fields this type has
    pub fields: FieldList,
    /// All properties this type has
    pub properties: PropertyList,
    /// All types that are 'contained' in this type
    pub nested_types: TypeNodeRefList,
}

impl CilTypeNode {
    /// Create a new instance of a `CilTypeNode`
    #[must_use]
    pub fn new(
        token: Token,
        namespace: String,
        name: String,
        flavor: TypeFlavor,
        flags: u32,
        nested: bool,
    ) -> Self {
        CilTypeNode {
            token,
            namespace,
            name,
            flavor,
            flags,
            nested,
            methods: Arc::new(boxcar::Vec::new()),
            fields: Arc::new(boxcar::Vec::new()),
            properties: Arc::new(boxcar::Vec::new()),
            nested_types: Arc::new(boxcar::Vec::new()),
        }
    }

    /// Returns the full name (Namespace.Name) of the entity
    #[must_use]
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{0}.{1}", self.namespace, self.name)
        }
    }

    /// A [`TypeRef`] naming this node from the given assembly scope
    #[must_use]
    pub fn as_type_ref(&self, scope: &str) -> TypeRef {
        TypeRef::simple(scope, self.namespace.clone(), self.name.clone(), self.flavor)
    }

    /// Append a method
    pub fn push_method(&self, method: &MethodRc) {
        self.methods.push(method.clone());
    }

    /// Append a field
    pub fn push_field(&self, field: FieldRc) {
        self.fields.push(field);
    }

    /// Append a property
    pub fn push_property(&self, property: &PropertyRc) {
        self.properties.push(property.clone());
    }

    /// Record `ty` as nested inside this type (weakly; the owning assembly
    /// keeps the strong reference)
    pub fn push_nested(&self, ty: &CilTypeNodeRc) {
        self.nested_types.push(TypeNodeRef::new(ty));
    }

    /// Look up a directly nested type by simple name
    #[must_use]
    pub fn nested_by_name(&self, name: &str) -> Option<CilTypeNodeRc> {
        self.nested_types
            .iter()
            .find_map(|(_, r)| r.upgrade().filter(|t| t.name == name))
    }

    /// Look up an existing method by name and parameter-type-name sequence.
    ///
    /// This is the pre-existence check the reconstruction engine uses to stay
    /// idempotent: type equality here is name-based, never identity-based.
    #[must_use]
    pub fn method_by_signature(&self, name: &str, param_type_names: &[String]) -> Option<MethodRc> {
        self.methods.iter().find_map(|(_, m)| {
            if m.name == name && m.param_type_names() == param_type_names {
                Some(m.clone())
            } else {
                None
            }
        })
    }

    /// Look up an existing property by name and parameter-type-name sequence
    #[must_use]
    pub fn property_by_identity(
        &self,
        name: &str,
        param_type_names: &[String],
    ) -> Option<PropertyRc> {
        self.properties.iter().find_map(|(_, p)| {
            if p.name == name && p.param_type_names() == param_type_names {
                Some(p.clone())
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::method::MethodNode;

    fn node(name: &str) -> CilTypeNode {
        CilTypeNode::new(
            Token::new(0x0200_0001),
            "Game".into(),
            name.into(),
            TypeFlavor::Class,
            TypeAttributes::PUBLIC.bits(),
            false,
        )
    }

    #[test]
    fn test_fullname() {
        assert_eq!(node("Player").fullname(), "Game.Player");
        let global = CilTypeNode::new(
            Token::new(0x0200_0002),
            String::new(),
            "Loose".into(),
            TypeFlavor::Class,
            0,
            false,
        );
        assert_eq!(global.fullname(), "Loose");
    }

    #[test]
    fn test_method_lookup_is_name_based() {
        let ty = node("Player");
        let int32 = TypeRef::simple("mscorlib", "System", "Int32", TypeFlavor::I4);
        let m = Arc::new(MethodNode::new(
            Token::new(0x0600_0001),
            "Damage".into(),
            0,
            0,
            0,
            int32.clone(),
        ));
        m.push_param(crate::metadata::method::ParamNode {
            name: "amount".into(),
            flags: 0,
            param_type: int32,
        });
        ty.push_method(&m);

        assert!(ty
            .method_by_signature("Damage", &["System.Int32".to_string()])
            .is_some());
        assert!(ty.method_by_signature("Damage", &[]).is_none());
        assert!(ty
            .method_by_signature("Heal", &["System.Int32".to_string()])
            .is_none());
    }

    #[test]
    fn test_nested_lookup() {
        let outer = Arc::new(node("Outer"));
        let inner: CilTypeNodeRc = Arc::new(CilTypeNode::new(
            Token::new(0x0200_0003),
            String::new(),
            "Inner".into(),
            TypeFlavor::Class,
            TypeAttributes::NESTED_PUBLIC.bits(),
            true,
        ));
        outer.push_nested(&inner);

        assert!(outer.nested_by_name("Inner").is_some());
        assert!(outer.nested_by_name("Missing").is_none());
    }
}
