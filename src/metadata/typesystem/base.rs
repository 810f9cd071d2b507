//! Type flavors and the type-reference shape grammar.
//!
//! A [`TypeRef`] is a structural description of a type reference, not an
//! identity: it records how a type is spelled in one graph's coordinate space
//! (simple name, nesting, array, pointer, by-reference, generic instantiation,
//! or a bare generic parameter). References are immutable once constructed and
//! carry enough classification ([`TypeFlavor`]) to answer value-typeness and
//! interface-ness without touching a graph.
//!
//! Equality between references across graphs is always name-based: two
//! references denote "the same" type exactly when their full names match.

use std::fmt;

/// Fundamental classification of a type, carried on every named reference.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFlavor {
    // Base primitive types
    Void,
    Boolean,
    Char,
    I1,
    U1,
    I2,
    U2,
    I4,
    U4,
    I8,
    U8,
    R4,
    R8,
    I,
    U,
    Object,
    String,

    // Type categories
    Class,
    ValueType,
    Interface,
}

impl TypeFlavor {
    /// Check if this is a primitive type
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            TypeFlavor::Void
                | TypeFlavor::Boolean
                | TypeFlavor::Char
                | TypeFlavor::I1
                | TypeFlavor::U1
                | TypeFlavor::I2
                | TypeFlavor::U2
                | TypeFlavor::I4
                | TypeFlavor::U4
                | TypeFlavor::I8
                | TypeFlavor::U8
                | TypeFlavor::R4
                | TypeFlavor::R8
                | TypeFlavor::I
                | TypeFlavor::U
                | TypeFlavor::Object
                | TypeFlavor::String
        )
    }

    /// Check if this is a value type
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        matches!(
            self,
            TypeFlavor::Boolean
                | TypeFlavor::Char
                | TypeFlavor::I1
                | TypeFlavor::U1
                | TypeFlavor::I2
                | TypeFlavor::U2
                | TypeFlavor::I4
                | TypeFlavor::U4
                | TypeFlavor::I8
                | TypeFlavor::U8
                | TypeFlavor::R4
                | TypeFlavor::R8
                | TypeFlavor::I
                | TypeFlavor::U
                | TypeFlavor::ValueType
        )
    }

    /// Check if this is a reference type
    #[must_use]
    pub fn is_reference_type(&self) -> bool {
        matches!(
            self,
            TypeFlavor::Object | TypeFlavor::String | TypeFlavor::Class
        )
    }
}

/// Structural description of a type reference.
///
/// The grammar is closed: every shape the resolver can encounter is one of
/// these variants, and resolution is an exhaustive match over them. A
/// reference describes shape only: the graph a reference belongs to is
/// determined by the names it carries, never by pointer identity, so a
/// reference can be handed between graphs without creating cross-graph edges.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A top-level type, spelled as assembly + namespace + name
    Simple {
        /// Owning assembly identity (file extension may still be attached)
        assembly: String,
        /// Namespace, empty for the global namespace
        namespace: String,
        /// Type name
        name: String,
        /// Classification of the named type
        flavor: TypeFlavor,
    },
    /// A type nested inside another type
    Nested {
        /// The enclosing type reference
        outer: Box<TypeRef>,
        /// Simple name of the nested type
        name: String,
        /// Classification of the nested type
        flavor: TypeFlavor,
    },
    /// An array of `element` with the given rank
    Array {
        /// Element type
        element: Box<TypeRef>,
        /// Number of dimensions
        rank: u32,
    },
    /// An unmanaged pointer to `element`
    Pointer(Box<TypeRef>),
    /// A managed by-reference to `element`
    ByRef(Box<TypeRef>),
    /// A generic instantiation of `base` with ordered `args`
    GenericInstance {
        /// The open generic type being instantiated
        base: Box<TypeRef>,
        /// Type arguments, in declaration order
        args: Vec<TypeRef>,
    },
    /// A bare generic parameter (`T` of its owner), identified by position
    GenericParameter {
        /// Parameter name as declared
        name: String,
        /// Zero-based position in the owner's parameter list
        position: u32,
        /// Whether the owner is a method (true) or a type (false)
        method: bool,
    },
}

impl TypeRef {
    /// Build a [`TypeRef::Simple`] reference
    pub fn simple(
        assembly: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
        flavor: TypeFlavor,
    ) -> Self {
        TypeRef::Simple {
            assembly: assembly.into(),
            namespace: namespace.into(),
            name: name.into(),
            flavor,
        }
    }

    /// Build a [`TypeRef::Nested`] reference
    pub fn nested(outer: TypeRef, name: impl Into<String>, flavor: TypeFlavor) -> Self {
        TypeRef::Nested {
            outer: Box::new(outer),
            name: name.into(),
            flavor,
        }
    }

    /// Build a [`TypeRef::Array`] reference
    #[must_use]
    pub fn array(element: TypeRef, rank: u32) -> Self {
        TypeRef::Array {
            element: Box::new(element),
            rank,
        }
    }

    /// Build a [`TypeRef::Pointer`] reference
    #[must_use]
    pub fn pointer(element: TypeRef) -> Self {
        TypeRef::Pointer(Box::new(element))
    }

    /// Build a [`TypeRef::ByRef`] reference
    #[must_use]
    pub fn byref(element: TypeRef) -> Self {
        TypeRef::ByRef(Box::new(element))
    }

    /// Build a [`TypeRef::GenericInstance`] reference
    #[must_use]
    pub fn generic_instance(base: TypeRef, args: Vec<TypeRef>) -> Self {
        TypeRef::GenericInstance {
            base: Box::new(base),
            args,
        }
    }

    /// Full name of the referenced type, rendered ECMA-style: `/` separates
    /// nesting levels, `[]`/`[,]` mark arrays, `*` pointers, `&` by-refs,
    /// `<...>` generic instantiations. Bare generic parameters render as
    /// their declared name.
    #[must_use]
    pub fn full_name(&self) -> String {
        match self {
            TypeRef::Simple {
                namespace, name, ..
            } => {
                if namespace.is_empty() {
                    name.clone()
                } else {
                    format!("{namespace}.{name}")
                }
            }
            TypeRef::Nested { outer, name, .. } => format!("{}/{}", outer.full_name(), name),
            TypeRef::Array { element, rank } => {
                let commas = ",".repeat((*rank).saturating_sub(1) as usize);
                format!("{}[{}]", element.full_name(), commas)
            }
            TypeRef::Pointer(element) => format!("{}*", element.full_name()),
            TypeRef::ByRef(element) => format!("{}&", element.full_name()),
            TypeRef::GenericInstance { base, args } => {
                let args = args
                    .iter()
                    .map(TypeRef::full_name)
                    .collect::<Vec<_>>()
                    .join(",");
                format!("{}<{}>", base.full_name(), args)
            }
            TypeRef::GenericParameter { name, .. } => name.clone(),
        }
    }

    /// The assembly identity this reference lives in, recursing through
    /// composite shapes. Bare generic parameters have no scope.
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        match self {
            TypeRef::Simple { assembly, .. } => Some(assembly),
            TypeRef::Nested { outer, .. } => outer.scope(),
            TypeRef::Array { element, .. } => element.scope(),
            TypeRef::Pointer(element) | TypeRef::ByRef(element) => element.scope(),
            TypeRef::GenericInstance { base, .. } => base.scope(),
            TypeRef::GenericParameter { .. } => None,
        }
    }

    /// Whether the referenced type is a value type. Arrays, pointers,
    /// by-refs and bare generic parameters are not; instantiations defer
    /// to their open base.
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        match self {
            TypeRef::Simple { flavor, .. } | TypeRef::Nested { flavor, .. } => {
                flavor.is_value_type()
            }
            TypeRef::GenericInstance { base, .. } => base.is_value_type(),
            _ => false,
        }
    }

    /// Whether the referenced type is one of the built-in primitives in the
    /// strict runtime sense: the numeric types, `Boolean`, `Char`, and the
    /// native integer types. `String`, `Object` and `Void` are not primitive
    /// here even though [`TypeFlavor::is_primitive`] groups them with the
    /// base types.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        match self {
            TypeRef::Simple { flavor, .. } => matches!(
                flavor,
                TypeFlavor::Boolean
                    | TypeFlavor::Char
                    | TypeFlavor::I1
                    | TypeFlavor::U1
                    | TypeFlavor::I2
                    | TypeFlavor::U2
                    | TypeFlavor::I4
                    | TypeFlavor::U4
                    | TypeFlavor::I8
                    | TypeFlavor::U8
                    | TypeFlavor::R4
                    | TypeFlavor::R8
                    | TypeFlavor::I
                    | TypeFlavor::U
            ),
            _ => false,
        }
    }

    /// Whether the referenced type is an interface
    #[must_use]
    pub fn is_interface(&self) -> bool {
        match self {
            TypeRef::Simple { flavor, .. } | TypeRef::Nested { flavor, .. } => {
                *flavor == TypeFlavor::Interface
            }
            TypeRef::GenericInstance { base, .. } => base.is_interface(),
            _ => false,
        }
    }

    /// Name-based equality: true when both references render the same full name
    #[must_use]
    pub fn name_eq(&self, other: &TypeRef) -> bool {
        self.full_name() == other.full_name()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int32() -> TypeRef {
        TypeRef::simple("mscorlib", "System", "Int32", TypeFlavor::I4)
    }

    fn string() -> TypeRef {
        TypeRef::simple("mscorlib", "System", "String", TypeFlavor::String)
    }

    #[test]
    fn test_full_name_simple() {
        assert_eq!(int32().full_name(), "System.Int32");
        let global = TypeRef::simple("Game", "", "Loose", TypeFlavor::Class);
        assert_eq!(global.full_name(), "Loose");
    }

    #[test]
    fn test_full_name_composites() {
        let nested = TypeRef::nested(
            TypeRef::simple("Game", "Game", "Outer", TypeFlavor::Class),
            "Inner",
            TypeFlavor::Class,
        );
        assert_eq!(nested.full_name(), "Game.Outer/Inner");
        assert_eq!(TypeRef::array(int32(), 1).full_name(), "System.Int32[]");
        assert_eq!(TypeRef::array(int32(), 2).full_name(), "System.Int32[,]");
        assert_eq!(TypeRef::pointer(int32()).full_name(), "System.Int32*");
        assert_eq!(TypeRef::byref(int32()).full_name(), "System.Int32&");
        let inst = TypeRef::generic_instance(
            TypeRef::simple("mscorlib", "System.Collections.Generic", "List`1", TypeFlavor::Class),
            vec![string()],
        );
        assert_eq!(
            inst.full_name(),
            "System.Collections.Generic.List`1<System.String>"
        );
    }

    #[test]
    fn test_scope_recurses() {
        assert_eq!(TypeRef::array(int32(), 1).scope(), Some("mscorlib"));
        assert_eq!(TypeRef::byref(TypeRef::pointer(int32())).scope(), Some("mscorlib"));
        let gp = TypeRef::GenericParameter {
            name: "T".into(),
            position: 0,
            method: true,
        };
        assert_eq!(gp.scope(), None);
    }

    #[test]
    fn test_value_typeness() {
        assert!(int32().is_value_type());
        assert!(!string().is_value_type());
        assert!(!TypeRef::array(int32(), 1).is_value_type());
        assert!(!TypeRef::byref(int32()).is_value_type());
        let inst = TypeRef::generic_instance(
            TypeRef::simple("mscorlib", "System", "Nullable`1", TypeFlavor::ValueType),
            vec![int32()],
        );
        assert!(inst.is_value_type());
    }

    #[test]
    fn test_name_eq_ignores_flavor_and_scope() {
        let a = TypeRef::simple("mscorlib", "System", "Int32", TypeFlavor::I4);
        let b = TypeRef::simple("netstandard", "System", "Int32", TypeFlavor::ValueType);
        assert!(a.name_eq(&b));
        assert!(!a.name_eq(&string()));
    }
}
