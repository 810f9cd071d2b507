//! Method, field, property, and generic-parameter nodes, plus the attribute
//! flag groups used to classify them.
//!
//! Flag words are stored raw on the nodes (the values are the ECMA-335
//! attribute encodings) and extracted into logical [`bitflags`] groups on
//! demand.
//!
//! # Key Types
//! - [`MethodAccessFlags`], [`MethodModifiers`], [`MethodImplFlags`],
//!   [`MethodSemantics`]: attribute flag groups
//! - [`MethodNode`]: a method definition in either graph
//! - [`PropertyNode`]: a property with late-bound getter/setter slots
//! - [`FieldNode`], [`ParamNode`], [`GenericParamNode`]: supporting nodes

use std::fmt;
use std::sync::{Arc, OnceLock};

use bitflags::bitflags;

use crate::metadata::token::Token;
use crate::metadata::typesystem::TypeRef;

/// Bitmask for `ACCESS` state extraction
pub const METHOD_ACCESS_MASK: u32 = 0x0007;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Method access flags
    pub struct MethodAccessFlags: u32 {
        /// Member not referenceable
        const COMPILER_CONTROLLED = 0x0000;
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessible by sub-types only in this Assembly
        const FAM_AND_ASSEM = 0x0002;
        /// Accessibly by anyone in the Assembly
        const ASSEM = 0x0003;
        /// Accessible only by type and sub-types
        const FAMILY = 0x0004;
        /// Accessibly by sub-types anywhere, plus anyone in assembly
        const FAM_OR_ASSEM = 0x0005;
        /// Accessibly by anyone who has visibility to this scope
        const PUBLIC = 0x0006;
    }
}

impl MethodAccessFlags {
    /// Extract access flags from a raw method attribute word
    #[must_use]
    pub fn from_method_flags(flags: u32) -> Self {
        Self::from_bits_truncate(flags & METHOD_ACCESS_MASK)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Method modifiers and properties
    pub struct MethodModifiers: u32 {
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Method cannot be overridden
        const FINAL = 0x0020;
        /// Method is virtual
        const VIRTUAL = 0x0040;
        /// Method hides by name+sig, else just by name
        const HIDE_BY_SIG = 0x0080;
        /// Method always gets a new slot in the vtable
        const NEW_SLOT = 0x0100;
        /// Method can only be overriden if also accessible
        const STRICT = 0x0200;
        /// Method does not provide an implementation
        const ABSTRACT = 0x0400;
        /// Method is special
        const SPECIAL_NAME = 0x0800;
        /// CLI provides 'special' behavior, depending upon the name of the method
        const RTSPECIAL_NAME = 0x1000;
        /// Implementation is forwarded through PInvoke
        const PINVOKE_IMPL = 0x2000;
    }
}

impl MethodModifiers {
    /// Extract method modifiers from a raw method attribute word
    #[must_use]
    pub fn from_method_flags(flags: u32) -> Self {
        Self::from_bits_truncate(flags & !METHOD_ACCESS_MASK)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Method implementation flags
    pub struct MethodImplFlags: u32 {
        /// Method impl is native
        const NATIVE = 0x0001;
        /// Method impl is provided by the runtime
        const RUNTIME = 0x0003;
        /// Method cannot be inlined
        const NO_INLINING = 0x0008;
        /// Method is a synchronized method
        const SYNCHRONIZED = 0x0020;
        /// Method signature is not to be mangled
        const PRESERVE_SIG = 0x0080;
        /// Implemented as a call into the runtime, no managed body exists
        const INTERNAL_CALL = 0x1000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Method semantics linking a method to a property or event
    pub struct MethodSemantics: u32 {
        /// Setter for a property
        const SETTER = 0x0001;
        /// Getter for a property
        const GETTER = 0x0002;
        /// Other accessor for a property or event
        const OTHER = 0x0004;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Parameter direction and marshalling flags
    pub struct ParamFlags: u32 {
        /// Parameter is an input
        const IN = 0x0001;
        /// Parameter is an output
        const OUT = 0x0002;
        /// Parameter is optional
        const OPTIONAL = 0x0010;
        /// Parameter has a default value
        const HAS_DEFAULT = 0x1000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Generic parameter variance and special-constraint flags
    pub struct GenericParamFlags: u32 {
        /// Parameter is covariant
        const COVARIANT = 0x0001;
        /// Parameter is contravariant
        const CONTRAVARIANT = 0x0002;
        /// `class` constraint
        const REFERENCE_TYPE_CONSTRAINT = 0x0004;
        /// `struct` constraint, the built-in value-type marker
        const NOT_NULLABLE_VALUE_TYPE_CONSTRAINT = 0x0008;
        /// `new()` constraint
        const DEFAULT_CONSTRUCTOR_CONSTRAINT = 0x0010;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Field attribute flags
    pub struct FieldFlags: u32 {
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessibly by anyone who has visibility to this scope
        const PUBLIC = 0x0006;
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Field can only be initialized, not written after init
        const INIT_ONLY = 0x0020;
    }
}

/// Reference to a `MethodNode`
pub type MethodRc = Arc<MethodNode>;
/// A vector that holds a list of `MethodNode`
pub type MethodList = Arc<boxcar::Vec<MethodRc>>;
/// Reference to a `ParamNode`
pub type ParamRc = Arc<ParamNode>;
/// Reference to a `GenericParamNode`
pub type GenericParamRc = Arc<GenericParamNode>;
/// Reference to a `FieldNode`
pub type FieldRc = Arc<FieldNode>;
/// A vector that holds a list of `FieldNode`
pub type FieldList = Arc<boxcar::Vec<FieldRc>>;
/// Reference to a `PropertyNode`
pub type PropertyRc = Arc<PropertyNode>;
/// A vector that holds a list of `PropertyNode`
pub type PropertyList = Arc<boxcar::Vec<PropertyRc>>;

/// A single parameter of a method
pub struct ParamNode {
    /// Parameter name
    pub name: String,
    /// Raw `ParamAttributes` word (direction flags)
    pub flags: u32,
    /// Declared parameter type
    pub param_type: TypeRef,
}

/// A generic parameter declared by a method (or type), with its constraints
pub struct GenericParamNode {
    /// Parameter name as declared
    pub name: String,
    /// Zero-based position in the owner's parameter list
    pub number: u32,
    /// Raw `GenericParamAttributes` word (variance + special flags)
    pub flags: u32,
    /// Constraint types, appended as they are established
    pub constraints: Arc<boxcar::Vec<TypeRef>>,
}

impl GenericParamNode {
    /// Create a parameter with no constraints yet
    #[must_use]
    pub fn new(name: String, number: u32, flags: u32) -> Self {
        GenericParamNode {
            name,
            number,
            flags,
            constraints: Arc::new(boxcar::Vec::new()),
        }
    }
}

/// Where a method body came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyKind {
    /// An ordinary managed body
    Managed,
    /// A synthesized body that loads a function-pointer field and forwards
    /// all arguments to it
    NativeInvoker {
        /// Name of the backing field the invoker loads
        field: String,
    },
}

/// A method body marker. Instruction streams are not modelled; only the
/// provenance of the body is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodBody {
    /// Provenance of this body
    pub kind: BodyKind,
}

/// A method definition in either graph.
///
/// Signature data (return type, parameters, generic parameters) is fixed at
/// construction time by the code building the node; the body slot is
/// late-bound so a member can be observed before its body has been filled.
pub struct MethodNode {
    /// Token
    pub token: Token,
    /// Method name
    pub name: String,
    /// Raw `MethodAttributes` word
    pub flags: u32,
    /// Raw `MethodImplAttributes` word
    pub impl_flags: u32,
    /// Raw `MethodSemanticsAttributes` word
    pub semantics: u32,
    /// Declared return type
    pub return_type: TypeRef,
    /// Parameters, in declaration order
    pub params: Arc<boxcar::Vec<ParamRc>>,
    /// Generic parameters, in declaration order
    pub generic_params: Arc<boxcar::Vec<GenericParamRc>>,
    /// The body, once one exists
    pub body: OnceLock<MethodBody>,
}

impl MethodNode {
    /// Create a new method with empty parameter lists and no body
    #[must_use]
    pub fn new(
        token: Token,
        name: String,
        flags: u32,
        impl_flags: u32,
        semantics: u32,
        return_type: TypeRef,
    ) -> Self {
        MethodNode {
            token,
            name,
            flags,
            impl_flags,
            semantics,
            return_type,
            params: Arc::new(boxcar::Vec::new()),
            generic_params: Arc::new(boxcar::Vec::new()),
            body: OnceLock::new(),
        }
    }

    /// Append a parameter
    pub fn push_param(&self, param: ParamNode) {
        self.params.push(Arc::new(param));
    }

    /// Append a generic parameter
    pub fn push_generic_param(&self, param: GenericParamRc) {
        self.generic_params.push(param);
    }

    /// Whether a body has been attached
    #[must_use]
    pub fn has_body(&self) -> bool {
        self.body.get().is_some()
    }

    /// Attach a body. The first body wins; later attempts are ignored.
    pub fn set_body(&self, body: MethodBody) {
        self.body.set(body).ok();
    }

    /// Whether this is an instance or static constructor
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == ".ctor" || self.name == ".cctor"
    }

    /// Whether this method is abstract
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        MethodModifiers::from_method_flags(self.flags).contains(MethodModifiers::ABSTRACT)
    }

    /// Whether this method is static
    #[must_use]
    pub fn is_static(&self) -> bool {
        MethodModifiers::from_method_flags(self.flags).contains(MethodModifiers::STATIC)
    }

    /// Whether this method is implemented as a call into the runtime
    #[must_use]
    pub fn is_internal_call(&self) -> bool {
        MethodImplFlags::from_bits_truncate(self.impl_flags)
            .contains(MethodImplFlags::INTERNAL_CALL)
    }

    /// Whether this method is a property getter
    #[must_use]
    pub fn is_getter(&self) -> bool {
        MethodSemantics::from_bits_truncate(self.semantics).contains(MethodSemantics::GETTER)
    }

    /// Whether this method is a property setter
    #[must_use]
    pub fn is_setter(&self) -> bool {
        MethodSemantics::from_bits_truncate(self.semantics).contains(MethodSemantics::SETTER)
    }

    /// Full names of the parameter types, in declaration order
    #[must_use]
    pub fn param_type_names(&self) -> Vec<String> {
        self.params
            .iter()
            .map(|(_, p)| p.param_type.full_name())
            .collect()
    }
}

impl fmt::Display for MethodNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.return_type.full_name(), self.name)?;
        for (i, (_, param)) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", param.param_type.full_name())?;
        }
        write!(f, ")")
    }
}

/// A field definition
pub struct FieldNode {
    /// Token
    pub token: Token,
    /// Field name
    pub name: String,
    /// Raw `FieldAttributes` word
    pub flags: u32,
    /// Declared field type
    pub field_type: TypeRef,
}

/// A property definition with late-bound accessor slots.
///
/// A property is identified by (declaring type, name, parameter full-name
/// sequence); the parameter list records the indexer arity in the coordinate
/// space of the graph the property lives in. Accessors are attached at most
/// once each, possibly in different reconstruction runs.
pub struct PropertyNode {
    /// Token
    pub token: Token,
    /// Property name
    pub name: String,
    /// Raw `PropertyAttributes` word
    pub flags: u32,
    /// Declared property type
    pub property_type: TypeRef,
    /// Indexer parameter types, in declaration order
    pub params: Vec<TypeRef>,
    getter: OnceLock<MethodRc>,
    setter: OnceLock<MethodRc>,
}

impl PropertyNode {
    /// Create a property with both accessor slots empty
    #[must_use]
    pub fn new(
        token: Token,
        name: String,
        flags: u32,
        property_type: TypeRef,
        params: Vec<TypeRef>,
    ) -> Self {
        PropertyNode {
            token,
            name,
            flags,
            property_type,
            params,
            getter: OnceLock::new(),
            setter: OnceLock::new(),
        }
    }

    /// The getter, if one has been attached
    #[must_use]
    pub fn getter(&self) -> Option<MethodRc> {
        self.getter.get().cloned()
    }

    /// The setter, if one has been attached
    #[must_use]
    pub fn setter(&self) -> Option<MethodRc> {
        self.setter.get().cloned()
    }

    /// Attach the getter. The first attachment wins.
    pub fn set_getter(&self, method: &MethodRc) {
        self.getter.set(method.clone()).ok();
    }

    /// Attach the setter. The first attachment wins.
    pub fn set_setter(&self, method: &MethodRc) {
        self.setter.set(method.clone()).ok();
    }

    /// Full names of the indexer parameter types, in declaration order
    #[must_use]
    pub fn param_type_names(&self) -> Vec<String> {
        self.params.iter().map(TypeRef::full_name).collect()
    }
}
