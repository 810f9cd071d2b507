//! Per-module import tables.
//!
//! Every type reference the resolver hands back must be valid inside the
//! module that asked for it, because the resolved node may live in a different
//! target module. [`ModuleImports::import`] is that cross-module import step:
//! it records the reference in the destination module's external-reference
//! table and returns it. Importing an already-recorded reference is a no-op.
//!
//! The table also carries the well-known corlib identity and the managed
//! array container types the resolver substitutes for CLR arrays.

use dashmap::DashMap;

use crate::metadata::graph::AssemblyRc;
use crate::metadata::typesystem::{TypeFlavor, TypeRef};

/// Core-library identity used for references emitted by the corlib importer
pub const CORLIB: &str = "mscorlib";

/// Assembly carrying the interop array container types
const INTEROP_RUNTIME: &str = "Il2CppInterop.Runtime";
/// Namespace of the interop array container types
const INTEROP_ARRAYS_NS: &str = "Il2CppInterop.Runtime.InteropTypes.Arrays";

/// The well-known container types arrays are lowered to
pub struct WellKnownRefs {
    /// Dedicated container for `System.String[]`
    pub string_array: TypeRef,
    /// Open generic container for arrays of value types
    pub value_array: TypeRef,
    /// Open generic container for arrays of reference types
    pub reference_array: TypeRef,
}

impl Default for WellKnownRefs {
    fn default() -> Self {
        WellKnownRefs {
            string_array: TypeRef::simple(
                INTEROP_RUNTIME,
                INTEROP_ARRAYS_NS,
                "Il2CppStringArray",
                TypeFlavor::Class,
            ),
            value_array: TypeRef::simple(
                INTEROP_RUNTIME,
                INTEROP_ARRAYS_NS,
                "Il2CppStructArray`1",
                TypeFlavor::Class,
            ),
            reference_array: TypeRef::simple(
                INTEROP_RUNTIME,
                INTEROP_ARRAYS_NS,
                "Il2CppReferenceArray`1",
                TypeFlavor::Class,
            ),
        }
    }
}

/// Import table of one target module
pub struct ModuleImports {
    module: AssemblyRc,
    /// External references recorded for this module, keyed by full name.
    /// The first recorded reference for a name wins.
    table: DashMap<String, TypeRef>,
    well_known: WellKnownRefs,
}

impl ModuleImports {
    /// Create an import table for `module` with the default well-known refs
    #[must_use]
    pub fn new(module: AssemblyRc) -> Self {
        Self::with_containers(module, WellKnownRefs::default())
    }

    /// Create an import table with explicit array container types
    #[must_use]
    pub fn with_containers(module: AssemblyRc, well_known: WellKnownRefs) -> Self {
        ModuleImports {
            module,
            table: DashMap::new(),
            well_known,
        }
    }

    /// The module this table belongs to
    #[must_use]
    pub fn module(&self) -> &AssemblyRc {
        &self.module
    }

    /// Import `reference` into this module. Idempotent: the reference
    /// recorded for a full name on first import is the one every later
    /// import of that name returns.
    #[must_use]
    pub fn import(&self, reference: &TypeRef) -> TypeRef {
        self.table
            .entry(reference.full_name())
            .or_insert_with(|| reference.clone())
            .value()
            .clone()
    }

    /// Import a core-library type by namespace and name. Always succeeds for
    /// well-known names; the flavor is derived from the name.
    #[must_use]
    pub fn import_corlib(&self, namespace: &str, name: &str) -> TypeRef {
        let reference = TypeRef::simple(CORLIB, namespace, name, corlib_flavor(namespace, name));
        self.import(&reference)
    }

    /// The dedicated `System.String[]` container, imported into this module
    #[must_use]
    pub fn string_array(&self) -> TypeRef {
        self.import(&self.well_known.string_array)
    }

    /// The value-type array container, imported into this module
    #[must_use]
    pub fn value_array(&self) -> TypeRef {
        self.import(&self.well_known.value_array)
    }

    /// The reference-type array container, imported into this module
    #[must_use]
    pub fn reference_array(&self) -> TypeRef {
        self.import(&self.well_known.reference_array)
    }

    /// Number of distinct references recorded for this module
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether no reference has been recorded yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

fn corlib_flavor(namespace: &str, name: &str) -> TypeFlavor {
    if namespace != "System" {
        return TypeFlavor::ValueType;
    }

    match name {
        "Void" => TypeFlavor::Void,
        "Boolean" => TypeFlavor::Boolean,
        "Char" => TypeFlavor::Char,
        "SByte" => TypeFlavor::I1,
        "Byte" => TypeFlavor::U1,
        "Int16" => TypeFlavor::I2,
        "UInt16" => TypeFlavor::U2,
        "Int32" => TypeFlavor::I4,
        "UInt32" => TypeFlavor::U4,
        "Int64" => TypeFlavor::I8,
        "UInt64" => TypeFlavor::U8,
        "Single" => TypeFlavor::R4,
        "Double" => TypeFlavor::R8,
        "IntPtr" => TypeFlavor::I,
        "UIntPtr" => TypeFlavor::U,
        "String" => TypeFlavor::String,
        "Object" => TypeFlavor::Object,
        // the fast path only imports value types beyond the primitives
        _ => TypeFlavor::ValueType,
    }
}
