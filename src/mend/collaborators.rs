//! Collaborator seams of the reconstruction engine.
//!
//! The engine resolves signatures; everything that gives the resulting
//! members behavior goes through these traits. The shipped implementations
//! are enough to run a repair end-to-end: native-call methods get a nested
//! delegate type, a function-pointer field, and an invoker body; ordinary
//! methods are queued for deferred body synthesis; no overload wrappers are
//! produced.

use std::sync::Arc;

use crate::mend::context::TypeContext;
use crate::mend::imports::ModuleImports;
use crate::metadata::method::{
    BodyKind, FieldFlags, FieldNode, MethodAccessFlags, MethodBody, MethodImplFlags,
    MethodModifiers, MethodNode, MethodRc, ParamNode,
};
use crate::metadata::token::TableKind;
use crate::metadata::typesystem::{TypeAttributes, TypeFlavor, TypeRef};

/// Produces the invocation machinery for a native-call method: a delegate
/// type nested in the owning target type, a backing field holding the
/// resolved function pointer, and an invoker body on the new member that
/// loads the field and forwards all arguments.
pub trait IcallStubGenerator {
    /// Generate the stub for `new_method`, which has already been appended
    /// to the target type of `types`.
    fn generate(
        &self,
        ref_method: &MethodRc,
        new_method: &MethodRc,
        types: &TypeContext,
        imports: &ModuleImports,
    );
}

/// Accepts members whose ordinary bodies are synthesized later, outside the
/// engine.
pub trait BodyFiller {
    /// Queue `new_method` for deferred body synthesis from `ref_method`.
    fn push(
        &self,
        ref_method: &MethodRc,
        new_method: &MethodRc,
        types: &TypeContext,
        imports: &ModuleImports,
    );
}

/// Optionally derives one additional convenience member from a freshly
/// restored method, reusing the engine's resolver.
pub trait OverloadSynthesizer {
    /// Return an extra member to append after `new_method`, or `None`.
    fn synthesize(
        &self,
        ref_method: &MethodRc,
        new_method: &MethodRc,
        imports: &ModuleImports,
        resolve: &dyn Fn(&TypeRef) -> Option<TypeRef>,
    ) -> Option<MethodRc>;
}

/// The shipped [`IcallStubGenerator`]
pub struct DelegateStubGenerator;

impl IcallStubGenerator for DelegateStubGenerator {
    fn generate(
        &self,
        _ref_method: &MethodRc,
        new_method: &MethodRc,
        types: &TypeContext,
        imports: &ModuleImports,
    ) {
        let module = imports.module();

        let delegate_type = module.define_nested(
            &types.target,
            &format!("{}ICallDelegate", new_method.name),
            TypeFlavor::Class,
            (TypeAttributes::NESTED_PRIVATE | TypeAttributes::SEALED).bits(),
        );

        // Invoke mirrors the restored member's resolved signature
        let invoke = MethodNode::new(
            module.alloc(TableKind::Method),
            "Invoke".to_string(),
            MethodAccessFlags::PUBLIC.bits()
                | (MethodModifiers::HIDE_BY_SIG
                    | MethodModifiers::VIRTUAL
                    | MethodModifiers::NEW_SLOT)
                    .bits(),
            MethodImplFlags::RUNTIME.bits(),
            0,
            new_method.return_type.clone(),
        );
        for (_, param) in new_method.params.iter() {
            invoke.push_param(ParamNode {
                name: param.name.clone(),
                flags: param.flags,
                param_type: param.param_type.clone(),
            });
        }
        delegate_type.push_method(&Arc::new(invoke));

        let field_name = format!("NativeMethodPtr_{}", new_method.name);
        types.target.push_field(Arc::new(FieldNode {
            token: module.alloc(TableKind::Field),
            name: field_name.clone(),
            flags: (FieldFlags::PRIVATE | FieldFlags::STATIC | FieldFlags::INIT_ONLY).bits(),
            field_type: TypeRef::pointer(imports.import_corlib("System", "Void")),
        }));

        new_method.set_body(MethodBody {
            kind: BodyKind::NativeInvoker { field: field_name },
        });
    }
}

/// The shipped [`BodyFiller`]: accumulates (reference method, new member)
/// pairs for a later synthesis pass.
#[derive(Default)]
pub struct DeferredBodyQueue {
    queue: boxcar::Vec<(MethodRc, MethodRc)>,
}

impl DeferredBodyQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queued pairs, in the order they were pushed
    #[must_use]
    pub fn pending(&self) -> Vec<(MethodRc, MethodRc)> {
        self.queue
            .iter()
            .map(|(_, pair)| (pair.0.clone(), pair.1.clone()))
            .collect()
    }

    /// Number of queued pairs
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.count()
    }

    /// Whether the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BodyFiller for DeferredBodyQueue {
    fn push(
        &self,
        ref_method: &MethodRc,
        new_method: &MethodRc,
        _types: &TypeContext,
        _imports: &ModuleImports,
    ) {
        self.queue.push((ref_method.clone(), new_method.clone()));
    }
}

/// The shipped [`OverloadSynthesizer`]: never adds a member
pub struct NoOverloads;

impl OverloadSynthesizer for NoOverloads {
    fn synthesize(
        &self,
        _ref_method: &MethodRc,
        _new_method: &MethodRc,
        _imports: &ModuleImports,
        _resolve: &dyn Fn(&TypeRef) -> Option<TypeRef>,
    ) -> Option<MethodRc> {
        None
    }
}
