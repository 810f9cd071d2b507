//! Integration tests for the cross-graph type resolver.
//!
//! Each test builds a small (reference, target) graph pair, pairs it through
//! a `MendContext`, and resolves reference-coordinate type references against
//! one destination module.

use std::sync::Arc;

use dotmend::prelude::*;

fn corlib(name: &str, flavor: TypeFlavor) -> TypeRef {
    TypeRef::simple("mscorlib", "System", name, flavor)
}

fn int32() -> TypeRef {
    corlib("Int32", TypeFlavor::I4)
}

fn string() -> TypeRef {
    corlib("String", TypeFlavor::String)
}

/// A context with one paired game assembly holding `Game.Player` on both
/// sides. Returns the context and the pairing used as destination module.
fn game_context() -> Result<(MendContext, Arc<AssemblyContext>)> {
    let reference = Arc::new(MetadataGraph::new());
    let target = Arc::new(MetadataGraph::new());

    let ref_asm = reference.add_assembly("Game.Core")?;
    let target_asm = target.add_assembly("Game.Core")?;
    TypeBuilder::new(&ref_asm, "Player").namespace("Game").build()?;
    TypeBuilder::new(&target_asm, "Player").namespace("Game").build()?;

    let context = MendContext::new(reference, target);
    context.pair_by_name();
    let actx = context.assembly_by_ref_name("Game.Core").expect("paired");
    Ok((context, actx))
}

fn player() -> TypeRef {
    TypeRef::simple("Game.Core", "Game", "Player", TypeFlavor::Class)
}

#[test]
fn simple_type_resolves_through_the_coordinate_map() -> Result<()> {
    let (context, actx) = game_context()?;
    let resolver = TypeResolver::new(&context, actx.imports());

    let resolved = resolver.resolve(&player()).expect("resolvable");
    assert_eq!(resolved.full_name(), "Game.Player");
    assert_eq!(resolved.scope(), Some("Game.Core"));
    Ok(())
}

#[test]
fn unknown_type_is_unresolvable_not_an_error() -> Result<()> {
    let (context, actx) = game_context()?;
    let resolver = TypeResolver::new(&context, actx.imports());

    let missing = TypeRef::simple("Game.Core", "Game", "Missing", TypeFlavor::Class);
    assert!(resolver.resolve(&missing).is_none());

    let unknown_asm = TypeRef::simple("Game.Absent", "Game", "Player", TypeFlavor::Class);
    assert!(resolver.resolve(&unknown_asm).is_none());
    Ok(())
}

#[test]
fn renamed_target_types_resolve_to_target_coordinates() -> Result<()> {
    let reference = Arc::new(MetadataGraph::new());
    let target = Arc::new(MetadataGraph::new());

    let ref_asm = reference.add_assembly("mscorlib")?;
    let target_asm = target.add_assembly("Il2Cppmscorlib")?;
    let ref_list = TypeBuilder::new(&ref_asm, "List`1")
        .namespace("System.Collections.Generic")
        .build()?;
    let target_list = TypeBuilder::new(&target_asm, "List`1")
        .namespace("Il2CppSystem.Collections.Generic")
        .build()?;

    let context = MendContext::new(reference, target);
    let actx = context.register(&ref_asm, &target_asm);
    actx.register_type(&ref_list, &target_list);

    let resolver = TypeResolver::new(&context, actx.imports());
    let input = TypeRef::simple(
        "mscorlib",
        "System.Collections.Generic",
        "List`1",
        TypeFlavor::Class,
    );
    let resolved = resolver.resolve(&input).expect("resolvable");

    // the result is spelled entirely in target coordinates
    assert_eq!(resolved.full_name(), "Il2CppSystem.Collections.Generic.List`1");
    assert_eq!(resolved.scope(), Some("Il2Cppmscorlib"));
    Ok(())
}

#[test]
fn byref_and_pointer_wrap_their_resolved_element() -> Result<()> {
    let (context, actx) = game_context()?;
    let resolver = TypeResolver::new(&context, actx.imports());

    let byref = resolver.resolve(&TypeRef::byref(player())).expect("resolvable");
    assert_eq!(byref.full_name(), "Game.Player&");

    let pointer = resolver.resolve(&TypeRef::pointer(int32())).expect("resolvable");
    assert_eq!(pointer.full_name(), "System.Int32*");

    // failure of the element fails the wrapper
    let missing = TypeRef::simple("Game.Core", "Game", "Missing", TypeFlavor::Class);
    assert!(resolver.resolve(&TypeRef::byref(missing.clone())).is_none());
    assert!(resolver.resolve(&TypeRef::pointer(missing)).is_none());
    Ok(())
}

#[test]
fn bare_generic_parameters_are_always_unsupported() -> Result<()> {
    let (context, actx) = game_context()?;
    let resolver = TypeResolver::new(&context, actx.imports());

    let gp = TypeRef::GenericParameter {
        name: "T".into(),
        position: 0,
        method: true,
    };
    assert!(resolver.resolve(&gp).is_none());
    assert!(resolver.resolve(&TypeRef::byref(gp)).is_none());
    Ok(())
}

#[test]
fn string_array_maps_to_the_dedicated_container() -> Result<()> {
    let (context, actx) = game_context()?;
    let resolver = TypeResolver::new(&context, actx.imports());

    let resolved = resolver
        .resolve(&TypeRef::array(string(), 1))
        .expect("resolvable");
    assert_eq!(
        resolved.full_name(),
        "Il2CppInterop.Runtime.InteropTypes.Arrays.Il2CppStringArray"
    );
    Ok(())
}

#[test]
fn value_type_array_instantiates_the_value_container() -> Result<()> {
    let (context, actx) = game_context()?;
    let resolver = TypeResolver::new(&context, actx.imports());

    let resolved = resolver
        .resolve(&TypeRef::array(int32(), 1))
        .expect("resolvable");
    match resolved {
        TypeRef::GenericInstance { base, args } => {
            assert!(base.full_name().contains("Il2CppStructArray"));
            assert_eq!(args.len(), 1);
            assert_eq!(args[0].full_name(), "System.Int32");
        }
        other => panic!("expected a generic instantiation, got {other}"),
    }
    Ok(())
}

#[test]
fn reference_type_array_instantiates_the_reference_container() -> Result<()> {
    let (context, actx) = game_context()?;
    let resolver = TypeResolver::new(&context, actx.imports());

    let resolved = resolver
        .resolve(&TypeRef::array(player(), 1))
        .expect("resolvable");
    match resolved {
        TypeRef::GenericInstance { base, args } => {
            assert!(base.full_name().contains("Il2CppReferenceArray"));
            assert_eq!(args[0].full_name(), "Game.Player");
        }
        other => panic!("expected a generic instantiation, got {other}"),
    }
    Ok(())
}

#[test]
fn multi_dimensional_arrays_are_unsupported() -> Result<()> {
    let (context, actx) = game_context()?;
    let resolver = TypeResolver::new(&context, actx.imports());

    assert!(resolver.resolve(&TypeRef::array(int32(), 2)).is_none());
    assert!(resolver.resolve(&TypeRef::array(player(), 3)).is_none());
    Ok(())
}

#[test]
fn nested_types_resolve_through_their_resolved_outer() -> Result<()> {
    let reference = Arc::new(MetadataGraph::new());
    let target = Arc::new(MetadataGraph::new());

    let ref_asm = reference.add_assembly("Game.Core")?;
    let target_asm = target.add_assembly("Game.Core")?;
    let ref_outer = TypeBuilder::new(&ref_asm, "Outer").namespace("Game").build()?;
    TypeBuilder::new(&ref_asm, "Inner").nested_in(&ref_outer).build()?;
    let target_outer = TypeBuilder::new(&target_asm, "Outer").namespace("Game").build()?;
    TypeBuilder::new(&target_asm, "Inner").nested_in(&target_outer).build()?;

    let context = MendContext::new(reference, target);
    context.pair_by_name();
    let actx = context.assembly_by_ref_name("Game.Core").expect("paired");
    let resolver = TypeResolver::new(&context, actx.imports());

    let input = TypeRef::nested(
        TypeRef::simple("Game.Core", "Game", "Outer", TypeFlavor::Class),
        "Inner",
        TypeFlavor::Class,
    );
    let resolved = resolver.resolve(&input).expect("resolvable");
    assert_eq!(resolved.full_name(), "Game.Outer/Inner");
    assert_eq!(resolved.scope(), Some("Game.Core"));

    // no nested match inside the resolved outer fails the reference
    let absent = TypeRef::nested(
        TypeRef::simple("Game.Core", "Game", "Outer", TypeFlavor::Class),
        "Absent",
        TypeFlavor::Class,
    );
    assert!(resolver.resolve(&absent).is_none());
    Ok(())
}

#[test]
fn generic_instances_fail_when_any_argument_fails() -> Result<()> {
    let reference = Arc::new(MetadataGraph::new());
    let target = Arc::new(MetadataGraph::new());

    let ref_asm = reference.add_assembly("mscorlib")?;
    let target_asm = target.add_assembly("Il2Cppmscorlib")?;
    let ref_list = TypeBuilder::new(&ref_asm, "List`1")
        .namespace("System.Collections.Generic")
        .build()?;
    let target_list = TypeBuilder::new(&target_asm, "List`1")
        .namespace("Il2CppSystem.Collections.Generic")
        .build()?;

    let ref_game = reference.add_assembly("Game.Core")?;
    let target_game = target.add_assembly("Game.Core")?;
    let ref_player = TypeBuilder::new(&ref_game, "Player").namespace("Game").build()?;
    let target_player = TypeBuilder::new(&target_game, "Player").namespace("Game").build()?;

    let context = MendContext::new(reference, target);
    let corlib_ctx = context.register(&ref_asm, &target_asm);
    corlib_ctx.register_type(&ref_list, &target_list);
    let game_ctx = context.register(&ref_game, &target_game);
    game_ctx.register_type(&ref_player, &target_player);

    let resolver = TypeResolver::new(&context, game_ctx.imports());
    let list = TypeRef::simple(
        "mscorlib",
        "System.Collections.Generic",
        "List`1",
        TypeFlavor::Class,
    );

    let good = TypeRef::generic_instance(list.clone(), vec![player()]);
    let resolved = resolver.resolve(&good).expect("resolvable");
    assert_eq!(
        resolved.full_name(),
        "Il2CppSystem.Collections.Generic.List`1<Game.Player>"
    );

    let missing = TypeRef::simple("Game.Core", "Game", "Missing", TypeFlavor::Class);
    let bad_arg = TypeRef::generic_instance(list, vec![player(), missing]);
    assert!(resolver.resolve(&bad_arg).is_none());

    let unmapped_base =
        TypeRef::simple("mscorlib", "System", "Lazy`1", TypeFlavor::Class);
    assert!(resolver
        .resolve(&TypeRef::generic_instance(unmapped_base, vec![player()]))
        .is_none());
    Ok(())
}

#[test]
fn corlib_fast_path_skips_the_graph_walk() -> Result<()> {
    // no mscorlib pairing exists, yet primitives and value types resolve
    let (context, actx) = game_context()?;
    let resolver = TypeResolver::new(&context, actx.imports());

    assert_eq!(
        resolver.resolve(&int32()).expect("fast path").full_name(),
        "System.Int32"
    );
    assert_eq!(
        resolver.resolve(&string()).expect("fast path").full_name(),
        "System.String"
    );
    assert_eq!(
        resolver
            .resolve(&corlib("Void", TypeFlavor::Void))
            .expect("fast path")
            .full_name(),
        "System.Void"
    );
    // a value type beyond the primitives rides the same shortcut
    assert!(resolver
        .resolve(&corlib("DateTime", TypeFlavor::ValueType))
        .is_some());
    // netstandard is the second recognized core-library identity, and the
    // file extension is stripped before comparing
    assert!(resolver
        .resolve(&TypeRef::simple("netstandard.dll", "System", "Int32", TypeFlavor::I4))
        .is_some());
    Ok(())
}

#[test]
fn corlib_fast_path_excludes_runtime_type_handle() -> Result<()> {
    let (context, actx) = game_context()?;
    let resolver = TypeResolver::new(&context, actx.imports());

    // the one handle type specifically excluded falls through to the graph
    // lookup, which has no mscorlib pairing here
    let handle = corlib("RuntimeTypeHandle", TypeFlavor::ValueType);
    assert!(resolver.resolve(&handle).is_none());
    Ok(())
}

#[test]
fn resolve_value_types_mode_narrows_the_fast_path() -> Result<()> {
    let (context, actx) = game_context()?;
    let resolver = TypeResolver::new(&context, actx.imports());

    // primitives and void still short-circuit
    assert!(resolver.resolve_ext(&int32(), true).is_some());
    assert!(resolver
        .resolve_ext(&corlib("Void", TypeFlavor::Void), true)
        .is_some());
    // plain value types now go through the graph lookup instead
    assert!(resolver
        .resolve_ext(&corlib("DateTime", TypeFlavor::ValueType), true)
        .is_none());
    Ok(())
}

#[test]
fn engine_fallback_scans_prefixed_modules_first_match_wins() -> Result<()> {
    let reference = Arc::new(MetadataGraph::new());
    let target = Arc::new(MetadataGraph::new());

    // monolithic engine assembly in the reference graph
    let ref_unity = reference.add_assembly("UnityEngine")?;
    let ref_collider = TypeBuilder::new(&ref_unity, "Collider")
        .namespace("UnityEngine")
        .build()?;

    // split into two modules in the target graph, both claiming the type
    let target_core = target.add_assembly("UnityEngine.CoreModule")?;
    let target_physics = target.add_assembly("UnityEngine.PhysicsModule")?;
    let core_collider = TypeBuilder::new(&target_core, "Collider")
        .namespace("UnityEngine")
        .build()?;
    let physics_collider = TypeBuilder::new(&target_physics, "Collider")
        .namespace("UnityEngine")
        .build()?;

    let context = MendContext::new(reference, target);
    let core_ctx = context.register(&ref_unity, &target_core);
    core_ctx.register_type(&ref_collider, &core_collider);
    let physics_ctx = context.register(&ref_unity, &target_physics);
    physics_ctx.register_type(&ref_collider, &physics_collider);

    let resolver = TypeResolver::new(&context, core_ctx.imports());
    let input = TypeRef::simple("UnityEngine", "UnityEngine", "Collider", TypeFlavor::Class);
    let resolved = resolver.resolve(&input).expect("resolvable");

    // registration order decides: the core module was registered first, so
    // its copy wins even though the physics module also matches
    assert_eq!(resolved.scope(), Some("UnityEngine.CoreModule"));
    Ok(())
}

#[test]
fn resolver_import_step_is_idempotent() -> Result<()> {
    let (context, actx) = game_context()?;
    let resolver = TypeResolver::new(&context, actx.imports());

    let first = resolver.resolve(&player()).expect("resolvable");
    let second = resolver.resolve(&player()).expect("resolvable");
    assert_eq!(first, second);
    Ok(())
}
