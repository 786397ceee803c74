use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use super::*;
use crate::Registry;
use pretty_assertions::assert_eq;
use xtc_ir::{Access, ClassFormat, Variance};

fn registry() -> (Registry, ClassId, ClassId, ClassId) {
    let mut reg = Registry::new();
    let int = reg.declare_class("Int", ClassFormat::Const);
    let string = reg.declare_class("String", ClassFormat::Const);
    let map = reg.declare_class("Map", ClassFormat::Interface);
    reg.add_type_param(map, "Key", Idx::OBJECT, Variance::Covariant);
    reg.add_type_param(map, "Value", Idx::OBJECT, Variance::Covariant);
    (reg, int, string, map)
}

#[test]
fn object_is_pre_interned() {
    let pool = Pool::new();
    assert_eq!(pool.len(), 1);
    assert_eq!(pool.data(Idx::OBJECT), &TypeData::Class(ClassId::OBJECT));
    assert!(pool.contains(Idx::OBJECT));
    assert!(!pool.contains(Idx::NONE));
}

#[test]
fn structural_equality_is_index_equality() {
    let (_, int, string, map) = registry();
    let mut pool = Pool::new();
    let int_ty = pool.class_type(int);
    let string_ty = pool.class_type(string);
    let map_ty = pool.class_type(map);
    let a = pool.parameterized(map_ty, &[int_ty, string_ty]);
    let b = pool.parameterized(map_ty, &[int_ty, string_ty]);
    let c = pool.parameterized(map_ty, &[string_ty, int_ty]);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(pool.find(pool.data(a)), Some(a));
}

#[test]
fn redundant_wrappers_collapse() {
    let (_, int, ..) = registry();
    let mut pool = Pool::new();
    let int_ty = pool.class_type(int);
    let imm = pool.immutable(int_ty);
    assert_eq!(pool.immutable(imm), imm);
    let svc = pool.service(int_ty);
    assert_eq!(pool.service(svc), svc);
    assert_eq!(pool.union(int_ty, int_ty), int_ty);
    assert_eq!(pool.intersection(int_ty, int_ty), int_ty);
}

#[test]
fn register_rejects_malformed_nodes() {
    let (_, int, _, map) = registry();
    let mut pool = Pool::new();
    let int_ty = pool.class_type(int);
    let access = pool.access(Access::Private, int_ty);

    assert_eq!(
        pool.register(TypeData::Immutable(Idx::NONE)),
        Err(RegisterError::SentinelChild {
            tag: Tag::Immutable
        })
    );
    let foreign = Idx::from_raw(999);
    assert_eq!(
        pool.register(TypeData::Service(foreign)),
        Err(RegisterError::UnknownChild {
            tag: Tag::Service,
            child: foreign
        })
    );
    assert_eq!(
        pool.register(TypeData::Access {
            access: Access::Public,
            inner: access
        }),
        Err(RegisterError::DoubleAccess)
    );
    let imm = pool.immutable(int_ty);
    let map_ty = pool.class_type(map);
    assert!(matches!(
        pool.register(TypeData::Parameterized {
            base: imm,
            params: smallvec::smallvec![map_ty]
        }),
        Err(RegisterError::ModifiedBase { .. })
    ));
    assert!(matches!(
        pool.register(TypeData::Unresolved(xtc_ir::CellId::from_raw(7))),
        Err(RegisterError::UnknownCell { cell: 7 })
    ));
    assert_eq!(pool.register(TypeData::Class(int)), Ok(int_ty));
}

#[test]
#[should_panic(expected = "invalid type node")]
fn intern_panics_on_contract_violation() {
    let mut pool = Pool::new();
    pool.immutable(Idx::PENDING);
}

#[test]
fn flags_propagate_from_children() {
    let (mut reg, _, _, map) = registry();
    let alias = reg.declare_typedef(None, "Alias");
    let key = reg.intern("Key");
    let mut pool = Pool::new();
    let map_ty = pool.class_type(map);
    let alias_ty = pool.typedef_type(alias);
    let formal = pool.generic(map, key);
    let node = pool.parameterized(map_ty, &[alias_ty, formal]);

    assert!(pool.contains_typedef(node));
    assert!(pool.contains_formal(node));
    assert!(!pool.is_formal(node));
    assert!(pool.is_formal(formal));
    assert!(!pool.contains_recursive(node));
    assert!(pool.flags(node).contains(TypeFlags::IS_MODIFIER));
    assert_eq!(pool.flags(Idx::NONE), TypeFlags::empty());
}

#[test]
fn modifier_queries_look_through_wrappers() {
    let (reg, int, ..) = registry();
    let mut pool = Pool::new();
    let int_ty = pool.class_type(int);
    let mixin = pool.class_type(ClassId::OBJECT);
    let protected = pool.access(Access::Protected, int_ty);
    let imm = pool.immutable(protected);
    let annotated = pool.annotated(mixin, imm);

    assert!(pool.is_access_specified(annotated));
    assert_eq!(pool.access_of(annotated), Access::Protected);
    assert_eq!(pool.access_of(int_ty), Access::Public);
    assert!(pool.is_immutability_specified(annotated));
    assert!(pool.is_annotated(annotated));
    assert!(!pool.is_service_specified(annotated));
    assert_eq!(pool.head(annotated), int_ty);

    let stripped = pool.strip_access(annotated);
    assert_eq!(pool.format_type(stripped, &reg), "@Object immutable Int");
    let bare = pool.strip_access_and_immutable(annotated);
    assert_eq!(pool.format_type(bare, &reg), "@Object Int");
    assert_eq!(pool.strip_service(annotated), annotated);
}

#[test]
fn params_are_found_under_modifiers() {
    let (_, int, string, map) = registry();
    let mut pool = Pool::new();
    let int_ty = pool.class_type(int);
    let string_ty = pool.class_type(string);
    let map_ty = pool.class_type(map);
    let concrete = pool.parameterized(map_ty, &[int_ty, string_ty]);
    let imm = pool.immutable(concrete);
    assert!(pool.is_params_specified(imm));
    assert_eq!(pool.params_of(imm), &[int_ty, string_ty]);
    assert!(pool.params_of(int_ty).is_empty());
}

#[test]
fn format_renders_source_like_text() {
    let (mut reg, int, string, map) = registry();
    let outer = reg.declare_class("Outer", ClassFormat::Class);
    let node = reg.declare_child(outer, "Node", ClassFormat::Class, true);
    let node_name = reg.class_mut(node).name;
    let value = reg.intern("value");
    let mut pool = Pool::new();
    let int_ty = pool.class_type(int);
    let string_ty = pool.class_type(string);
    let map_ty = pool.class_type(map);
    let outer_ty = pool.class_type(outer);
    let concrete = pool.parameterized(map_ty, &[int_ty, string_ty]);
    let either = pool.union(int_ty, string_ty);
    let both = pool.intersection(either, map_ty);
    let minus = pool.difference(map_ty, either);
    let string_minus_map = pool.difference(string_ty, map_ty);
    let nested_right = pool.difference(int_ty, string_minus_map);
    let int_minus_string = pool.difference(int_ty, string_ty);
    let nested_left = pool.difference(int_minus_string, map_ty);
    let private = pool.access(Access::Private, outer_ty);
    let child = pool.virtual_child(outer_ty, node_name);
    let property = pool.property_class(outer_ty, value);
    let this = pool.this_class(outer);

    assert_eq!(pool.format_type(concrete, &reg), "Map<Int, String>");
    assert_eq!(pool.format_type(both, &reg), "(Int | String) & Map");
    assert_eq!(pool.format_type(minus, &reg), "Map - (Int | String)");
    assert_eq!(pool.format_type(nested_left, &reg), "Int - String - Map");
    assert_eq!(pool.format_type(nested_right, &reg), "Int - (String - Map)");
    assert_eq!(pool.format_type(private, &reg), "Outer:private");
    assert_eq!(pool.format_type(child, &reg), "Outer.Node");
    assert_eq!(pool.format_type(property, &reg), "Outer.value:property");
    assert_eq!(pool.format_type(this, &reg), "this:class(Outer)");
    assert_eq!(pool.format_type(Idx::PENDING, &reg), "<pending>");
}

#[test]
fn placeholders_bind_once_and_notify() {
    let (reg, int, ..) = registry();
    let name = reg.intern("Later");
    let mut pool = Pool::new();
    let int_ty = pool.class_type(int);
    let cell = pool.unresolved(name);
    let other = pool.unresolved(name);
    assert_ne!(cell, other);
    assert_eq!(pool.pending_placeholders(), 2);
    assert!(pool.is_unbound(cell));
    assert_eq!(pool.format_type(cell, &reg), "Later");

    let seen = Arc::new(AtomicU32::new(0));
    let observer = Arc::clone(&seen);
    pool.on_resolve(cell, move |target| observer.store(target.raw(), Ordering::SeqCst));
    let generation = pool.generation();
    pool.resolve_placeholder(cell, int_ty);

    assert_eq!(seen.load(Ordering::SeqCst), int_ty.raw());
    assert_eq!(pool.generation(), generation + 1);
    assert_eq!(pool.deref(cell), int_ty);
    assert_eq!(pool.placeholder_name(cell), Some(name));
    assert_eq!(pool.pending_placeholders(), 1);
    assert_eq!(pool.format_type(cell, &reg), "Int");

    // Consumers registered after binding run immediately.
    let late = Arc::new(AtomicU32::new(0));
    let observer = Arc::clone(&late);
    pool.on_resolve(cell, move |target| observer.store(target.raw(), Ordering::SeqCst));
    assert_eq!(late.load(Ordering::SeqCst), int_ty.raw());

    // Rebinding to the same target is a no-op.
    pool.resolve_placeholder(cell, int_ty);
    assert_eq!(pool.generation(), generation + 1);
}

#[test]
#[should_panic(expected = "already bound")]
fn rebinding_to_a_different_target_panics() {
    let (reg, int, string, _) = registry();
    let name = reg.intern("Later");
    let mut pool = Pool::new();
    let int_ty = pool.class_type(int);
    let string_ty = pool.class_type(string);
    let cell = pool.unresolved(name);
    pool.resolve_placeholder(cell, int_ty);
    pool.resolve_placeholder(cell, string_ty);
}

#[test]
fn readiness_follows_bound_cells() {
    let (reg, _, _, map) = registry();
    let name = reg.intern("Later");
    let mut pool = Pool::new();
    let map_ty = pool.class_type(map);
    let outer = pool.unresolved(name);
    let inner = pool.unresolved(name);
    let holder = pool.parameterized(map_ty, &[outer, Idx::OBJECT]);
    let target = pool.parameterized(map_ty, &[inner, Idx::OBJECT]);

    assert!(pool.contains_unresolved(holder));
    pool.resolve_placeholder(outer, target);
    assert!(pool.contains_unresolved(holder));
    pool.resolve_placeholder(inner, Idx::OBJECT);
    assert!(!pool.contains_unresolved(holder));
    assert!(!pool.contains_unresolved(map_ty));
}

#[test]
fn recursive_cells_render_their_name_on_reentry() {
    let (reg, _, _, map) = registry();
    let name = reg.intern("Tree");
    let mut pool = Pool::new();
    let map_ty = pool.class_type(map);
    let cell = pool.unresolved(name);
    let node = pool.parameterized(map_ty, &[cell, cell]);
    pool.resolve_placeholder(cell, node);
    assert_eq!(pool.format_type(node, &reg), "Map<Map<Tree, Tree>, Map<Tree, Tree>>");
    assert!(!pool.contains_unresolved(node));
}

#[test]
fn invalidate_discards_memo_tables() {
    let mut pool = Pool::new();
    pool.memo().typedefs.insert(Idx::OBJECT, Idx::OBJECT);
    pool.invalidate();
    assert!(pool.memo().typedefs.is_empty());
    assert_eq!(pool.stats().cache_resets, 1);
}
