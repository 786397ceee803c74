//! Self-referential aliases and forward references must terminate in every
//! pass.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use rustc_hash::FxHashSet;
use xtc_diagnostic::ErrorCode;
use xtc_ir::{ClassFormat, ClassId, TypedefId, Variance};
use xtc_types::{encode, Idx, Pool, Registry, Relation, Tag, TypeEngine};

struct Decls {
    reg: Registry,
    list: ClassId,
    tree: TypedefId,
}

/// `interface List<Element> { Element head(); }` and `type Tree = List<Tree>`.
fn declare(pool: &mut Pool) -> Decls {
    let mut reg = Registry::new();
    let list = reg.declare_class("List", ClassFormat::Interface);
    let element = reg.add_type_param(list, "Element", Idx::OBJECT, Variance::Covariant);
    let element_ty = pool.generic(list, element);
    reg.add_method(list, "head", &[], &[element_ty]);

    let tree = reg.declare_typedef(None, "Tree");
    let list_ty = pool.class_type(list);
    let tree_ty = pool.typedef_type(tree);
    let target = pool.parameterized(list_ty, &[tree_ty]);
    reg.define_typedef(tree, target);
    Decls { reg, list, tree }
}

fn count_tag(pool: &Pool, root: Idx, tag: Tag) -> usize {
    let mut seen = FxHashSet::default();
    let mut stack = vec![root];
    let mut count = 0;
    while let Some(next) = stack.pop() {
        if !seen.insert(next) {
            continue;
        }
        if pool.tag(next) == tag {
            count += 1;
        }
        stack.extend(pool.data(next).children());
    }
    count
}

#[test]
fn self_referential_alias_has_one_cycle_breaker() {
    let mut pool = Pool::new();
    let d = declare(&mut pool);
    let tree_ty = pool.typedef_type(d.tree);

    let mut engine = TypeEngine::new(&mut pool, &d.reg);
    let expanded = engine.resolve_typedefs(tree_ty);
    assert_eq!(engine.render(expanded), "List<Tree>");
    assert_eq!(count_tag(engine.pool(), expanded, Tag::Recursive), 1);
    assert_eq!(count_tag(engine.pool(), expanded, Tag::Typedef), 0);
    assert_eq!(engine.resolve_typedefs(expanded), expanded);
}

#[test]
fn relation_and_synthesis_terminate_on_aliases() {
    let mut pool = Pool::new();
    let mut d = declare(&mut pool);
    let forest = d.reg.declare_typedef(None, "Forest");
    let list_ty = pool.class_type(d.list);
    let forest_ty = pool.typedef_type(forest);
    let forest_target = pool.parameterized(list_ty, &[forest_ty]);
    d.reg.define_typedef(forest, forest_target);
    let tree_ty = pool.typedef_type(d.tree);
    let list_object = pool.parameterized(list_ty, &[Idx::OBJECT]);

    let mut engine = TypeEngine::new(&mut pool, &d.reg);
    let expanded = engine.resolve_typedefs(tree_ty);
    assert_eq!(engine.relation(tree_ty, tree_ty), Relation::Equivalent);
    assert_eq!(engine.relation(tree_ty, expanded), Relation::Equivalent);
    assert!(engine.is_a(tree_ty, list_object));
    // Structurally identical but distinct aliases.
    assert_eq!(engine.relation(tree_ty, forest_ty), Relation::Equivalent);
    assert_eq!(engine.relation(forest_ty, tree_ty), Relation::Equivalent);

    let info = engine.type_info(tree_ty);
    assert!(info.is_complete());
    let head = d.reg.intern("head");
    let returns = info.methods_named(head).next().map(|m| m.signature.returns[0]);
    let returned = returns.map(|ty| engine.render(ty));
    assert_eq!(returned.as_deref(), Some("Tree"));

    assert!(!engine.validate(tree_ty));
    assert!(!engine
        .diagnostics()
        .iter()
        .any(|d| d.code == ErrorCode::E3001));
}

#[test]
fn recursive_forward_reference_resolves_and_encodes() {
    let mut pool = Pool::new();
    let d = declare(&mut pool);
    let name = d.reg.intern("Node");
    let list_ty = pool.class_type(d.list);
    let cell = pool.unresolved(name);
    let node = pool.parameterized(list_ty, &[cell]);
    assert!(pool.contains_unresolved(node));
    pool.resolve_placeholder(cell, node);
    assert!(!pool.contains_unresolved(node));

    {
        let mut engine = TypeEngine::new(&mut pool, &d.reg);
        assert_eq!(engine.relation(node, node), Relation::Equivalent);
        assert!(engine.type_info(node).is_complete());
        let resolved = engine.resolve_forward(node);
        assert_eq!(engine.resolve_forward(node), resolved);
        assert_eq!(engine.render(node), "List<List<Node>>");
    }

    let bytes = encode::encode(&pool, &[node]);
    let mut fresh = Pool::new();
    let roots = encode::decode_into(&mut fresh, &bytes).unwrap();
    assert_eq!(fresh.pending_placeholders(), 0);
    assert_eq!(fresh.format_type(roots[0], &d.reg), "List<List<Node>>");
}
