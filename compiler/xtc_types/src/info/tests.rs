use super::*;
use crate::{ContributionKind, Pool, Registry};
use xtc_ir::ClassFormat;

fn setup(pool: &mut Pool) -> (Registry, Idx, Idx, Idx) {
    let mut reg = Registry::new();
    let number = reg.declare_class("Number", ClassFormat::Const);
    let int = reg.declare_class("Int", ClassFormat::Const);
    let string = reg.declare_class("String", ClassFormat::Const);
    let number = pool.class_type(number);
    reg.add_contribution(int, ContributionKind::Extends, number);
    let int = pool.class_type(int);
    let string = pool.class_type(string);
    (reg, number, int, string)
}

fn codes(engine: &mut TypeEngine<'_>) -> Vec<ErrorCode> {
    engine.take_diagnostics().into_iter().map(|d| d.code).collect()
}

#[test]
fn own_members_and_memoization() {
    let mut pool = Pool::new();
    let (mut reg, _, int, string) = setup(&mut pool);
    let point = reg.declare_class("Point", ClassFormat::Class);
    reg.add_property(point, "x", int);
    reg.add_method(point, "describe", &[], &[string]);
    let x = reg.intern("x");
    let describe = reg.intern("describe");
    let point_ty = pool.class_type(point);

    let mut engine = TypeEngine::new(&mut pool, &reg);
    let info = engine.type_info(point_ty);
    assert!(info.is_complete());
    assert_eq!(info.class, Some(point));
    assert_eq!(info.format, Some(ClassFormat::Class));
    assert_eq!(info.property(x).map(|p| p.ty), Some(int));
    let method = info.methods_named(describe).next().map(|m| m.signature.clone());
    assert_eq!(method.map(|s| s.returns.to_vec()), Some(vec![string]));

    let builds = engine.pool().stats().type_info_builds;
    let again = engine.type_info(point_ty);
    assert!(Arc::ptr_eq(&info, &again));
    assert_eq!(engine.pool().stats().type_info_builds, builds);
    assert!(codes(&mut engine).is_empty());
}

#[test]
fn access_views_restrict_members() {
    let mut pool = Pool::new();
    let (mut reg, _, int, _) = setup(&mut pool);
    let account = reg.declare_class("Account", ClassFormat::Class);
    reg.add_property(account, "id", int);
    reg.add_property(account, "balance", int)
        .set_access(Access::Protected);
    reg.add_property(account, "pin", int).set_access(Access::Private);
    reg.add_method(account, "close", &[], &[]);
    let [id, balance, pin] = ["id", "balance", "pin"].map(|n| reg.intern(n));
    let account_ty = pool.class_type(account);
    let protected = pool.access(Access::Protected, account_ty);
    let private = pool.access(Access::Private, account_ty);
    let structure = pool.access(Access::Struct, account_ty);

    let mut engine = TypeEngine::new(&mut pool, &reg);
    let public_view = engine.type_info(account_ty);
    assert!(public_view.property(id).is_some());
    assert!(public_view.property(balance).is_none());
    assert!(public_view.property(pin).is_none());

    let protected_view = engine.type_info(protected);
    assert_eq!(protected_view.access, Access::Protected);
    assert!(protected_view.property(balance).is_some());
    assert!(protected_view.property(pin).is_none());

    let private_view = engine.type_info(private);
    assert!(private_view.property(pin).is_some());
    assert_eq!(private_view.methods.len(), 1);

    let struct_view = engine.type_info(structure);
    assert!(struct_view.methods.is_empty());
    assert_eq!(struct_view.properties.len(), 3);
}

#[test]
fn contributions_layer_without_their_privates() {
    let mut pool = Pool::new();
    let (mut reg, _, int, _) = setup(&mut pool);
    let base = reg.declare_class("Base", ClassFormat::Class);
    reg.add_property(base, "shared", int);
    reg.add_property(base, "guarded", int)
        .set_access(Access::Protected);
    reg.add_property(base, "secret", int).set_access(Access::Private);
    let derived = reg.declare_class("Derived", ClassFormat::Class);
    let base_ty = pool.class_type(base);
    reg.add_contribution(derived, ContributionKind::Extends, base_ty);
    let [shared, guarded, secret] = ["shared", "guarded", "secret"].map(|n| reg.intern(n));
    let derived_ty = pool.class_type(derived);
    let derived_private = pool.access(Access::Private, derived_ty);
    let derived_protected = pool.access(Access::Protected, derived_ty);

    let mut engine = TypeEngine::new(&mut pool, &reg);
    let public_view = engine.type_info(derived_ty);
    assert!(public_view.property(shared).is_some());
    assert!(public_view.property(guarded).is_none());
    assert_eq!(public_view.contributions.len(), 1);
    assert_eq!(public_view.contributions[0].ty, base_ty);

    assert!(engine.type_info(derived_protected).property(guarded).is_some());
    assert!(engine.type_info(derived_private).property(secret).is_none());
    assert!(codes(&mut engine).is_empty());
}

#[test]
fn generic_members_see_actual_parameters() {
    let mut pool = Pool::new();
    let (mut reg, _, int, _) = setup(&mut pool);
    let boxed = reg.declare_class("Box", ClassFormat::Class);
    let value = reg.add_type_param(boxed, "Value", Idx::OBJECT, xtc_ir::Variance::Covariant);
    let formal = pool.generic(boxed, value);
    reg.add_property(boxed, "content", formal);
    reg.add_method(boxed, "get", &[], &[formal]);
    let [content, get] = ["content", "get"].map(|n| reg.intern(n));
    let box_ty = pool.class_type(boxed);
    let box_int = pool.parameterized(box_ty, &[int]);

    let mut engine = TypeEngine::new(&mut pool, &reg);
    let info = engine.type_info(box_int);
    assert_eq!(info.type_param(value).map(|p| p.actual), Some(int));
    assert_eq!(info.property(content).map(|p| p.ty), Some(int));
    let returns = info.methods_named(get).next().map(|m| m.signature.returns[0]);
    assert_eq!(returns, Some(int));
    assert_eq!(engine.property_type(box_int, content), Some(int));

    // The raw class sees the constraint.
    assert_eq!(engine.property_type(box_ty, content), Some(Idx::OBJECT));
}

#[test]
fn modifiers_set_view_flags() {
    let mut pool = Pool::new();
    let (mut reg, _, int, _) = setup(&mut pool);
    let plain = reg.declare_class("Plain", ClassFormat::Class);
    let plain_ty = pool.class_type(plain);
    let imm = pool.immutable(plain_ty);
    let svc = pool.service(plain_ty);

    let mut engine = TypeEngine::new(&mut pool, &reg);
    assert!(!engine.type_info(plain_ty).immutable);
    assert!(engine.type_info(imm).immutable);
    assert!(engine.type_info(svc).service);
    assert!(engine.type_info(int).immutable);
}

#[test]
fn circular_contributions_are_incomplete() {
    let mut pool = Pool::new();
    let (mut reg, ..) = setup(&mut pool);
    let a = reg.declare_class("A", ClassFormat::Class);
    let b = reg.declare_class("B", ClassFormat::Class);
    let a_ty = pool.class_type(a);
    let b_ty = pool.class_type(b);
    reg.add_contribution(a, ContributionKind::Extends, b_ty);
    reg.add_contribution(b, ContributionKind::Extends, a_ty);

    let mut engine = TypeEngine::new(&mut pool, &reg);
    let info = engine.type_info(a_ty);
    assert!(!info.is_complete());
    assert!(codes(&mut engine).contains(&ErrorCode::E2005));
    assert!(engine.pool_mut().memo().infos.get(&a_ty).is_none());
}

#[test]
fn unbound_placeholders_give_incomplete_uncached_views() {
    let mut pool = Pool::new();
    let (reg, ..) = setup(&mut pool);
    let name = reg.intern("Later");
    let cell = pool.unresolved(name);

    let mut engine = TypeEngine::new(&mut pool, &reg);
    let info = engine.type_info(cell);
    assert_eq!(info.progress, Progress::Incomplete);
    assert_eq!(info.diagnostics[0].code, ErrorCode::E2008);
    assert!(!info.diagnostics[0].is_error());
    assert_eq!(engine.pool().stats().type_info_builds, 0);
}

#[test]
fn bound_placeholders_view_their_target() {
    let mut pool = Pool::new();
    let (mut reg, _, int, _) = setup(&mut pool);
    let point = reg.declare_class("Point", ClassFormat::Class);
    reg.add_property(point, "x", int);
    let x = reg.intern("x");
    let point_ty = pool.class_type(point);
    let name = reg.intern("Point");
    let cell = pool.unresolved(name);
    pool.resolve_placeholder(cell, point_ty);

    let mut engine = TypeEngine::new(&mut pool, &reg);
    let info = engine.type_info(cell);
    assert!(info.is_complete());
    assert_eq!(info.ty, cell);
    assert!(info.property(x).is_some());
}

#[test]
fn diamond_contributions_merge_silently() {
    let mut pool = Pool::new();
    let (mut reg, _, int, _) = setup(&mut pool);
    let root = reg.declare_class("Root", ClassFormat::Interface);
    reg.add_property(root, "p", int);
    let left = reg.declare_class("Left", ClassFormat::Interface);
    let right = reg.declare_class("Right", ClassFormat::Interface);
    let c = reg.declare_class("C", ClassFormat::Class);
    let root_ty = pool.class_type(root);
    let left_ty = pool.class_type(left);
    let right_ty = pool.class_type(right);
    reg.add_contribution(left, ContributionKind::Implements, root_ty);
    reg.add_contribution(right, ContributionKind::Implements, root_ty);
    reg.add_contribution(c, ContributionKind::Implements, left_ty);
    reg.add_contribution(c, ContributionKind::Implements, right_ty);
    let p = reg.intern("p");
    let c_ty = pool.class_type(c);

    let mut engine = TypeEngine::new(&mut pool, &reg);
    let info = engine.type_info(c_ty);
    assert!(codes(&mut engine).is_empty());
    let property = info.property(p).map(|p| p.identities.clone());
    assert_eq!(property, Some(BTreeSet::from([root])));
}

#[test]
fn conflicting_contributions_are_ambiguous() {
    let mut pool = Pool::new();
    let (mut reg, _, int, string) = setup(&mut pool);
    let first = reg.declare_class("First", ClassFormat::Interface);
    reg.add_property(first, "value", int);
    let second = reg.declare_class("Second", ClassFormat::Interface);
    reg.add_property(second, "value", string);
    let both = reg.declare_class("Both", ClassFormat::Class);
    let first_ty = pool.class_type(first);
    let second_ty = pool.class_type(second);
    reg.add_contribution(both, ContributionKind::Implements, first_ty);
    reg.add_contribution(both, ContributionKind::Implements, second_ty);
    let both_ty = pool.class_type(both);

    let mut engine = TypeEngine::new(&mut pool, &reg);
    let info = engine.type_info(both_ty);
    assert_eq!(info.diagnostics[0].code, ErrorCode::E2001);
    assert!(info.diagnostics[0].message.contains("value"));
}

#[test]
fn compatible_contributions_keep_the_narrower_type() {
    let mut pool = Pool::new();
    let (mut reg, number, int, _) = setup(&mut pool);
    let first = reg.declare_class("First", ClassFormat::Interface);
    reg.add_property(first, "value", number);
    let second = reg.declare_class("Second", ClassFormat::Interface);
    reg.add_property(second, "value", int);
    let both = reg.declare_class("Both", ClassFormat::Class);
    let first_ty = pool.class_type(first);
    let second_ty = pool.class_type(second);
    reg.add_contribution(both, ContributionKind::Implements, first_ty);
    reg.add_contribution(both, ContributionKind::Implements, second_ty);
    let value = reg.intern("value");
    let both_ty = pool.class_type(both);

    let mut engine = TypeEngine::new(&mut pool, &reg);
    let info = engine.type_info(both_ty);
    assert!(codes(&mut engine).is_empty());
    let property = info.property(value).cloned();
    assert_eq!(property.as_ref().map(|p| p.ty), Some(int));
    assert_eq!(
        property.map(|p| p.identities),
        Some(BTreeSet::from([first, second]))
    );
}

#[test]
fn static_and_instance_members_collide() {
    let mut pool = Pool::new();
    let (mut reg, _, int, _) = setup(&mut pool);
    let base = reg.declare_class("Base", ClassFormat::Class);
    reg.add_property(base, "count", int).set_static();
    let derived = reg.declare_class("Derived", ClassFormat::Class);
    let base_ty = pool.class_type(base);
    reg.add_contribution(derived, ContributionKind::Extends, base_ty);
    reg.add_property(derived, "count", int);
    let derived_ty = pool.class_type(derived);

    let mut engine = TypeEngine::new(&mut pool, &reg);
    engine.type_info(derived_ty);
    assert_eq!(codes(&mut engine), vec![ErrorCode::E2003]);
}

#[test]
fn property_overrides() {
    let mut pool = Pool::new();
    let (mut reg, number, int, _) = setup(&mut pool);
    let base = reg.declare_class("Base", ClassFormat::Class);
    reg.add_property(base, "value", number);
    let base_ty = pool.class_type(base);

    let narrowing = reg.declare_class("Narrowing", ClassFormat::Class);
    reg.add_contribution(narrowing, ContributionKind::Extends, base_ty);
    reg.add_property(narrowing, "value", int).set_override();
    let widening = reg.declare_class("Widening", ClassFormat::Class);
    reg.add_contribution(widening, ContributionKind::Extends, base_ty);
    reg.add_property(widening, "value", Idx::OBJECT).set_override();
    let orphan = reg.declare_class("Orphan", ClassFormat::Class);
    reg.add_contribution(orphan, ContributionKind::Extends, base_ty);
    reg.add_property(orphan, "extra", int).set_override();
    let value = reg.intern("value");
    let narrowing_ty = pool.class_type(narrowing);
    let widening_ty = pool.class_type(widening);
    let orphan_ty = pool.class_type(orphan);

    let mut engine = TypeEngine::new(&mut pool, &reg);
    let info = engine.type_info(narrowing_ty);
    assert!(codes(&mut engine).is_empty());
    let property = info.property(value).cloned();
    assert_eq!(property.as_ref().map(|p| p.ty), Some(int));
    assert_eq!(property.map(|p| p.head), Some(narrowing));

    engine.type_info(widening_ty);
    assert_eq!(codes(&mut engine), vec![ErrorCode::E2007]);
    engine.type_info(orphan_ty);
    assert_eq!(codes(&mut engine), vec![ErrorCode::E2004]);
}

#[test]
fn method_overrides_cap_the_method_they_narrow() {
    let mut pool = Pool::new();
    let (mut reg, number, int, _) = setup(&mut pool);
    let base = reg.declare_class("Base", ClassFormat::Class);
    let base_make = reg.add_method(base, "make", &[], &[number]);
    let derived = reg.declare_class("Derived", ClassFormat::Class);
    let base_ty = pool.class_type(base);
    reg.add_contribution(derived, ContributionKind::Extends, base_ty);
    let derived_make = reg.add_method(derived, "make", &[], &[int]);
    reg.method_mut(derived_make).set_override();
    let make = reg.intern("make");
    let derived_ty = pool.class_type(derived);

    let mut engine = TypeEngine::new(&mut pool, &reg);
    let info = engine.type_info(derived_ty);
    assert!(codes(&mut engine).is_empty());
    let methods: Vec<&MethodInfo> = info.methods_named(make).collect();
    assert_eq!(methods.len(), 2);
    let inherited = methods.iter().find(|m| m.head == base_make);
    let capping = inherited.and_then(|m| m.capped_by.as_ref()).map(|s| s.returns[0]);
    assert_eq!(capping, Some(int));
    let own = methods.iter().find(|m| m.head == derived_make);
    assert_eq!(
        own.map(|m| m.identities.clone()),
        Some(BTreeSet::from([base_make, derived_make]))
    );
}

#[test]
fn method_overrides_without_a_single_target() {
    let mut pool = Pool::new();
    let (mut reg, number, int, _) = setup(&mut pool);
    let base = reg.declare_class("Base", ClassFormat::Class);
    reg.add_method(base, "accept", &[int], &[]);
    reg.add_method(base, "accept", &[number], &[]);
    let base_ty = pool.class_type(base);

    let broad = reg.declare_class("Broad", ClassFormat::Class);
    reg.add_contribution(broad, ContributionKind::Extends, base_ty);
    let accept_any = reg.add_method(broad, "accept", &[Idx::OBJECT], &[]);
    reg.method_mut(accept_any).set_override();
    let stray = reg.declare_class("Stray", ClassFormat::Class);
    reg.add_contribution(stray, ContributionKind::Extends, base_ty);
    let missing = reg.add_method(stray, "missing", &[], &[]);
    reg.method_mut(missing).set_override();
    let broad_ty = pool.class_type(broad);
    let stray_ty = pool.class_type(stray);

    let mut engine = TypeEngine::new(&mut pool, &reg);
    engine.type_info(broad_ty);
    assert_eq!(codes(&mut engine), vec![ErrorCode::E2006]);
    engine.type_info(stray_ty);
    assert_eq!(codes(&mut engine), vec![ErrorCode::E2004]);
}

#[test]
fn unions_keep_common_members() {
    let mut pool = Pool::new();
    let (mut reg, _, int, string) = setup(&mut pool);
    let x = reg.declare_class("X", ClassFormat::Class);
    reg.add_property(x, "a", int);
    reg.add_property(x, "b", int);
    let y = reg.declare_class("Y", ClassFormat::Class);
    reg.add_property(y, "a", string);
    let [a, b] = ["a", "b"].map(|n| reg.intern(n));
    let x_ty = pool.class_type(x);
    let y_ty = pool.class_type(y);
    let either = pool.union(x_ty, y_ty);

    let mut engine = TypeEngine::new(&mut pool, &reg);
    let info = engine.type_info(either);
    let int_or_string = engine.pool_mut().union(int, string);
    assert_eq!(info.property(a).map(|p| p.ty), Some(int_or_string));
    assert!(info.property(b).is_none());
    assert_eq!(info.class, None);
}

#[test]
fn intersections_and_annotations_layer_members() {
    let mut pool = Pool::new();
    let (mut reg, ..) = setup(&mut pool);
    let first = reg.declare_class("First", ClassFormat::Interface);
    reg.add_method(first, "one", &[], &[]);
    let second = reg.declare_class("Second", ClassFormat::Interface);
    reg.add_method(second, "two", &[], &[]);
    let logged = reg.declare_class("Logged", ClassFormat::Mixin);
    reg.add_method(logged, "log", &[], &[]);
    let [one, two, log] = ["one", "two", "log"].map(|n| reg.intern(n));
    let first_ty = pool.class_type(first);
    let second_ty = pool.class_type(second);
    let logged_ty = pool.class_type(logged);
    let both = pool.intersection(first_ty, second_ty);
    let annotated = pool.annotated(logged_ty, first_ty);

    let mut engine = TypeEngine::new(&mut pool, &reg);
    let info = engine.type_info(both);
    assert!(info.methods_named(one).next().is_some());
    assert!(info.methods_named(two).next().is_some());

    let info = engine.type_info(annotated);
    assert!(info.methods_named(one).next().is_some());
    assert!(info.methods_named(log).next().is_some());
    assert_eq!(info.annotations, vec![logged_ty]);
}

#[test]
fn formals_and_children() {
    let mut pool = Pool::new();
    let (mut reg, _, _, string) = setup(&mut pool);
    let named = reg.declare_class("Named", ClassFormat::Interface);
    reg.add_method(named, "name", &[], &[string]);
    let named_ty = pool.class_type(named);
    let holder = reg.declare_class("Holder", ClassFormat::Class);
    let t = reg.add_type_param(holder, "T", named_ty, xtc_ir::Variance::Covariant);
    let node = reg.declare_child(holder, "Node", ClassFormat::Class, true);
    let [name, node_name] = ["name", "Node"].map(|n| reg.intern(n));
    let formal = pool.generic(holder, t);
    let holder_ty = pool.class_type(holder);

    let mut engine = TypeEngine::new(&mut pool, &reg);
    let info = engine.type_info(formal);
    assert!(info.methods_named(name).next().is_some());
    assert_eq!(info.ty, formal);

    let info = engine.type_info(holder_ty);
    let child = info.children.get(&node_name).cloned();
    assert_eq!(child.as_ref().map(|c| c.class), Some(node));
    assert_eq!(child.map(|c| c.is_virtual), Some(true));
}

#[test]
fn overrides_checked_against_the_view_being_built() {
    // `interface Named { String name(); }`, `class Holder { Named p; }`,
    // `class Item extends Holder { String name(); @Override Item p; }`:
    // checking the override asks whether `Item` duck-types `Named` while
    // `Item`'s own view is still being built.
    let mut pool = Pool::new();
    let (mut reg, _, _, string) = setup(&mut pool);
    let named = reg.declare_class("Named", ClassFormat::Interface);
    reg.add_method(named, "name", &[], &[string]);
    let named_ty = pool.class_type(named);
    let holder = reg.declare_class("Holder", ClassFormat::Class);
    reg.add_property(holder, "p", named_ty);
    let holder_ty = pool.class_type(holder);
    let item = reg.declare_class("Item", ClassFormat::Class);
    let item_ty = pool.class_type(item);
    reg.add_contribution(item, ContributionKind::Extends, holder_ty);
    reg.add_method(item, "name", &[], &[string]);
    reg.add_property(item, "p", item_ty).set_override();
    let p = reg.intern("p");

    let mut engine = TypeEngine::new(&mut pool, &reg);
    for _ in 0..2 {
        let info = engine.type_info(item_ty);
        assert!(info.is_complete());
        assert!(info.diagnostics.is_empty());
        assert_eq!(info.property(p).map(|prop| prop.ty), Some(item_ty));
        assert!(codes(&mut engine).is_empty());
        assert!(engine.is_a(item_ty, named_ty));
        engine.pool_mut().invalidate();
    }
}

#[test]
fn difference_views_drop_the_second_sides_members() {
    let mut pool = Pool::new();
    let (mut reg, _, int, string) = setup(&mut pool);
    let person = reg.declare_class("Person", ClassFormat::Class);
    reg.add_property(person, "id", int);
    reg.add_property(person, "nick", string);
    reg.add_method(person, "name", &[], &[string]);
    reg.add_method(person, "age", &[], &[int]);
    let aged = reg.declare_class("Aged", ClassFormat::Interface);
    reg.add_property(aged, "id", int);
    reg.add_method(aged, "age", &[], &[int]);
    let [id, nick, name, age] = ["id", "nick", "name", "age"].map(|n| reg.intern(n));
    let person_ty = pool.class_type(person);
    let aged_ty = pool.class_type(aged);
    let ageless = pool.difference(person_ty, aged_ty);

    let mut engine = TypeEngine::new(&mut pool, &reg);
    let info = engine.type_info(ageless);
    assert!(info.is_complete());
    assert_eq!(info.class, None);
    assert!(info.property(nick).is_some());
    assert!(info.property(id).is_none());
    assert_eq!(info.methods_named(name).count(), 1);
    assert_eq!(info.methods_named(age).count(), 0);
    assert!(codes(&mut engine).is_empty());
}
