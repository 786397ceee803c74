//! View construction per node kind.

use std::collections::BTreeSet;

use smallvec::SmallVec;
use xtc_ir::Access;

use super::{ChildInfo, MethodInfo, ParamInfo, PropertyInfo, Signature, TypeInfo};
use crate::registry::ContributionKind;
use crate::{Contribution, Formal, GenericResolver, Idx, TypeData, TypeEngine};

impl TypeEngine<'_> {
    /// Build the view of `idx`: the full view for `X:private`, and a
    /// restriction of it for every other access.
    pub(super) fn build_info(&mut self, idx: Idx) -> TypeInfo {
        let access = self.pool.access_of(idx);
        let bare = self.pool.strip_access(idx);
        if access == Access::Private && self.pool.is_access_specified(idx) {
            let mut info = self.build_full(bare);
            info.ty = idx;
            info.access = Access::Private;
            return info;
        }
        let full = self.pool.access(Access::Private, bare);
        let mut info = (*self.type_info(full)).clone();
        info.ty = idx;
        info.restrict(access);
        info
    }

    /// Every member of `ty`, which carries no access modifier.
    fn build_full(&mut self, ty: Idx) -> TypeInfo {
        let generation = self.pool.generation();
        match self.pool.data(ty).clone() {
            TypeData::Immutable(inner) => {
                let mut info = self.full_view(inner);
                info.ty = ty;
                info.immutable = true;
                info
            }
            TypeData::Service(inner) => {
                let mut info = self.full_view(inner);
                info.ty = ty;
                info.service = true;
                info
            }
            TypeData::Annotated { annotation, inner } => {
                let mut info = self.full_view(inner);
                info.ty = ty;
                let layer = self.layer_view(annotation);
                self.merge_layer(&mut info, &layer);
                info.annotations.push(annotation);
                info.contributions.push(Contribution {
                    kind: ContributionKind::Annotation,
                    ty: annotation,
                });
                info
            }
            TypeData::Union(a, b) => {
                let va = self.full_view(a);
                let vb = self.full_view(b);
                self.common_members(ty, &va, &vb)
            }
            TypeData::Intersection(a, b) => {
                let mut info = self.full_view(a);
                info.ty = ty;
                info.class = None;
                let vb = self.full_view(b);
                self.merge_layer(&mut info, &vb);
                info.immutable |= vb.immutable;
                info
            }
            TypeData::Difference(a, b) => {
                let va = self.full_view(a);
                let vb = self.view_at(b, Access::Public);
                self.remaining_members(ty, &va, &vb)
            }
            TypeData::Generic { .. }
            | TypeData::TypeParam { .. }
            | TypeData::FormalChild { .. }
            | TypeData::DynamicFormal { .. } => {
                let bound = self.constraint(ty);
                self.view_as(ty, bound)
            }
            TypeData::PropertyClass { parent, property } => {
                match self.property_type(parent, property) {
                    Some(property_ty) => self.view_as(ty, property_ty),
                    None => Self::incomplete(ty, generation),
                }
            }
            TypeData::Recursive(typedef) => {
                let expanded = self.expand_recursive(typedef);
                self.view_as(ty, expanded)
            }
            TypeData::Typedef(_) => {
                let expanded = self.resolve_typedefs(ty);
                self.view_as(ty, expanded)
            }
            TypeData::Unresolved(_) => match self.pool.placeholder_target(ty) {
                Some(target) => self.view_as(ty, target),
                None => Self::incomplete(ty, generation),
            },
            TypeData::ThisClass(_) => {
                let narrowed = self.resolve_auto_narrowing(ty, None);
                self.view_as(ty, narrowed)
            }
            TypeData::Access { .. } => {
                let bare = self.pool.strip_access(ty);
                self.view_as(ty, bare)
            }
            TypeData::Class(_)
            | TypeData::Parameterized { .. }
            | TypeData::VirtualChild { .. }
            | TypeData::InnerChild { .. }
            | TypeData::AnonymousClass { .. } => self.build_class_info(ty),
        }
    }

    fn incomplete(ty: Idx, generation: u64) -> TypeInfo {
        let mut info = TypeInfo::empty(ty, generation);
        info.mark_incomplete();
        info
    }

    /// The full view of `other`, presented as the view of `ty`.
    fn view_as(&mut self, ty: Idx, other: Idx) -> TypeInfo {
        if other == ty {
            return Self::incomplete(ty, self.pool.generation());
        }
        let mut info = self.full_view(other);
        info.ty = ty;
        info
    }

    fn full_view(&mut self, ty: Idx) -> TypeInfo {
        self.view_at(ty, Access::Private)
    }

    /// What a contribution passes on to the class it joins: everything but
    /// its private members.
    fn layer_view(&mut self, ty: Idx) -> TypeInfo {
        self.view_at(ty, Access::Protected)
    }

    fn view_at(&mut self, ty: Idx, access: Access) -> TypeInfo {
        let bare = self.pool.strip_access(ty);
        let at = self.pool.access(access, bare);
        (*self.type_info(at)).clone()
    }

    /// Resolve a member or contribution type declared inside the class of
    /// `self_ty`: aliases, then the class formals, then `this:class`.
    fn member_type(&mut self, ty: Idx, resolver: &dyn GenericResolver, self_ty: Idx) -> Idx {
        let expanded = self.resolve_typedefs(ty);
        let substituted = self.resolve_generics(expanded, resolver);
        self.resolve_auto_narrowing(substituted, Some(self_ty))
    }

    fn build_class_info(&mut self, ty: Idx) -> TypeInfo {
        let generation = self.pool.generation();
        let Some(class) = self.class_of(ty) else {
            return Self::incomplete(ty, generation);
        };
        let ns = self.ns;
        let decl = ns.class(class);
        let resolver = self.param_resolver(ty);

        let mut info = TypeInfo::empty(ty, generation);
        info.class = Some(class);
        info.format = Some(decl.format);
        info.immutable = self.is_immutable(ty);
        info.service = decl.format.is_service();
        info.type_params = decl
            .type_params
            .iter()
            .map(|tp| ParamInfo {
                name: tp.name,
                actual: resolver
                    .get(&Formal::Generic {
                        class,
                        name: tp.name,
                    })
                    .unwrap_or(tp.constraint),
                constraint: tp.constraint,
                variance: tp.variance,
            })
            .collect();

        let layered = decl.layered_contributions();
        let (annotations, bases): (Vec<&Contribution>, Vec<&Contribution>) = layered
            .into_iter()
            .partition(|c| c.kind == ContributionKind::Annotation);

        for contribution in bases {
            let contributed = self.member_type(contribution.ty, &resolver, ty);
            let layer = self.layer_view(contributed);
            self.merge_layer(&mut info, &layer);
            info.contributions.push(Contribution {
                kind: contribution.kind,
                ty: contributed,
            });
        }

        for property in &decl.properties {
            let property_ty = self.member_type(property.ty, &resolver, ty);
            let incoming = PropertyInfo {
                name: property.name,
                ty: property_ty,
                access: property.access,
                is_static: property.is_static,
                is_override: property.is_override,
                identities: BTreeSet::from([class]),
                head: class,
            };
            self.merge_property(&mut info, incoming, true);
        }

        for &method in &decl.methods {
            let method_decl = ns.method(method);
            let params: SmallVec<[Idx; 4]> = method_decl
                .params
                .iter()
                .map(|p| self.member_type(*p, &resolver, ty))
                .collect();
            let returns: SmallVec<[Idx; 2]> = method_decl
                .returns
                .iter()
                .map(|r| self.member_type(*r, &resolver, ty))
                .collect();
            let incoming = MethodInfo {
                signature: Signature {
                    name: method_decl.name,
                    params,
                    returns,
                },
                access: method_decl.access,
                is_static: method_decl.is_static,
                is_override: method_decl.is_override,
                identities: BTreeSet::from([method]),
                head: method,
                capped_by: None,
            };
            self.merge_method(&mut info, incoming, true);
        }

        for &(name, child) in &decl.children {
            info.children.insert(
                name,
                ChildInfo {
                    name,
                    class: child,
                    is_virtual: ns.class(child).is_virtual_child,
                },
            );
        }

        for contribution in annotations {
            let annotation = self.member_type(contribution.ty, &resolver, ty);
            let layer = self.layer_view(annotation);
            self.merge_layer(&mut info, &layer);
            info.annotations.push(annotation);
            info.contributions.push(Contribution {
                kind: ContributionKind::Annotation,
                ty: annotation,
            });
        }

        info
    }

    /// Members of `a` that `b` does not declare. Type parameters of `a`
    /// survive unless `b` binds the same name to something not assignable
    /// to `a`'s actual.
    fn remaining_members(&mut self, ty: Idx, a: &TypeInfo, b: &TypeInfo) -> TypeInfo {
        let mut info = TypeInfo::empty(ty, self.pool.generation());
        if !a.is_complete() || !b.is_complete() {
            info.mark_incomplete();
        }
        info.immutable = a.immutable;

        for param in &a.type_params {
            let keep = match b.type_param(param.name) {
                Some(other) => self.is_a(other.actual, param.actual),
                None => true,
            };
            if keep {
                info.type_params.push(param.clone());
            }
        }
        for (name, property) in &a.properties {
            if !b.properties.contains_key(name) {
                info.properties.insert(*name, property.clone());
            }
        }
        for (name, signatures) in &a.methods_by_name {
            for signature in signatures {
                if b.methods.contains_key(signature) {
                    continue;
                }
                if let Some(method) = a.methods.get(signature) {
                    info.methods_by_name
                        .entry(*name)
                        .or_default()
                        .push(signature.clone());
                    info.methods.insert(signature.clone(), method.clone());
                }
            }
        }
        for (name, child) in &a.children {
            if !b.children.contains_key(name) {
                info.children.insert(*name, child.clone());
            }
        }
        info
    }

    /// Members both sides of a union agree on.
    fn common_members(&mut self, ty: Idx, a: &TypeInfo, b: &TypeInfo) -> TypeInfo {
        let mut info = TypeInfo::empty(ty, self.pool.generation());
        if !a.is_complete() || !b.is_complete() {
            info.mark_incomplete();
        }
        info.immutable = a.immutable && b.immutable;
        info.service = a.service && b.service;

        for (name, pa) in &a.properties {
            let Some(pb) = b.properties.get(name) else {
                continue;
            };
            let mut merged = pa.clone();
            if pa.ty != pb.ty {
                merged.ty = self.pool.union(pa.ty, pb.ty);
            }
            merged.identities.extend(pb.identities.iter().copied());
            info.properties.insert(*name, merged);
        }
        for (signature, ma) in &a.methods {
            if let Some(mb) = b.methods.get(signature) {
                let mut merged = ma.clone();
                merged.identities.extend(mb.identities.iter().copied());
                info.methods_by_name
                    .entry(signature.name)
                    .or_default()
                    .push(signature.clone());
                info.methods.insert(signature.clone(), merged);
            }
        }
        for (name, child) in &a.children {
            if b.children.contains_key(name) {
                info.children.insert(*name, child.clone());
            }
        }
        info
    }
}
