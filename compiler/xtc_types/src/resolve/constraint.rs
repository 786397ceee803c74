//! Constraint types of formals, and one-shot type-parameter inference.

use crate::registry::ContributionKind;
use crate::{Formal, Idx, TypeData, TypeEngine};

impl TypeEngine<'_> {
    /// Upper bound of a formal; any other node is its own constraint.
    ///
    /// Memoized per generation. A query that re-enters itself (a formal
    /// constrained by something that needs its own constraint) answers
    /// `Object` for the inner occurrence.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn constraint(&mut self, idx: Idx) -> Idx {
        if idx.is_sentinel() {
            return Idx::OBJECT;
        }
        let idx = self.pool.deref(idx);
        if !self.pool.is_formal(idx) {
            return idx;
        }
        match self.pool.memo().constraints.get(&idx).copied() {
            Some(Idx::PENDING) => {
                tracing::warn!(?idx, "constraint re-entered itself; using Object");
                return Idx::OBJECT;
            }
            Some(done) => return done,
            None => {}
        }
        self.pool.memo().constraints.insert(idx, Idx::PENDING);
        self.pool.stats_mut().constraint_computations += 1;
        let result = xtc_stack::ensure_sufficient_stack(|| self.compute_constraint(idx));
        self.pool.memo().constraints.insert(idx, result);
        result
    }

    /// [`constraint`](Self::constraint), answering `fallback` for
    /// `Idx::PENDING`.
    pub fn constraint_with_fallback(&mut self, idx: Idx, fallback: Idx) -> Idx {
        if idx.is_pending() {
            fallback
        } else {
            self.constraint(idx)
        }
    }

    fn compute_constraint(&mut self, idx: Idx) -> Idx {
        let ns = self.ns;
        match *self.pool.data(idx) {
            TypeData::Generic { class, name } => ns
                .class(class)
                .type_param(name)
                .map_or(Idx::OBJECT, |(_, tp)| tp.constraint),
            TypeData::TypeParam {
                method, register, ..
            } => ns
                .method(method)
                .type_params
                .get(register as usize)
                .map_or(Idx::OBJECT, |tp| tp.constraint),
            TypeData::FormalChild { parent, name } => {
                let bound = self.constraint(parent);
                let child = self.resolve_formal_child(bound, name);
                if matches!(self.pool.data(child), TypeData::FormalChild { .. }) {
                    Idx::OBJECT
                } else {
                    child
                }
            }
            TypeData::DynamicFormal { constraint, .. } => constraint,
            _ => idx,
        }
    }

    /// Infer what `formal` stands for by matching `declared` (which mentions
    /// it) against `actual`.
    ///
    /// Returns `None` when `actual` is `Idx::PENDING` (inference deferred) or
    /// when the formal does not occur in a matching position.
    pub fn resolve_type_parameter(
        &mut self,
        declared: Idx,
        actual: Idx,
        formal: &Formal,
    ) -> Option<Idx> {
        if actual.is_sentinel() || declared.is_sentinel() {
            return None;
        }
        let limit = self.pool.config().max_depth;
        self.infer_parameter(declared, actual, formal, limit)
    }

    fn infer_parameter(
        &mut self,
        declared: Idx,
        actual: Idx,
        formal: &Formal,
        hops: u32,
    ) -> Option<Idx> {
        if hops == 0 || !self.pool.contains_formal(declared) {
            return None;
        }
        let declared = self.pool.deref(declared);
        let actual = self.pool.deref(actual);
        let declared_data = self.pool.data(declared).clone();
        if Formal::of(&declared_data).as_ref() == Some(formal) {
            return Some(actual);
        }
        let actual_data = self.pool.data(actual).clone();
        match (declared_data, actual_data) {
            (TypeData::Access { inner: d, .. }, TypeData::Access { inner: a, .. })
            | (TypeData::Immutable(d), TypeData::Immutable(a))
            | (TypeData::Service(d), TypeData::Service(a)) => {
                self.infer_parameter(d, a, formal, hops - 1)
            }
            (TypeData::Union(d1, d2), TypeData::Union(a1, a2))
            | (TypeData::Intersection(d1, d2), TypeData::Intersection(a1, a2)) => self
                .infer_parameter(d1, a1, formal, hops - 1)
                .or_else(|| self.infer_parameter(d2, a2, formal, hops - 1)),
            (TypeData::Difference(d, _), TypeData::Difference(a, _)) => {
                self.infer_parameter(d, a, formal, hops - 1)
            }
            (_, TypeData::Access { inner, .. } | TypeData::Immutable(inner) | TypeData::Service(inner)) => {
                self.infer_parameter(declared, inner, formal, hops - 1)
            }
            (TypeData::Parameterized { params: declared_params, .. }, _) => {
                let declared_class = self.class_of(declared)?;
                let actual_class = self.class_of(actual)?;
                if declared_class == actual_class {
                    let actual_params = self.pool.params_of(actual).to_vec();
                    return declared_params
                        .iter()
                        .zip(actual_params)
                        .find_map(|(d, a)| self.infer_parameter(*d, a, formal, hops - 1));
                }
                self.infer_through_contributions(declared, actual, actual_class, formal, hops)
            }
            _ => None,
        }
    }

    /// Match `declared` against the contributions of `actual`'s class,
    /// resolved against `actual`'s parameters.
    fn infer_through_contributions(
        &mut self,
        declared: Idx,
        actual: Idx,
        actual_class: xtc_ir::ClassId,
        formal: &Formal,
        hops: u32,
    ) -> Option<Idx> {
        let resolver = self.param_resolver(actual);
        let decl = self.class_decl(actual_class);
        for contribution in decl.layered_contributions() {
            if contribution.kind == ContributionKind::Annotation {
                continue;
            }
            let expanded = self.resolve_typedefs(contribution.ty);
            let ty = self.resolve_generics(expanded, &resolver);
            if let Some(found) = self.infer_parameter(declared, ty, formal, hops - 1) {
                return Some(found);
            }
        }
        None
    }
}
