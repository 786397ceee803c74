//! Relation calculus: assignability between type nodes.
//!
//! [`TypeEngine::relation`]`(left, right)` answers whether a value of type
//! `right` may be used where `left` is expected. The directional question is
//! [`TypeEngine::assignable`]; `relation` asks it both ways and reports
//! mutual assignability as [`Relation::Equivalent`].
//!
//! # Algorithm
//!
//! 1. identity and `Object` on the left are trivially satisfied; `Pending`
//!    cannot be decided
//! 2. aliases and bound placeholders are expanded first; `Recursive(t)`
//!    compares as the current expansion of `t`
//! 3. access, immutability and service qualifiers are checked and stripped
//! 4. annotations and relational types split into their parts
//! 5. formals compare through their constraints
//! 6. parent-dependent types compare by name and parent context
//! 7. classes compare by parameter variance (same class) or through the
//!    right side's contributions, then by duck typing for interfaces
//!
//! Results are memoized per generation. A pair that re-enters itself is
//! assumed to hold at the inner occurrence, so recursive types and
//! interfaces that mention themselves compare structurally. Answers that
//! depend on such an assumption, or on a view that is still being built, are
//! not memoized until the outermost query settles them.

mod class;
mod duck;

use std::fmt;

use xtc_ir::Access;

use crate::{Idx, TypeData, TypeEngine};

/// Outcome of a relation query.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Assignable in both directions.
    Equivalent,
    /// Assignable in the queried direction.
    IsA,
    /// Proven not assignable.
    Incompatible,
    /// Cannot be decided in this context (unbound placeholder, free formal).
    /// Not a proof of incompatibility.
    Unknown,
}

impl Relation {
    /// `Equivalent` or `IsA`.
    #[inline]
    pub const fn is_fit(self) -> bool {
        matches!(self, Relation::Equivalent | Relation::IsA)
    }

    /// Combination where every part must hold.
    pub const fn worst(self, other: Relation) -> Relation {
        match (self, other) {
            (Relation::Incompatible, _) | (_, Relation::Incompatible) => Relation::Incompatible,
            (Relation::Unknown, _) | (_, Relation::Unknown) => Relation::Unknown,
            (Relation::Equivalent, Relation::Equivalent) => Relation::Equivalent,
            _ => Relation::IsA,
        }
    }

    /// Combination where any part suffices.
    pub const fn best(self, other: Relation) -> Relation {
        match (self, other) {
            (Relation::Equivalent, _) | (_, Relation::Equivalent) => Relation::Equivalent,
            (Relation::IsA, _) | (_, Relation::IsA) => Relation::IsA,
            (Relation::Unknown, _) | (_, Relation::Unknown) => Relation::Unknown,
            _ => Relation::Incompatible,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::Equivalent => "equivalent",
            Relation::IsA => "is-a",
            Relation::Incompatible => "incompatible",
            Relation::Unknown => "unknown",
        })
    }
}

impl TypeEngine<'_> {
    /// Whether `right` may be used where `left` is expected, reporting
    /// mutual assignability as `Equivalent`.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn relation(&mut self, left: Idx, right: Idx) -> Relation {
        if left == right && !left.is_sentinel() {
            return Relation::Equivalent;
        }
        match self.assignable(left, right) {
            fit if fit.is_fit() => {
                if self.assignable(right, left).is_fit() {
                    Relation::Equivalent
                } else {
                    Relation::IsA
                }
            }
            other => other,
        }
    }

    /// Whether `sub` is-a `sup`: a value of `sub` is usable where `sup` is
    /// expected.
    #[inline]
    pub fn is_a(&mut self, sub: Idx, sup: Idx) -> bool {
        self.assignable(sup, sub).is_fit()
    }

    /// Directional assignability of `right` into `left`.
    pub fn assignable(&mut self, left: Idx, right: Idx) -> Relation {
        if left.is_pending() || right.is_pending() {
            return Relation::Unknown;
        }
        if left.is_none() || right.is_none() {
            return Relation::Incompatible;
        }
        if left == right || left == Idx::OBJECT {
            return Relation::IsA;
        }

        let cache = self.pool.config().cache_relations;
        if cache {
            if let Some(&known) = self.pool.memo().relations.get(&(left, right)) {
                return known;
            }
        }
        if !self.relating.insert((left, right)) {
            self.reentries += 1;
            let cyclic = self
                .class_of(right)
                .is_some_and(|class| self.walking.contains(&(left, class)));
            if cyclic {
                // Circular contributions; validation reports the class.
                return Relation::Incompatible;
            }
            tracing::trace!(?left, ?right, "relation re-entered itself; assuming it holds");
            return Relation::IsA;
        }
        let Some(_level) = self.enter(right) else {
            self.relating.remove(&(left, right));
            return Relation::Unknown;
        };

        let reentries = self.reentries;
        let partial_views = self.partial_views;
        self.pool.stats_mut().relation_computations += 1;
        let result = xtc_stack::ensure_sufficient_stack(|| self.compute_assignable(left, right));
        self.relating.remove(&(left, right));

        let settled = (self.reentries == reentries || self.relating.is_empty())
            && self.partial_views == partial_views;
        if cache && settled {
            self.pool.memo().relations.insert((left, right), result);
        }
        tracing::trace!(?left, ?right, %result, "relation computed");
        result
    }

    fn compute_assignable(&mut self, left: Idx, right: Idx) -> Relation {
        // Aliases and bound placeholders.
        let l = self.normalize(left);
        let r = self.normalize(right);
        if l != left || r != right {
            return self.assignable(l, r);
        }
        if self.pool.is_unbound(l) || self.pool.is_unbound(r) {
            return Relation::Unknown;
        }
        if let TypeData::Recursive(typedef) = *self.pool.data(l) {
            let expanded = self.expand_recursive(typedef);
            return self.assignable(expanded, r);
        }
        if let TypeData::Recursive(typedef) = *self.pool.data(r) {
            let expanded = self.expand_recursive(typedef);
            return self.assignable(l, expanded);
        }

        if let Some(relation) = self.relate_qualifiers(l, r) {
            return relation;
        }
        if let Some(relation) = self.relate_composites(l, r) {
            return relation;
        }
        if let Some(relation) = self.relate_deferred(l, r) {
            return relation;
        }
        self.relate_classes(l, r)
    }

    /// Expand aliases and follow bound placeholders at the top.
    fn normalize(&mut self, idx: Idx) -> Idx {
        let expanded = self.resolve_typedefs(idx);
        self.pool.deref(expanded)
    }

    /// Access, immutability and service qualifiers.
    fn relate_qualifiers(&mut self, l: Idx, r: Idx) -> Option<Relation> {
        let l_access = self.pool.is_access_specified(l);
        let r_access = self.pool.is_access_specified(r);
        if l_access || r_access {
            let required = self.pool.access_of(l);
            let offered = self.pool.access_of(r);
            let allowed = match (required, offered) {
                (Access::Struct, Access::Struct) => true,
                (Access::Struct, _) | (_, Access::Struct) => false,
                (required, offered) => offered.reveals(required),
            };
            if !allowed {
                return Some(Relation::Incompatible);
            }
            let ls = self.pool.strip_access(l);
            let rs = self.pool.strip_access(r);
            return Some(self.assignable(ls, rs));
        }

        if self.pool.is_immutability_specified(l) {
            if !self.is_immutable(r) {
                return Some(Relation::Incompatible);
            }
            let ls = self.pool.strip_immutable(l);
            let rs = self.pool.strip_immutable(r);
            return Some(self.assignable(ls, rs));
        }
        if self.pool.is_immutability_specified(r) {
            let rs = self.pool.strip_immutable(r);
            return Some(self.assignable(l, rs));
        }

        if self.pool.is_service_specified(l) {
            if !self.is_service(r) {
                return Some(Relation::Incompatible);
            }
            let ls = self.pool.strip_service(l);
            let rs = self.pool.strip_service(r);
            return Some(self.assignable(ls, rs));
        }
        if self.pool.is_service_specified(r) {
            let rs = self.pool.strip_service(r);
            return Some(self.assignable(l, rs));
        }
        None
    }

    /// Annotations and relational types.
    fn relate_composites(&mut self, l: Idx, r: Idx) -> Option<Relation> {
        let ld = self.pool.data(l).clone();
        let rd = self.pool.data(r).clone();
        if let TypeData::Annotated { annotation, inner } = rd {
            let base = self.assignable(l, inner);
            if base.is_fit() {
                return Some(base);
            }
            return Some(base.best(self.assignable(l, annotation)));
        }
        if let TypeData::Annotated { annotation, inner } = ld {
            let base = self.assignable(inner, r);
            if base == Relation::Incompatible {
                return Some(base);
            }
            return Some(base.worst(self.assignable(annotation, r)));
        }
        if let TypeData::Union(a, b) = rd {
            return Some(self.assignable(l, a).worst(self.assignable(l, b)));
        }
        if let TypeData::Intersection(a, b) = ld {
            return Some(self.assignable(a, r).worst(self.assignable(b, r)));
        }
        if let TypeData::Union(a, b) = ld {
            return Some(self.assignable(a, r).best(self.assignable(b, r)));
        }
        if let TypeData::Intersection(a, b) = rd {
            return Some(self.assignable(l, a).best(self.assignable(l, b)));
        }
        None
    }

    /// Auto-narrowing, formals and property types.
    fn relate_deferred(&mut self, l: Idx, r: Idx) -> Option<Relation> {
        if self.pool.is_auto_narrowing(l) || self.pool.is_auto_narrowing(r) {
            let ln = self.resolve_auto_narrowing(l, None);
            let rn = self.resolve_auto_narrowing(r, None);
            if ln != l || rn != r {
                return Some(self.assignable(ln, rn));
            }
        }

        if self.pool.is_formal(r) {
            let bound = self.constraint(r);
            if bound == l {
                return Some(Relation::IsA);
            }
            if bound == r {
                return Some(Relation::Unknown);
            }
            if self.pool.is_formal(bound) || !self.pool.is_formal(l) {
                return Some(self.assignable(l, bound));
            }
            return Some(Relation::Unknown);
        }
        if self.pool.is_formal(l) {
            return Some(Relation::Unknown);
        }

        if let TypeData::PropertyClass { parent, property } = *self.pool.data(r) {
            return Some(match self.property_type(parent, property) {
                Some(ty) => self.assignable(l, ty),
                None => Relation::Unknown,
            });
        }
        if let TypeData::PropertyClass { parent, property } = *self.pool.data(l) {
            return Some(match self.property_type(parent, property) {
                Some(ty) => self.assignable(ty, r),
                None => Relation::Unknown,
            });
        }
        None
    }
}
