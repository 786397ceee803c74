//! Class-level comparison: parent-dependent names, parameter variance and
//! contribution chains.

use xtc_ir::{ClassId, Variance};

use super::Relation;
use crate::{Idx, Tag, TypeData, TypeEngine};

impl TypeEngine<'_> {
    pub(super) fn relate_classes(&mut self, l: Idx, r: Idx) -> Relation {
        let l_difference = self.pool.tag(l) == Tag::Difference;
        if l_difference || self.pool.tag(r) == Tag::Difference {
            return self.relate_difference(l, r, l_difference);
        }

        let l_head = self.pool.head(l);
        let r_head = self.pool.head(r);
        if let (
            TypeData::VirtualChild {
                parent: l_parent,
                name: l_name,
            },
            TypeData::VirtualChild {
                parent: r_parent,
                name: r_name,
            },
        ) = (self.pool.data(l_head).clone(), self.pool.data(r_head).clone())
        {
            if l_name == r_name
                && self.pool.params_of(l) == self.pool.params_of(r)
                && self.assignable(l_parent, r_parent).is_fit()
            {
                return Relation::IsA;
            }
        }

        let (Some(l_class), Some(r_class)) = (self.class_of(l), self.class_of(r)) else {
            return Relation::Incompatible;
        };
        if l_class == r_class {
            return self.compare_parameterizations(l, r, l_class);
        }

        let result = self.relate_through_contributions(l, r, r_class);
        if result == Relation::Incompatible
            && self.pool.config().duck_typing
            && self.class_decl(l_class).format.is_interface()
        {
            return self.duck_type(l, r);
        }
        result
    }

    /// Same defining class: compare each declared parameter by its
    /// variance; a missing actual stands for the declared constraint.
    fn compare_parameterizations(&mut self, l: Idx, r: Idx, class: ClassId) -> Relation {
        let decl = self.class_decl(class);
        let l_params = self.pool.params_of(l).to_vec();
        let r_params = self.pool.params_of(r).to_vec();
        let mut result = Relation::IsA;
        for (position, tp) in decl.type_params.iter().enumerate() {
            let la = l_params.get(position).copied().unwrap_or(tp.constraint);
            let ra = r_params.get(position).copied().unwrap_or(tp.constraint);
            if la == ra {
                continue;
            }
            let relation = match tp.variance {
                Variance::Covariant => self.assignable(la, ra),
                Variance::Contravariant => self.assignable(ra, la),
                Variance::Invariant => {
                    let forward = self.assignable(la, ra);
                    if forward == Relation::Incompatible {
                        forward
                    } else {
                        forward.worst(self.assignable(ra, la))
                    }
                }
            };
            result = result.worst(relation);
            if result == Relation::Incompatible {
                return result;
            }
        }

        let l_parent = self.pool.parent_of(self.pool.head(l));
        let r_parent = self.pool.parent_of(self.pool.head(r));
        if let (Some(lp), Some(rp)) = (l_parent, r_parent) {
            if self.pool.is_parent_dependent(self.pool.head(l))
                && self.pool.is_parent_dependent(self.pool.head(r))
            {
                result = result.worst(self.assignable(lp, rp));
            }
        }
        result
    }

    /// A difference is never a class: it relates only structurally, and
    /// only to interfaces when it is the offered side.
    fn relate_difference(&mut self, l: Idx, r: Idx, l_difference: bool) -> Relation {
        if !self.pool.config().duck_typing {
            return Relation::Incompatible;
        }
        if !l_difference {
            let Some(l_class) = self.class_of(l) else {
                return Relation::Incompatible;
            };
            if !self.class_decl(l_class).format.is_interface() {
                return Relation::Incompatible;
            }
        }
        self.duck_type(l, r)
    }

    /// Different classes: the best answer over the right side's
    /// contributions, each resolved against the right side's parameters.
    /// A class reached again through its own contributions adds nothing.
    fn relate_through_contributions(&mut self, l: Idx, r: Idx, r_class: ClassId) -> Relation {
        if !self.walking.insert((l, r_class)) {
            tracing::trace!(?l, ?r_class, "contribution chain revisits its class");
            return Relation::Incompatible;
        }
        let resolver = self.param_resolver(r);
        let decl = self.class_decl(r_class);
        let mut result = Relation::Incompatible;
        for contribution in decl.layered_contributions() {
            let expanded = self.resolve_typedefs(contribution.ty);
            let ty = self.resolve_generics(expanded, &resolver);
            result = result.best(self.assignable(l, ty));
            if result.is_fit() {
                result = Relation::IsA;
                break;
            }
        }
        self.walking.remove(&(l, r_class));
        result
    }
}
