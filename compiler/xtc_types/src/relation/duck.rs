//! Structural interface matching.

use super::Relation;
use crate::{Idx, TypeEngine};

impl TypeEngine<'_> {
    /// Whether the public view of `r` covers every member the interface `l`
    /// declares: a substitutable method for each method and an assignable
    /// property for each property.
    ///
    /// When either view is still being built further up the stack, the
    /// match is assumed, like a re-entered relation.
    pub(super) fn duck_type(&mut self, l: Idx, r: Idx) -> Relation {
        let partial_views = self.partial_views;
        let required = self.type_info(l);
        let offered = self.type_info(r);
        if self.partial_views != partial_views {
            tracing::trace!(?l, ?r, "duck typing against a view under construction");
            return Relation::IsA;
        }
        if !required.is_complete() || !offered.is_complete() {
            self.partial_views += 1;
            return Relation::Unknown;
        }

        for method in required.methods.values().filter(|m| !m.is_static) {
            let wanted = &method.signature;
            let found = offered
                .methods_named(wanted.name)
                .filter(|m| !m.is_static && m.signature.arity() == wanted.arity())
                .map(|m| m.signature.clone())
                .collect::<Vec<_>>()
                .into_iter()
                .any(|candidate| self.substitutable(&candidate, wanted));
            if !found {
                tracing::trace!(?l, ?r, "duck typing: missing method");
                return Relation::Incompatible;
            }
        }

        for property in required.properties.values().filter(|p| !p.is_static) {
            let Some(have) = offered.property(property.name) else {
                return Relation::Incompatible;
            };
            if have.is_static || !self.assignable(property.ty, have.ty).is_fit() {
                return Relation::Incompatible;
            }
        }
        Relation::IsA
    }
}
