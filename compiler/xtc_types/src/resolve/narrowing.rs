//! Auto-narrowing of `ThisClass`.
//!
//! `ThisClass(C)` stands for "the class of whatever `this` is". Without a
//! target it becomes `C`'s declaration type; with a target that is-a that
//! declaration type it becomes the target, minus its top-level access and
//! immutability.

use xtc_ir::ClassId;

use crate::traverse::TypeFolder;
use crate::{Idx, Pool, TypeData, TypeEngine, TypeFlags};

struct Narrower<'e, 'a> {
    engine: &'e mut TypeEngine<'a>,
    target: Option<Idx>,
}

impl TypeFolder for Narrower<'_, '_> {
    fn pool(&mut self) -> &mut Pool {
        self.engine.pool
    }

    fn fold(&mut self, idx: Idx) -> Idx {
        if !self
            .engine
            .pool
            .flags(idx)
            .contains(TypeFlags::HAS_AUTO_NARROWING)
        {
            return idx;
        }
        match *self.engine.pool.data(idx) {
            TypeData::ThisClass(class) => {
                let declared = self.engine.declaration_type(class);
                let target = self.target;
                match target {
                    Some(target) if self.qualifies(target, class, declared) => {
                        self.engine.pool.strip_access_and_immutable(target)
                    }
                    _ => declared,
                }
            }
            _ => self.super_fold(idx),
        }
    }
}

impl Narrower<'_, '_> {
    /// Whether `target` is-a the declaration type with its formals at their
    /// constraints.
    fn qualifies(&mut self, target: Idx, class: ClassId, declared: Idx) -> bool {
        let raw = self.engine.pool.class_type(class);
        let bounds = self.engine.param_resolver(raw);
        let bound = self.engine.resolve_generics(declared, &bounds);
        self.engine.is_a(target, bound)
    }
}

impl TypeEngine<'_> {
    /// Replace every `ThisClass` reachable from `idx`, narrowing to
    /// `target` where it qualifies.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn resolve_auto_narrowing(&mut self, idx: Idx, target: Option<Idx>) -> Idx {
        if idx.is_sentinel() || !self.pool.flags(idx).has_auto_narrowing() {
            return idx;
        }
        let target = target.filter(|t| !t.is_sentinel());
        let mut narrower = Narrower {
            engine: self,
            target,
        };
        narrower.fold(idx)
    }
}
