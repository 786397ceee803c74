//! Forward resolution: rebuild a node with its bound placeholders replaced
//! by their targets.
//!
//! Unbound placeholders stay. A placeholder reached again while its own
//! target is being rebuilt (a recursive forward reference) stays as the
//! placeholder, which now derefs to the rebuilt target.

use crate::traverse::TypeFolder;
use crate::{Idx, Pool, TypeData, TypeEngine};

struct ForwardResolver<'p> {
    pool: &'p mut Pool,
    cells: Vec<Idx>,
}

impl TypeFolder for ForwardResolver<'_> {
    fn pool(&mut self) -> &mut Pool {
        self.pool
    }

    fn fold(&mut self, idx: Idx) -> Idx {
        if !self.pool.flags(idx).has_unresolved() {
            return idx;
        }
        match *self.pool.data(idx) {
            TypeData::Unresolved(_) => match self.pool.placeholder_target(idx) {
                Some(target) if !self.cells.contains(&idx) => {
                    self.cells.push(idx);
                    let out = xtc_stack::ensure_sufficient_stack(|| self.fold(target));
                    self.cells.pop();
                    out
                }
                _ => idx,
            },
            _ => self.super_fold(idx),
        }
    }
}

impl TypeEngine<'_> {
    /// Replace bound placeholders reachable from `idx` with their
    /// (forward-resolved) targets.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn resolve_forward(&mut self, idx: Idx) -> Idx {
        if idx.is_sentinel() || !self.pool.flags(idx).has_unresolved() {
            return idx;
        }
        if let Some(&done) = self.pool.memo().forward.get(&idx) {
            return done;
        }
        let mut resolver = ForwardResolver {
            pool: self.pool,
            cells: Vec::new(),
        };
        let out = resolver.fold(idx);
        self.pool.memo().forward.insert(idx, out);
        out
    }
}
