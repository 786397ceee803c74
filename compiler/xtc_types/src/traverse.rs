//! Structural folding over interned nodes.
//!
//! A folder rewrites a node by rewriting its children and re-interning the
//! parent. Nodes whose children all come back unchanged are returned as-is,
//! so a pass that touches nothing returns the same `Idx` and allocates
//! nothing.

use smallvec::SmallVec;

use crate::{Idx, Pool};

/// Rewrite nodes bottom-up.
///
/// Override [`fold`](Self::fold) to intercept particular variants and call
/// [`super_fold`](Self::super_fold) for the default child-wise rewrite.
///
/// ```text
/// impl TypeFolder for Expander<'_> {
///     fn pool(&mut self) -> &mut Pool { self.pool }
///     fn fold(&mut self, idx: Idx) -> Idx {
///         match self.pool.data(idx) {
///             TypeData::Typedef(id) => self.expand(*id),
///             _ => self.super_fold(idx),
///         }
///     }
/// }
/// ```
pub trait TypeFolder {
    fn pool(&mut self) -> &mut Pool;

    fn fold(&mut self, idx: Idx) -> Idx {
        self.super_fold(idx)
    }

    /// Fold every child and rebuild the node if any of them changed.
    fn super_fold(&mut self, idx: Idx) -> Idx {
        let data = self.pool().data(idx).clone();
        let children = data.children();
        if children.is_empty() {
            return idx;
        }
        let folded: SmallVec<[Idx; 4]> = children
            .iter()
            .map(|child| xtc_stack::ensure_sufficient_stack(|| self.fold(*child)))
            .collect();
        self.pool().rebuild(idx, &data, &folded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TypeData, TypeFlags};
    use xtc_ir::ClassId;

    /// Replaces one class with another.
    struct Swap<'p> {
        pool: &'p mut Pool,
        from: Idx,
        to: Idx,
    }

    impl TypeFolder for Swap<'_> {
        fn pool(&mut self) -> &mut Pool {
            self.pool
        }

        fn fold(&mut self, idx: Idx) -> Idx {
            if idx == self.from {
                self.to
            } else {
                self.super_fold(idx)
            }
        }
    }

    #[test]
    fn unchanged_fold_returns_same_index() {
        let mut pool = Pool::new();
        let a = pool.class_type(ClassId::from_raw(1));
        let b = pool.class_type(ClassId::from_raw(2));
        let list = pool.parameterized(a, &[b]);
        let before = pool.len();

        let c = pool.class_type(ClassId::from_raw(3));
        let d = pool.class_type(ClassId::from_raw(4));
        let mut swap = Swap {
            pool: &mut pool,
            from: c,
            to: d,
        };
        assert_eq!(swap.fold(list), list);
        assert_eq!(pool.len(), before + 2);
    }

    #[test]
    fn changed_child_rebuilds_parent() {
        let mut pool = Pool::new();
        let a = pool.class_type(ClassId::from_raw(1));
        let b = pool.class_type(ClassId::from_raw(2));
        let c = pool.class_type(ClassId::from_raw(3));
        let imm = pool.immutable(b);
        let ty = pool.parameterized(a, &[imm]);

        let mut swap = Swap {
            pool: &mut pool,
            from: b,
            to: c,
        };
        let out = swap.fold(ty);
        let imm_c = pool.immutable(c);
        assert_eq!(out, pool.parameterized(a, &[imm_c]));
        assert!(matches!(pool.data(out), TypeData::Parameterized { .. }));
        assert!(pool.flags(out).contains(TypeFlags::IS_MODIFIER));
    }
}
