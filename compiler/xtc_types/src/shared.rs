//! A resolved pool shared between threads.
//!
//! Construction and resolution need `&mut Pool`. Once every forward
//! reference is bound, [`Pool::freeze`] moves the pool behind a mutex so
//! relation, synthesis and formatting queries can come from any thread.
//! Queries still fill the memo tables, so they serialize on the lock;
//! repeated queries are cheap cache hits.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{FreezeError, Idx, Namespace, Pool, PoolStats, Relation, TypeEngine, TypeInfo};

/// A frozen pool and the namespace it was built against.
#[derive(Clone)]
pub struct SharedPool {
    pool: Arc<Mutex<Pool>>,
    ns: Arc<dyn Namespace + Send + Sync>,
}

impl Pool {
    /// Freeze the pool for shared, read-mostly use.
    ///
    /// Fails while any placeholder is still unbound: a frozen pool answers
    /// queries, it does not wait for declarations.
    pub fn freeze(self, ns: Arc<dyn Namespace + Send + Sync>) -> Result<SharedPool, FreezeError> {
        let pending = self.pending_placeholders();
        if pending > 0 {
            return Err(FreezeError::PendingPlaceholders { pending });
        }
        tracing::debug!(nodes = self.len(), generation = self.generation(), "type pool frozen");
        Ok(SharedPool {
            pool: Arc::new(Mutex::new(self)),
            ns,
        })
    }
}

impl SharedPool {
    /// Run `f` with exclusive use of an engine over the pool. Diagnostics
    /// left on the engine are discarded when `f` returns.
    pub fn with<R>(&self, f: impl FnOnce(&mut TypeEngine<'_>) -> R) -> R {
        let mut pool = self.pool.lock();
        let mut engine = TypeEngine::new(&mut pool, &*self.ns);
        f(&mut engine)
    }

    pub fn relation(&self, left: Idx, right: Idx) -> Relation {
        self.with(|engine| engine.relation(left, right))
    }

    pub fn is_a(&self, sub: Idx, sup: Idx) -> bool {
        self.with(|engine| engine.is_a(sub, sup))
    }

    pub fn type_info(&self, idx: Idx) -> Arc<TypeInfo> {
        self.with(|engine| engine.type_info(idx))
    }

    pub fn format_type(&self, idx: Idx) -> String {
        self.pool.lock().format_type(idx, &*self.ns)
    }

    pub fn stats(&self) -> PoolStats {
        self.pool.lock().stats()
    }

    pub fn len(&self) -> usize {
        self.pool.lock().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn namespace(&self) -> &(dyn Namespace + Send + Sync) {
        &*self.ns
    }
}

impl fmt::Debug for SharedPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedPool")
            .field("pool", &*self.pool.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContributionKind, Registry};
    use xtc_ir::ClassFormat;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn shared_pool_is_send_and_sync() {
        assert_send_sync::<SharedPool>();
    }

    #[test]
    fn freezing_requires_bound_placeholders() {
        let reg = Registry::new();
        let name = reg.intern("Later");
        let mut pool = Pool::new();
        pool.unresolved(name);
        pool.unresolved(name);
        let ns: Arc<dyn Namespace + Send + Sync> = Arc::new(Registry::new());
        assert_eq!(
            pool.freeze(Arc::clone(&ns)).err(),
            Some(FreezeError::PendingPlaceholders { pending: 2 })
        );

        let mut pool = Pool::new();
        let cell = pool.unresolved(name);
        pool.resolve_placeholder(cell, Idx::OBJECT);
        let shared = pool.freeze(ns).unwrap();
        assert_eq!(shared.len(), 2);
    }

    #[test]
    fn queries_share_one_memo() {
        let mut reg = Registry::new();
        let base = reg.declare_class("Base", ClassFormat::Class);
        let derived = reg.declare_class("Derived", ClassFormat::Class);
        let mut pool = Pool::new();
        let base_ty = pool.class_type(base);
        let derived_ty = pool.class_type(derived);
        reg.add_contribution(derived, ContributionKind::Extends, base_ty);

        let shared = pool.freeze(Arc::new(reg)).unwrap();
        let other = shared.clone();
        assert!(shared.is_a(derived_ty, base_ty));
        let computed = shared.stats().relation_computations;
        assert!(other.is_a(derived_ty, base_ty));
        assert_eq!(other.stats().relation_computations, computed);

        let info = shared.type_info(derived_ty);
        assert!(Arc::ptr_eq(&info, &other.type_info(derived_ty)));
        assert_eq!(other.format_type(derived_ty), "Derived");
        assert_eq!(shared.relation(base_ty, derived_ty), Relation::IsA);
    }
}
