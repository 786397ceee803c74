//! Forward-reference cells.
//!
//! An `Unresolved` node points at a cell rather than at a type. The cell is
//! bound exactly once; every holder of the node sees the target through
//! [`Pool::deref`] on its next access, and consumers registered before the
//! binding are invoked with the target.
//!
//! State machine: `Unbound -> (resolve) -> Bound`. `Bound` is terminal.

use rustc_hash::FxHashSet;
use xtc_ir::{CellId, Name};

use super::Pool;
use crate::{Idx, TypeData};

/// Callback run when a placeholder is bound.
pub type Consumer = Box<dyn FnOnce(Idx) + Send>;

pub(crate) struct PlaceholderCell {
    pub(crate) name: Name,
    pub(crate) target: Option<Idx>,
    consumers: Vec<Consumer>,
}

impl Pool {
    /// Allocate a fresh, unbound placeholder for `name`.
    ///
    /// Two placeholders for the same name are distinct nodes.
    #[allow(clippy::cast_possible_truncation)]
    pub fn unresolved(&mut self, name: Name) -> Idx {
        let cell = CellId::from_raw(self.cells.len() as u32);
        self.cells.push(PlaceholderCell {
            name,
            target: None,
            consumers: Vec::new(),
        });
        self.intern(TypeData::Unresolved(cell))
    }

    /// The cell behind a placeholder node.
    #[inline]
    pub fn cell_of(&self, idx: Idx) -> Option<CellId> {
        if idx.is_sentinel() {
            return None;
        }
        match self.data(idx) {
            TypeData::Unresolved(cell) => Some(*cell),
            _ => None,
        }
    }

    pub fn placeholder_name(&self, idx: Idx) -> Option<Name> {
        self.cell_of(idx).map(|cell| self.cells[cell.index()].name)
    }

    /// Direct target of a placeholder, if bound.
    pub fn placeholder_target(&self, idx: Idx) -> Option<Idx> {
        self.cell_of(idx)
            .and_then(|cell| self.cells[cell.index()].target)
    }

    /// Whether `idx` is a placeholder that has not been bound.
    #[inline]
    pub fn is_unbound(&self, idx: Idx) -> bool {
        self.cell_of(idx)
            .is_some_and(|cell| self.cells[cell.index()].target.is_none())
    }

    /// Follow bound placeholders to the node they stand for.
    pub fn deref(&self, mut idx: Idx) -> Idx {
        while let Some(target) = self.placeholder_target(idx) {
            idx = target;
        }
        idx
    }

    /// Register `consumer` to run when `placeholder` is bound. Runs
    /// immediately if it already is.
    ///
    /// # Panics
    /// Panics if `placeholder` is not an `Unresolved` node.
    pub fn on_resolve(&mut self, placeholder: Idx, consumer: impl FnOnce(Idx) + Send + 'static) {
        let Some(cell) = self.cell_of(placeholder) else {
            panic!("{placeholder:?} is not a placeholder");
        };
        let cell = &mut self.cells[cell.index()];
        match cell.target {
            Some(target) => consumer(target),
            None => cell.consumers.push(Box::new(consumer)),
        }
    }

    /// Bind `placeholder` to `target` and run its consumers.
    ///
    /// Binding again to an equal target is a no-op.
    ///
    /// # Panics
    /// Panics if `placeholder` is not a placeholder, if `target` is a
    /// sentinel or would make the placeholder refer to itself, or if the
    /// placeholder is already bound to a different target.
    pub fn resolve_placeholder(&mut self, placeholder: Idx, target: Idx) {
        assert!(!target.is_sentinel(), "cannot bind a placeholder to {target:?}");
        assert!(self.contains(target), "{target:?} is not in this pool");
        let Some(cell) = self.cell_of(placeholder) else {
            panic!("{placeholder:?} is not a placeholder");
        };
        let resolved = self.deref(target);
        assert!(
            resolved != placeholder,
            "binding {placeholder:?} to {target:?} would make it refer to itself"
        );

        if let Some(existing) = self.cells[cell.index()].target {
            assert!(
                existing == target || self.deref(existing) == resolved,
                "placeholder {placeholder:?} is already bound to {existing:?}, cannot rebind to {target:?}"
            );
            return;
        }

        let slot = &mut self.cells[cell.index()];
        slot.target = Some(target);
        let consumers = std::mem::take(&mut slot.consumers);
        self.generation += 1;
        tracing::debug!(
            ?placeholder,
            ?target,
            consumers = consumers.len(),
            generation = self.generation,
            "placeholder bound"
        );
        for consumer in consumers {
            consumer(target);
        }
    }

    /// Readiness: whether any placeholder reachable from `idx` is unbound.
    ///
    /// Monotonic: once false it stays false, since cells only ever become
    /// bound.
    pub fn contains_unresolved(&self, idx: Idx) -> bool {
        if !self.flags(idx).has_unresolved() {
            return false;
        }
        let mut seen = FxHashSet::default();
        let mut stack = vec![idx];
        while let Some(next) = stack.pop() {
            if !seen.insert(next) || !self.flags(next).has_unresolved() {
                continue;
            }
            match self.data(next) {
                TypeData::Unresolved(cell) => match self.cells[cell.index()].target {
                    None => return true,
                    Some(target) => stack.push(target),
                },
                data => stack.extend(data.children()),
            }
        }
        false
    }

    /// Number of placeholders not yet bound.
    pub fn pending_placeholders(&self) -> usize {
        self.cells.iter().filter(|c| c.target.is_none()).count()
    }
}
