//! Generation-keyed side tables for derived data.
//!
//! Nodes are immutable; everything computed from them (typedef expansions,
//! constraint types, relations, effective views) lives here instead. The
//! whole table set is discarded when the pool's generation moves on.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::info::TypeInfo;
use crate::{Idx, Relation};

#[derive(Default)]
pub(crate) struct Memo {
    generation: u64,
    /// Typedef expansion of a node.
    pub(crate) typedefs: FxHashMap<Idx, Idx>,
    /// Forward-resolved form of a node.
    pub(crate) forward: FxHashMap<Idx, Idx>,
    /// Constraint of a formal. `Idx::PENDING` marks a computation in flight.
    pub(crate) constraints: FxHashMap<Idx, Idx>,
    /// Directional relation keyed by `(left, right)`.
    pub(crate) relations: FxHashMap<(Idx, Idx), Relation>,
    /// Complete effective views.
    pub(crate) infos: FxHashMap<Idx, Arc<TypeInfo>>,
}

impl Memo {
    /// Align with `generation`, clearing stale tables. Returns whether a
    /// clear happened.
    pub(crate) fn sync(&mut self, generation: u64) -> bool {
        if self.generation == generation {
            return false;
        }
        tracing::debug!(
            from = self.generation,
            to = generation,
            infos = self.infos.len(),
            relations = self.relations.len(),
            "discarding type memo tables"
        );
        self.generation = generation;
        self.typedefs.clear();
        self.forward.clear();
        self.constraints.clear();
        self.relations.clear();
        self.infos.clear();
        true
    }
}
