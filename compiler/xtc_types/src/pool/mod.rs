//! Type pool: the interning arena for type nodes.
//!
//! Every node of a compilation unit lives here, and structurally equal
//! nodes share one `Idx`: `TypeData` is the interning key, and because its
//! children are already-interned indices, the hash and equality checks are
//! shallow.
//!
//! # Layout
//!
//! - `items` / `flags`: parallel arrays indexed by `Idx`
//! - `map`: structural key to index
//! - `cells`: forward-reference cells, see [`placeholder`]
//! - `memo`: derived data (expansions, constraints, relations, views) keyed to
//!   the invalidation `generation`
//!
//! `Object` is pre-interned at `Idx::OBJECT`.

mod construct;
mod format;
pub(crate) mod placeholder;
mod query;

use std::fmt;

use rustc_hash::FxHashMap;
use xtc_ir::ClassId;

use crate::error::RegisterError;
use crate::memo::Memo;
use crate::{Idx, PoolConfig, Tag, TypeData, TypeFlags};

pub use placeholder::Consumer;
use placeholder::PlaceholderCell;

/// Counters for observing how much work the pool's caches save.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Effective views synthesized (cache misses).
    pub type_info_builds: u64,
    /// Directional relation computations (cache misses).
    pub relation_computations: u64,
    /// Typedef expansions computed.
    pub typedef_expansions: u64,
    /// Constraint types computed.
    pub constraint_computations: u64,
    /// Times the memo tables were discarded for a new generation.
    pub cache_resets: u64,
}

/// Interning arena for type nodes.
pub struct Pool {
    items: Vec<TypeData>,
    flags: Vec<TypeFlags>,
    map: FxHashMap<TypeData, Idx>,
    cells: Vec<PlaceholderCell>,
    generation: u64,
    config: PoolConfig,
    memo: Memo,
    stats: PoolStats,
}

impl Pool {
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    pub fn with_config(config: PoolConfig) -> Self {
        let mut pool = Pool {
            items: Vec::with_capacity(256),
            flags: Vec::with_capacity(256),
            map: FxHashMap::default(),
            cells: Vec::new(),
            generation: 0,
            config,
            memo: Memo::default(),
            stats: PoolStats::default(),
        };
        let object = pool.intern(TypeData::Class(ClassId::OBJECT));
        debug_assert_eq!(object, Idx::OBJECT);
        pool
    }

    /// Number of interned nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        // Object is always present.
        false
    }

    #[inline]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Current invalidation generation.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Discard every derived result. Call after editing the namespace.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        tracing::debug!(generation = self.generation, "type pool invalidated");
    }

    #[inline]
    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    #[inline]
    pub(crate) fn stats_mut(&mut self) -> &mut PoolStats {
        &mut self.stats
    }

    /// Memo tables for the current generation.
    pub(crate) fn memo(&mut self) -> &mut Memo {
        if self.memo.sync(self.generation) {
            self.stats.cache_resets += 1;
        }
        &mut self.memo
    }

    /// Node payload.
    ///
    /// # Panics
    /// Panics on a sentinel or an index from another pool.
    #[inline]
    pub fn data(&self, idx: Idx) -> &TypeData {
        assert!(!idx.is_sentinel(), "{idx:?} has no node");
        &self.items[idx.index()]
    }

    #[inline]
    pub fn tag(&self, idx: Idx) -> Tag {
        self.data(idx).tag()
    }

    #[inline]
    pub fn flags(&self, idx: Idx) -> TypeFlags {
        if idx.is_sentinel() {
            return TypeFlags::empty();
        }
        self.flags[idx.index()]
    }

    /// Whether `idx` names a node of this pool.
    #[inline]
    pub fn contains(&self, idx: Idx) -> bool {
        !idx.is_sentinel() && idx.index() < self.items.len()
    }

    /// Look up or insert a node.
    ///
    /// # Panics
    /// Panics on construction contract violations: a sentinel or foreign
    /// child, an access modifier over an access-qualified type, or a
    /// parameterized type over a modified base.
    pub fn intern(&mut self, data: TypeData) -> Idx {
        if let Err(err) = self.check(&data) {
            panic!("invalid type node {data:?}: {err}");
        }
        self.intern_checked(data)
    }

    /// Re-intern a node built outside the pool, returning the canonical
    /// instance when one exists.
    pub fn register(&mut self, data: TypeData) -> Result<Idx, RegisterError> {
        self.check(&data)?;
        Ok(self.intern_checked(data))
    }

    /// Look up a node without inserting it.
    pub fn find(&self, data: &TypeData) -> Option<Idx> {
        self.map.get(data).copied()
    }

    fn check(&self, data: &TypeData) -> Result<(), RegisterError> {
        let tag = data.tag();
        for child in data.children() {
            if child.is_sentinel() {
                return Err(RegisterError::SentinelChild { tag });
            }
            if !self.contains(child) {
                return Err(RegisterError::UnknownChild { tag, child });
            }
        }
        match data {
            TypeData::Unresolved(cell) if cell.index() >= self.cells.len() => {
                Err(RegisterError::UnknownCell { cell: cell.raw() })
            }
            TypeData::Access { inner, .. } if self.is_access_specified(*inner) => {
                Err(RegisterError::DoubleAccess)
            }
            TypeData::Parameterized { base, .. } => {
                let base = self.tag(*base);
                if base.is_modifier() || base.is_relational() {
                    Err(RegisterError::ModifiedBase { base })
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }

    /// Collapse wrappers that add nothing.
    fn normalize(&self, data: &TypeData) -> Option<Idx> {
        match data {
            TypeData::Immutable(inner) if self.tag(*inner) == Tag::Immutable => Some(*inner),
            TypeData::Service(inner) if self.tag(*inner) == Tag::Service => Some(*inner),
            TypeData::Union(a, b) | TypeData::Intersection(a, b) if a == b => Some(*a),
            _ => None,
        }
    }

    fn intern_checked(&mut self, data: TypeData) -> Idx {
        if let Some(idx) = self.normalize(&data) {
            return idx;
        }
        if let Some(&idx) = self.map.get(&data) {
            return idx;
        }

        let raw = u32::try_from(self.items.len())
            .ok()
            .filter(|raw| !Idx::from_raw(*raw).is_sentinel())
            .unwrap_or_else(|| panic!("type pool exceeded capacity"));
        let idx = Idx::from_raw(raw);
        let flags = self.compute_flags(&data);
        self.items.push(data.clone());
        self.flags.push(flags);
        self.map.insert(data, idx);
        idx
    }

    fn compute_flags(&self, data: &TypeData) -> TypeFlags {
        let own = match data.tag() {
            Tag::Class => TypeFlags::IS_TERMINAL,
            Tag::Typedef => TypeFlags::IS_TERMINAL | TypeFlags::HAS_TYPEDEF,
            Tag::ThisClass => TypeFlags::IS_TERMINAL | TypeFlags::HAS_AUTO_NARROWING,
            Tag::Generic => TypeFlags::IS_FORMAL | TypeFlags::HAS_FORMAL | TypeFlags::HAS_GENERIC,
            Tag::TypeParam => {
                TypeFlags::IS_FORMAL | TypeFlags::HAS_FORMAL | TypeFlags::HAS_TYPE_PARAM
            }
            Tag::FormalChild => TypeFlags::IS_FORMAL | TypeFlags::HAS_FORMAL,
            Tag::DynamicFormal => {
                TypeFlags::IS_FORMAL | TypeFlags::HAS_FORMAL | TypeFlags::HAS_DYNAMIC
            }
            Tag::Access => TypeFlags::IS_MODIFIER | TypeFlags::HAS_ACCESS,
            Tag::Immutable | Tag::Service | Tag::Parameterized | Tag::Annotated => {
                TypeFlags::IS_MODIFIER
            }
            Tag::Union | Tag::Intersection | Tag::Difference => TypeFlags::IS_RELATIONAL,
            Tag::VirtualChild | Tag::InnerChild | Tag::AnonymousClass | Tag::PropertyClass => {
                TypeFlags::IS_PARENT_DEPENDENT | TypeFlags::HAS_PARENT_DEPENDENT
            }
            Tag::Unresolved => TypeFlags::IS_DEFERRED | TypeFlags::HAS_UNRESOLVED,
            Tag::Recursive => TypeFlags::IS_DEFERRED | TypeFlags::HAS_RECURSIVE,
        };
        data.children()
            .iter()
            .fold(own, |acc, child| acc | self.flags(*child).propagated())
    }

    /// All indices in insertion order.
    #[allow(clippy::cast_possible_truncation)]
    pub fn indices(&self) -> impl Iterator<Item = Idx> {
        (0..self.items.len()).map(|i| Idx::from_raw(i as u32))
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("len", &self.items.len())
            .field("cells", &self.cells.len())
            .field("generation", &self.generation)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
