//! Pool and engine configuration.

/// Tunables for a [`Pool`](crate::Pool) and every engine run over it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maximum nesting of relation and synthesis queries before a query
    /// gives up with a resolution error.
    pub max_depth: u32,
    /// Allow interface assignability by structural (duck-typed) match.
    pub duck_typing: bool,
    /// Memoize relation results per generation.
    pub cache_relations: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            max_depth: 512,
            duck_typing: true,
            cache_relations: true,
        }
    }
}

impl PoolConfig {
    /// Recompute relations on every query.
    pub fn uncached() -> Self {
        PoolConfig {
            cache_relations: false,
            ..Self::default()
        }
    }
}
