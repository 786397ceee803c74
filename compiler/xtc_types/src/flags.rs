//! Pre-computed type metadata flags.
//!
//! `TypeFlags` are computed once when a node is interned, so passes can skip
//! whole subtrees without traversal ("no typedef inside, nothing to expand").
//!
//! Flags are organized into categories:
//! - **Presence flags**: what the node or any descendant contains. Propagated.
//! - **Category flags**: what kind of node this is. Not propagated.

use bitflags::bitflags;

bitflags! {
    /// Pre-computed node properties for O(1) queries.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct TypeFlags: u32 {
        // === Presence Flags (bits 0-15) ===

        /// Contains a forward-reference cell (bound or not).
        const HAS_UNRESOLVED = 1 << 0;
        /// Contains any formal placeholder.
        const HAS_FORMAL = 1 << 1;
        /// Contains a class type parameter.
        const HAS_GENERIC = 1 << 2;
        /// Contains a method type parameter.
        const HAS_TYPE_PARAM = 1 << 3;
        /// Contains a register-bound formal.
        const HAS_DYNAMIC = 1 << 4;
        /// Contains a typedef reference.
        const HAS_TYPEDEF = 1 << 5;
        /// Contains a typedef cycle-breaker.
        const HAS_RECURSIVE = 1 << 6;
        /// Contains an auto-narrowing reference.
        const HAS_AUTO_NARROWING = 1 << 7;
        /// Contains a parent-dependent node.
        const HAS_PARENT_DEPENDENT = 1 << 8;
        /// Contains an access modifier.
        const HAS_ACCESS = 1 << 9;

        // === Category Flags (bits 16-23) ===

        const IS_TERMINAL = 1 << 16;
        const IS_FORMAL = 1 << 17;
        const IS_MODIFIER = 1 << 18;
        const IS_RELATIONAL = 1 << 19;
        const IS_PARENT_DEPENDENT = 1 << 20;
        const IS_DEFERRED = 1 << 21;
    }
}

impl TypeFlags {
    /// Flags that flow from children to parents.
    pub const PROPAGATE_MASK: Self = Self::HAS_UNRESOLVED
        .union(Self::HAS_FORMAL)
        .union(Self::HAS_GENERIC)
        .union(Self::HAS_TYPE_PARAM)
        .union(Self::HAS_DYNAMIC)
        .union(Self::HAS_TYPEDEF)
        .union(Self::HAS_RECURSIVE)
        .union(Self::HAS_AUTO_NARROWING)
        .union(Self::HAS_PARENT_DEPENDENT)
        .union(Self::HAS_ACCESS);

    /// Anything a resolution pass may need to rewrite.
    pub const NEEDS_RESOLUTION: Self = Self::HAS_UNRESOLVED
        .union(Self::HAS_FORMAL)
        .union(Self::HAS_TYPEDEF)
        .union(Self::HAS_AUTO_NARROWING);

    #[inline]
    pub fn propagated(self) -> Self {
        self & Self::PROPAGATE_MASK
    }

    #[inline]
    pub fn has_formal(self) -> bool {
        self.contains(Self::HAS_FORMAL)
    }

    #[inline]
    pub fn has_typedef(self) -> bool {
        self.contains(Self::HAS_TYPEDEF)
    }

    #[inline]
    pub fn has_unresolved(self) -> bool {
        self.contains(Self::HAS_UNRESOLVED)
    }

    #[inline]
    pub fn has_auto_narrowing(self) -> bool {
        self.contains(Self::HAS_AUTO_NARROWING)
    }

    #[inline]
    pub fn has_recursive(self) -> bool {
        self.contains(Self::HAS_RECURSIVE)
    }
}
