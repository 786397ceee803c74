//! Type index handle.
//!
//! `Idx` is the only way to refer to a type node. Nodes live in a [`Pool`]
//! and structurally equal nodes share one index, so type equality is index
//! equality.
//!
//! [`Pool`]: crate::Pool

use std::fmt;

/// A 32-bit index into the type pool.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Idx(u32);

impl Idx {
    /// The universal top type `Object`, pre-interned at pool creation.
    pub const OBJECT: Self = Self(0);

    /// "Type not yet known" during one-shot inference. Never interned.
    pub const PENDING: Self = Self(u32::MAX - 1);

    /// Sentinel value indicating no type.
    pub const NONE: Self = Self(u32::MAX);

    /// Create an index from a raw u32 value.
    ///
    /// The caller must ensure the index is valid in the pool it is used with.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }

    #[inline]
    pub const fn is_pending(self) -> bool {
        self.0 == Self::PENDING.0
    }

    /// Either reserved sentinel.
    #[inline]
    pub const fn is_sentinel(self) -> bool {
        self.is_none() || self.is_pending()
    }

    #[inline]
    pub const fn is_object(self) -> bool {
        self.0 == Self::OBJECT.0
    }
}

impl fmt::Debug for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::OBJECT => write!(f, "Idx::OBJECT"),
            Self::PENDING => write!(f, "Idx::PENDING"),
            Self::NONE => write!(f, "Idx::NONE"),
            _ => write!(f, "Idx({})", self.0),
        }
    }
}

impl fmt::Display for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::OBJECT => write!(f, "Object"),
            Self::PENDING => write!(f, "<pending>"),
            Self::NONE => write!(f, "<none>"),
            _ => write!(f, "type#{}", self.0),
        }
    }
}

const _: () = assert!(std::mem::size_of::<Idx>() == 4);
