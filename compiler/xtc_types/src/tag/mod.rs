//! Type kind tag.
//!
//! Each node in the pool has a `Tag` identifying its variant. The tag byte is
//! also the first byte of every record in the binary encoding.
//!
//! # Tag Categories
//!
//! - 0-15: Terminal leaves (class, typedef, this-class)
//! - 16-31: Formal placeholders
//! - 32-47: Single-child modifiers
//! - 48-63: Relational (two-child) types
//! - 64-95: Parent-dependent types
//! - 96-111: Deferred placeholders

use std::fmt;

/// Type kind discriminant.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Tag {
    // === Terminals (0-15) ===
    /// Reference to a declared class.
    Class = 1,
    /// Reference to a named alias, expanded by typedef resolution.
    Typedef = 2,
    /// Auto-narrowing "this class" reference.
    ThisClass = 3,

    // === Formals (16-31) ===
    /// Class type parameter, identified by declaring class and name.
    Generic = 16,
    /// Method type parameter, identified by method and register.
    TypeParam = 17,
    /// Named child of a formal type (`T.Key`).
    FormalChild = 18,
    /// Formal bound to a runtime register.
    DynamicFormal = 19,

    // === Modifiers (32-47) ===
    Access = 32,
    Immutable = 33,
    Service = 34,
    Parameterized = 35,
    Annotated = 36,

    // === Relational (48-63) ===
    Union = 48,
    Intersection = 49,
    /// Members of the first side that the second lacks (`A - B`).
    Difference = 50,

    // === Parent-dependent (64-95) ===
    VirtualChild = 64,
    InnerChild = 65,
    AnonymousClass = 66,
    PropertyClass = 67,

    // === Deferred (96-111) ===
    /// Forward-reference cell.
    Unresolved = 96,
    /// Typedef cycle-breaker.
    Recursive = 97,
}

impl Tag {
    /// Decode a tag byte.
    pub const fn from_u8(raw: u8) -> Option<Tag> {
        Some(match raw {
            1 => Tag::Class,
            2 => Tag::Typedef,
            3 => Tag::ThisClass,
            16 => Tag::Generic,
            17 => Tag::TypeParam,
            18 => Tag::FormalChild,
            19 => Tag::DynamicFormal,
            32 => Tag::Access,
            33 => Tag::Immutable,
            34 => Tag::Service,
            35 => Tag::Parameterized,
            36 => Tag::Annotated,
            48 => Tag::Union,
            49 => Tag::Intersection,
            50 => Tag::Difference,
            64 => Tag::VirtualChild,
            65 => Tag::InnerChild,
            66 => Tag::AnonymousClass,
            67 => Tag::PropertyClass,
            96 => Tag::Unresolved,
            97 => Tag::Recursive,
            _ => return None,
        })
    }

    #[inline]
    pub const fn is_terminal(self) -> bool {
        (self as u8) < 16
    }

    #[inline]
    pub const fn is_formal(self) -> bool {
        matches!(self as u8, 16..=31)
    }

    #[inline]
    pub const fn is_modifier(self) -> bool {
        matches!(self as u8, 32..=47)
    }

    #[inline]
    pub const fn is_relational(self) -> bool {
        matches!(self as u8, 48..=63)
    }

    #[inline]
    pub const fn is_parent_dependent(self) -> bool {
        matches!(self as u8, 64..=95)
    }

    #[inline]
    pub const fn is_deferred(self) -> bool {
        matches!(self as u8, 96..=111)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Typedef => "typedef",
            Self::ThisClass => "this-class",
            Self::Generic => "generic",
            Self::TypeParam => "type-param",
            Self::FormalChild => "formal-child",
            Self::DynamicFormal => "dynamic-formal",
            Self::Access => "access",
            Self::Immutable => "immutable",
            Self::Service => "service",
            Self::Parameterized => "parameterized",
            Self::Annotated => "annotated",
            Self::Union => "union",
            Self::Intersection => "intersection",
            Self::Difference => "difference",
            Self::VirtualChild => "virtual-child",
            Self::InnerChild => "inner-child",
            Self::AnonymousClass => "anonymous-class",
            Self::PropertyClass => "property-class",
            Self::Unresolved => "unresolved",
            Self::Recursive => "recursive",
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag::{}", self.name())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
