//! Declaration-level enums: access, class format, variance.

use std::fmt;

/// Visibility of a member or the access a type reference reveals.
///
/// Ordered by how much a reference reveals: `Public < Protected < Private`.
/// `Struct` exposes the raw field structure and is unordered with the rest.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Access {
    #[default]
    Public = 0,
    Protected = 1,
    Private = 2,
    Struct = 3,
}

impl Access {
    /// Rank for visibility comparisons; `None` for `Struct`.
    #[inline]
    pub const fn rank(self) -> Option<u8> {
        match self {
            Access::Public => Some(0),
            Access::Protected => Some(1),
            Access::Private => Some(2),
            Access::Struct => None,
        }
    }

    /// Whether a member declared with `member` access is visible through a
    /// reference carrying `self` access.
    pub fn reveals(self, member: Access) -> bool {
        match (self.rank(), member.rank()) {
            (Some(view), Some(member)) => member <= view,
            (None, _) | (_, None) => false,
        }
    }

    pub const fn keyword(self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::Private => "private",
            Access::Struct => "struct",
        }
    }

    #[inline]
    pub const fn from_u8(raw: u8) -> Option<Access> {
        match raw {
            0 => Some(Access::Public),
            1 => Some(Access::Protected),
            2 => Some(Access::Private),
            3 => Some(Access::Struct),
            _ => None,
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// The kind of a class declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ClassFormat {
    #[default]
    Class,
    Interface,
    Mixin,
    Const,
    Enum,
    Service,
    Module,
    Package,
}

impl ClassFormat {
    /// Instances of these formats are always immutable.
    pub const fn is_immutable(self) -> bool {
        matches!(
            self,
            ClassFormat::Const | ClassFormat::Enum | ClassFormat::Module | ClassFormat::Package
        )
    }

    pub const fn is_service(self) -> bool {
        matches!(self, ClassFormat::Service)
    }

    pub const fn is_interface(self) -> bool {
        matches!(self, ClassFormat::Interface)
    }

    pub const fn is_mixin(self) -> bool {
        matches!(self, ClassFormat::Mixin)
    }

    pub const fn keyword(self) -> &'static str {
        match self {
            ClassFormat::Class => "class",
            ClassFormat::Interface => "interface",
            ClassFormat::Mixin => "mixin",
            ClassFormat::Const => "const",
            ClassFormat::Enum => "enum",
            ClassFormat::Service => "service",
            ClassFormat::Module => "module",
            ClassFormat::Package => "package",
        }
    }
}

/// Declared variance of a class type parameter.
///
/// Type parameters are covariant unless declared otherwise.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Variance {
    #[default]
    Covariant,
    Contravariant,
    Invariant,
}
