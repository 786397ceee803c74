//! Recoverable library errors.
//!
//! Semantic problems with a type are diagnostics, not errors; these enums
//! cover malformed input handed to the pool from outside.

use crate::{Idx, Tag};

/// A node offered to [`Pool::register`](crate::Pool::register) that the pool
/// cannot accept.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegisterError {
    #[error("{tag} node refers to a reserved sentinel")]
    SentinelChild { tag: Tag },

    #[error("{tag} node refers to {child:?}, which is not in the pool")]
    UnknownChild { tag: Tag, child: Idx },

    #[error("unresolved node refers to unknown cell {cell}")]
    UnknownCell { cell: u32 },

    #[error("access modifier applied to an access-qualified type")]
    DoubleAccess,

    #[error("parameterized type over a modified or relational base ({base})")]
    ModifiedBase { base: Tag },
}

/// Freezing requires every forward reference to be bound.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FreezeError {
    #[error("{pending} placeholder(s) still unresolved")]
    PendingPlaceholders { pending: usize },
}

/// Failure to read the binary node encoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("missing `XTCT` magic")]
    BadMagic,

    #[error("unsupported encoding version {0}")]
    UnsupportedVersion(u8),

    #[error("unexpected end of input at byte {offset}")]
    UnexpectedEof { offset: usize },

    #[error("packed integer at byte {offset} overflows u32")]
    Overflow { offset: usize },

    #[error("unknown tag byte {tag} in record {record}")]
    UnknownTag { record: u32, tag: u8 },

    #[error("invalid access byte {value} in record {record}")]
    InvalidAccess { record: u32, value: u8 },

    #[error("record {record} refers to record {target}, but only {count} exist")]
    BadReference { record: u32, target: u32, count: u32 },

    #[error("record {record} is part of a reference cycle that does not pass through a placeholder")]
    Cycle { record: u32 },

    #[error("record {record} rejected: {source}")]
    Rejected {
        record: u32,
        #[source]
        source: RegisterError,
    },

    #[error("{0} trailing byte(s) after the root list")]
    TrailingBytes(usize),
}
