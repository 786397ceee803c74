//! Type-expression model for xtc.
//!
//! A graph of interned, immutable type nodes and the passes that resolve,
//! compare and flatten them:
//!
//! - [`Pool`]: the interning arena; structurally equal nodes share one [`Idx`]
//! - [`TypeData`]: the closed node grammar (terminals, formals, modifiers,
//!   relational, parent-dependent, deferred)
//! - [`TypeEngine`]: resolution passes (typedefs, generics, auto-narrowing,
//!   constraints, forward references), the [`Relation`] calculus, effective
//!   view synthesis ([`TypeInfo`]) and validation
//! - [`encode`]: the binary node encoding
//! - [`SharedPool`]: a frozen pool serving queries from many threads
//!
//! Declarations come from a [`Namespace`]; [`Registry`] is the in-memory one.
//!
//! # Invalidation
//!
//! Derived data lives in side tables keyed by the pool's generation. Binding a
//! placeholder or calling [`Pool::invalidate`] moves the generation on and
//! the tables are discarded wholesale on next access.

mod config;
mod data;
pub mod encode;
mod engine;
mod error;
mod flags;
mod idx;
mod info;
mod memo;
mod pool;
mod registry;
mod relation;
mod resolve;
mod shared;
mod tag;
mod traverse;
mod validate;

pub use config::PoolConfig;
pub use data::{Children, TypeData};
pub use engine::TypeEngine;
pub use error::{DecodeError, FreezeError, RegisterError};
pub use flags::TypeFlags;
pub use idx::Idx;
pub use info::{
    ChildInfo, MethodInfo, ParamInfo, Progress, PropertyInfo, Signature, TypeInfo,
};
pub use pool::{Consumer, Pool, PoolStats};
pub use registry::{
    ClassDecl, Contribution, ContributionKind, MethodDecl, Namespace, PropertyDecl, Registry,
    TypeParamDecl, TypedefDecl,
};
pub use relation::Relation;
pub use resolve::{Formal, GenericResolver, SubstitutionMap};
pub use shared::SharedPool;
pub use tag::Tag;
pub use traverse::TypeFolder;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set, and only the first call has any
/// effect.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{Idx, Tag, TypeFlags};
    xtc_ir::static_assert_size!(Idx, 4);
    xtc_ir::static_assert_size!(Tag, 1);
    xtc_ir::static_assert_size!(TypeFlags, 4);
}
