//! Identity primitives for the xtc type model.
//!
//! Names, declaration handles and the small enums every declaration carries.
//! The namespace itself (what a `ClassId` *means*) lives with the type crate;
//! this crate only provides the vocabulary.

mod decl;
mod ids;
mod interner;
mod name;

pub use decl::{Access, ClassFormat, Variance};
pub use ids::{CellId, ClassId, MethodId, TypedefId};
pub use interner::{InternError, StringInterner};
pub use name::Name;

/// Compile-time size check.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{ClassId, Name};
    crate::static_assert_size!(Name, 4);
    crate::static_assert_size!(ClassId, 4);
}
