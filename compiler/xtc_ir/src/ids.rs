//! Opaque handles into the declaration namespace.

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                $name(raw)
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

define_id!(
    /// A class, interface, mixin, const, enum, service, module or package.
    ClassId
);
define_id!(
    /// A named type alias.
    TypedefId
);
define_id!(
    /// A method declaration (owner of method type parameters).
    MethodId
);
define_id!(
    /// A forward-reference cell in a type pool.
    CellId
);

impl ClassId {
    /// The root class every namespace declares first.
    pub const OBJECT: ClassId = ClassId(0);
}
