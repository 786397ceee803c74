//! Node constructors.
//!
//! Thin wrappers over [`Pool::intern`]; the contract checks live there.

use smallvec::SmallVec;
use xtc_ir::{Access, ClassId, MethodId, Name, TypedefId};

use super::Pool;
use crate::{Idx, TypeData};

impl Pool {
    // === Terminals ===

    #[inline]
    pub fn class_type(&mut self, class: ClassId) -> Idx {
        self.intern(TypeData::Class(class))
    }

    #[inline]
    pub fn typedef_type(&mut self, typedef: TypedefId) -> Idx {
        self.intern(TypeData::Typedef(typedef))
    }

    /// Auto-narrowing reference to `class`.
    #[inline]
    pub fn this_class(&mut self, class: ClassId) -> Idx {
        self.intern(TypeData::ThisClass(class))
    }

    // === Formals ===

    /// Class type parameter `name` of `class`.
    #[inline]
    pub fn generic(&mut self, class: ClassId, name: Name) -> Idx {
        self.intern(TypeData::Generic { class, name })
    }

    /// Method type parameter in `register` of `method`.
    #[inline]
    pub fn type_param(&mut self, method: MethodId, register: u32, name: Name) -> Idx {
        self.intern(TypeData::TypeParam {
            method,
            register,
            name,
        })
    }

    /// Named child of a formal, e.g. `T.Key`.
    #[inline]
    pub fn formal_child(&mut self, parent: Idx, name: Name) -> Idx {
        self.intern(TypeData::FormalChild { parent, name })
    }

    #[inline]
    pub fn dynamic_formal(&mut self, register: u32, name: Name, constraint: Idx) -> Idx {
        self.intern(TypeData::DynamicFormal {
            register,
            name,
            constraint,
        })
    }

    // === Modifiers ===

    #[inline]
    pub fn access(&mut self, access: Access, inner: Idx) -> Idx {
        self.intern(TypeData::Access { access, inner })
    }

    #[inline]
    pub fn immutable(&mut self, inner: Idx) -> Idx {
        self.intern(TypeData::Immutable(inner))
    }

    #[inline]
    pub fn service(&mut self, inner: Idx) -> Idx {
        self.intern(TypeData::Service(inner))
    }

    pub fn parameterized(&mut self, base: Idx, params: &[Idx]) -> Idx {
        self.intern(TypeData::Parameterized {
            base,
            params: SmallVec::from_slice(params),
        })
    }

    /// `@annotation inner`, where `annotation` is a mixin type.
    #[inline]
    pub fn annotated(&mut self, annotation: Idx, inner: Idx) -> Idx {
        self.intern(TypeData::Annotated { annotation, inner })
    }

    #[inline]
    pub fn union(&mut self, a: Idx, b: Idx) -> Idx {
        self.intern(TypeData::Union(a, b))
    }

    #[inline]
    pub fn intersection(&mut self, a: Idx, b: Idx) -> Idx {
        self.intern(TypeData::Intersection(a, b))
    }

    /// `a - b`: the members of `a` that `b` does not declare.
    #[inline]
    pub fn difference(&mut self, a: Idx, b: Idx) -> Idx {
        self.intern(TypeData::Difference(a, b))
    }

    // === Parent-dependent ===

    #[inline]
    pub fn virtual_child(&mut self, parent: Idx, name: Name) -> Idx {
        self.intern(TypeData::VirtualChild { parent, name })
    }

    #[inline]
    pub fn inner_child(&mut self, parent: Idx, class: ClassId) -> Idx {
        self.intern(TypeData::InnerChild { parent, class })
    }

    #[inline]
    pub fn anonymous_class(&mut self, parent: Idx, class: ClassId) -> Idx {
        self.intern(TypeData::AnonymousClass { parent, class })
    }

    /// The type of property `property` as seen from `parent`.
    #[inline]
    pub fn property_class(&mut self, parent: Idx, property: Name) -> Idx {
        self.intern(TypeData::PropertyClass { parent, property })
    }

    // === Deferred ===

    #[inline]
    pub fn recursive(&mut self, typedef: TypedefId) -> Idx {
        self.intern(TypeData::Recursive(typedef))
    }

    /// Rebuild `data` with new children, returning `original` when nothing
    /// changed.
    pub(crate) fn rebuild(&mut self, original: Idx, data: &TypeData, children: &[Idx]) -> Idx {
        if data.children().as_slice() == children {
            return original;
        }
        self.intern(data.with_children(children))
    }
}
