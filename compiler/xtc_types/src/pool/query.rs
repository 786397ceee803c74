//! Structural predicates and modifier stripping.
//!
//! Predicates delegate through modifier layers to the wrapped node; only the
//! variant that changes an answer overrides it. Anything that needs the
//! namespace (class formats, virtual-child immutability) lives on the engine.

use xtc_ir::Access;

use super::Pool;
use crate::{Idx, Tag, TypeData, TypeFlags};

impl Pool {
    /// Wrapped node of a single-child modifier.
    #[inline]
    pub fn underlying(&self, idx: Idx) -> Option<Idx> {
        self.data(idx).underlying()
    }

    /// Enclosing node of a parent-dependent or formal-child node.
    #[inline]
    pub fn parent_of(&self, idx: Idx) -> Option<Idx> {
        self.data(idx).parent()
    }

    /// Peel modifiers down to the head node.
    pub fn head(&self, mut idx: Idx) -> Idx {
        while let Some(inner) = self.underlying(idx) {
            idx = inner;
        }
        idx
    }

    pub fn is_immutability_specified(&self, idx: Idx) -> bool {
        match self.data(idx) {
            TypeData::Immutable(_) => true,
            data => data
                .underlying()
                .is_some_and(|inner| self.is_immutability_specified(inner)),
        }
    }

    #[inline]
    pub fn is_access_specified(&self, idx: Idx) -> bool {
        self.access_specified(idx).is_some()
    }

    fn access_specified(&self, idx: Idx) -> Option<Access> {
        match self.data(idx) {
            TypeData::Access { access, .. } => Some(*access),
            data => data
                .underlying()
                .and_then(|inner| self.access_specified(inner)),
        }
    }

    /// Access revealed by a reference of this type.
    #[inline]
    pub fn access_of(&self, idx: Idx) -> Access {
        self.access_specified(idx).unwrap_or(Access::Public)
    }

    pub fn is_service_specified(&self, idx: Idx) -> bool {
        match self.data(idx) {
            TypeData::Service(_) => true,
            data => data
                .underlying()
                .is_some_and(|inner| self.is_service_specified(inner)),
        }
    }

    pub fn is_annotated(&self, idx: Idx) -> bool {
        match self.data(idx) {
            TypeData::Annotated { .. } => true,
            data => data.underlying().is_some_and(|inner| self.is_annotated(inner)),
        }
    }

    #[inline]
    pub fn is_params_specified(&self, idx: Idx) -> bool {
        self.parameterized_node(idx).is_some()
    }

    fn parameterized_node(&self, idx: Idx) -> Option<&TypeData> {
        match self.data(idx) {
            data @ TypeData::Parameterized { .. } => Some(data),
            TypeData::Access { inner, .. }
            | TypeData::Immutable(inner)
            | TypeData::Service(inner)
            | TypeData::Annotated { inner, .. } => self.parameterized_node(*inner),
            _ => None,
        }
    }

    /// Actual type parameters, looking through modifiers.
    pub fn params_of(&self, idx: Idx) -> &[Idx] {
        match self.parameterized_node(idx) {
            Some(TypeData::Parameterized { params, .. }) => params,
            _ => &[],
        }
    }

    #[inline]
    pub fn is_formal(&self, idx: Idx) -> bool {
        self.flags(idx).contains(TypeFlags::IS_FORMAL)
    }

    #[inline]
    pub fn is_relational(&self, idx: Idx) -> bool {
        self.flags(idx).contains(TypeFlags::IS_RELATIONAL)
    }

    #[inline]
    pub fn is_parent_dependent(&self, idx: Idx) -> bool {
        self.flags(idx).contains(TypeFlags::IS_PARENT_DEPENDENT)
    }

    /// Whether the head is an auto-narrowing reference.
    #[inline]
    pub fn is_auto_narrowing(&self, idx: Idx) -> bool {
        self.tag(self.head(idx)) == Tag::ThisClass
    }

    #[inline]
    pub fn contains_formal(&self, idx: Idx) -> bool {
        self.flags(idx).has_formal()
    }

    #[inline]
    pub fn contains_recursive(&self, idx: Idx) -> bool {
        self.flags(idx).has_recursive()
    }

    #[inline]
    pub fn contains_typedef(&self, idx: Idx) -> bool {
        self.flags(idx).has_typedef()
    }

    // === Stripping ===
    //
    // Each strip removes one qualifier and rebuilds the wrappers above it.

    pub fn strip_access(&mut self, idx: Idx) -> Idx {
        match self.data(idx).clone() {
            TypeData::Access { inner, .. } => inner,
            data @ (TypeData::Immutable(_)
            | TypeData::Service(_)
            | TypeData::Annotated { .. }) => self.strip_below(idx, &data, Self::strip_access),
            _ => idx,
        }
    }

    pub fn strip_immutable(&mut self, idx: Idx) -> Idx {
        match self.data(idx).clone() {
            TypeData::Immutable(inner) => inner,
            data @ (TypeData::Access { .. }
            | TypeData::Service(_)
            | TypeData::Annotated { .. }) => self.strip_below(idx, &data, Self::strip_immutable),
            _ => idx,
        }
    }

    pub fn strip_service(&mut self, idx: Idx) -> Idx {
        match self.data(idx).clone() {
            TypeData::Service(inner) => inner,
            data @ (TypeData::Access { .. }
            | TypeData::Immutable(_)
            | TypeData::Annotated { .. }) => self.strip_below(idx, &data, Self::strip_service),
            _ => idx,
        }
    }

    /// Strip access and immutability, leaving the rest.
    pub fn strip_access_and_immutable(&mut self, idx: Idx) -> Idx {
        let idx = self.strip_access(idx);
        self.strip_immutable(idx)
    }

    fn strip_below(&mut self, idx: Idx, data: &TypeData, strip: fn(&mut Pool, Idx) -> Idx) -> Idx {
        let mut children = data.children();
        // The wrapped node is always the last child of these wrappers.
        let last = children.len() - 1;
        children[last] = strip(self, children[last]);
        self.rebuild(idx, data, &children)
    }
}
