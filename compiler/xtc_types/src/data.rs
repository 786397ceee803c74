//! Structural content of a type node.
//!
//! `TypeData` is both the node payload and its interning key: children are
//! already-interned [`Idx`] handles, so hashing and equality are shallow.

use smallvec::SmallVec;
use xtc_ir::{Access, CellId, ClassId, MethodId, Name, TypedefId};

use crate::{Idx, Tag};

/// Child list for a node. Most nodes have at most four children.
pub type Children = SmallVec<[Idx; 4]>;

/// A type node.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeData {
    // === Terminals ===
    Class(ClassId),
    Typedef(TypedefId),
    /// "This class" relative to `ClassId`, narrowed against the target type.
    ThisClass(ClassId),

    // === Formals ===
    Generic {
        class: ClassId,
        name: Name,
    },
    TypeParam {
        method: MethodId,
        register: u32,
        name: Name,
    },
    FormalChild {
        parent: Idx,
        name: Name,
    },
    DynamicFormal {
        register: u32,
        name: Name,
        constraint: Idx,
    },

    // === Modifiers ===
    Access {
        access: Access,
        inner: Idx,
    },
    Immutable(Idx),
    Service(Idx),
    Parameterized {
        base: Idx,
        params: SmallVec<[Idx; 4]>,
    },
    Annotated {
        annotation: Idx,
        inner: Idx,
    },
    Union(Idx, Idx),
    Intersection(Idx, Idx),
    Difference(Idx, Idx),

    // === Parent-dependent ===
    VirtualChild {
        parent: Idx,
        name: Name,
    },
    InnerChild {
        parent: Idx,
        class: ClassId,
    },
    AnonymousClass {
        parent: Idx,
        class: ClassId,
    },
    PropertyClass {
        parent: Idx,
        property: Name,
    },

    // === Deferred ===
    Unresolved(CellId),
    Recursive(TypedefId),
}

impl TypeData {
    pub fn tag(&self) -> Tag {
        match self {
            TypeData::Class(_) => Tag::Class,
            TypeData::Typedef(_) => Tag::Typedef,
            TypeData::ThisClass(_) => Tag::ThisClass,
            TypeData::Generic { .. } => Tag::Generic,
            TypeData::TypeParam { .. } => Tag::TypeParam,
            TypeData::FormalChild { .. } => Tag::FormalChild,
            TypeData::DynamicFormal { .. } => Tag::DynamicFormal,
            TypeData::Access { .. } => Tag::Access,
            TypeData::Immutable(_) => Tag::Immutable,
            TypeData::Service(_) => Tag::Service,
            TypeData::Parameterized { .. } => Tag::Parameterized,
            TypeData::Annotated { .. } => Tag::Annotated,
            TypeData::Union(..) => Tag::Union,
            TypeData::Intersection(..) => Tag::Intersection,
            TypeData::Difference(..) => Tag::Difference,
            TypeData::VirtualChild { .. } => Tag::VirtualChild,
            TypeData::InnerChild { .. } => Tag::InnerChild,
            TypeData::AnonymousClass { .. } => Tag::AnonymousClass,
            TypeData::PropertyClass { .. } => Tag::PropertyClass,
            TypeData::Unresolved(_) => Tag::Unresolved,
            TypeData::Recursive(_) => Tag::Recursive,
        }
    }

    /// Child nodes in a fixed order; [`with_children`](Self::with_children)
    /// accepts the same order back.
    pub fn children(&self) -> Children {
        let mut out = Children::new();
        match self {
            TypeData::Class(_)
            | TypeData::Typedef(_)
            | TypeData::ThisClass(_)
            | TypeData::Generic { .. }
            | TypeData::TypeParam { .. }
            | TypeData::Unresolved(_)
            | TypeData::Recursive(_) => {}
            TypeData::FormalChild { parent, .. }
            | TypeData::VirtualChild { parent, .. }
            | TypeData::InnerChild { parent, .. }
            | TypeData::AnonymousClass { parent, .. }
            | TypeData::PropertyClass { parent, .. } => out.push(*parent),
            TypeData::DynamicFormal { constraint, .. } => out.push(*constraint),
            TypeData::Access { inner, .. }
            | TypeData::Immutable(inner)
            | TypeData::Service(inner) => out.push(*inner),
            TypeData::Parameterized { base, params } => {
                out.push(*base);
                out.extend_from_slice(params);
            }
            TypeData::Annotated { annotation, inner } => {
                out.push(*annotation);
                out.push(*inner);
            }
            TypeData::Union(a, b)
            | TypeData::Intersection(a, b)
            | TypeData::Difference(a, b) => {
                out.push(*a);
                out.push(*b);
            }
        }
        out
    }

    /// Clone with a replacement child list.
    ///
    /// # Panics
    /// Panics if `children` does not have the length [`children`](Self::children)
    /// reports for this node.
    pub fn with_children(&self, children: &[Idx]) -> TypeData {
        let arity = self.children().len();
        assert_eq!(
            children.len(),
            arity,
            "{} node expects {arity} children",
            self.tag()
        );
        match self {
            TypeData::Class(_)
            | TypeData::Typedef(_)
            | TypeData::ThisClass(_)
            | TypeData::Generic { .. }
            | TypeData::TypeParam { .. }
            | TypeData::Unresolved(_)
            | TypeData::Recursive(_) => self.clone(),
            TypeData::FormalChild { name, .. } => TypeData::FormalChild {
                parent: children[0],
                name: *name,
            },
            TypeData::VirtualChild { name, .. } => TypeData::VirtualChild {
                parent: children[0],
                name: *name,
            },
            TypeData::InnerChild { class, .. } => TypeData::InnerChild {
                parent: children[0],
                class: *class,
            },
            TypeData::AnonymousClass { class, .. } => TypeData::AnonymousClass {
                parent: children[0],
                class: *class,
            },
            TypeData::PropertyClass { property, .. } => TypeData::PropertyClass {
                parent: children[0],
                property: *property,
            },
            TypeData::DynamicFormal { register, name, .. } => TypeData::DynamicFormal {
                register: *register,
                name: *name,
                constraint: children[0],
            },
            TypeData::Access { access, .. } => TypeData::Access {
                access: *access,
                inner: children[0],
            },
            TypeData::Immutable(_) => TypeData::Immutable(children[0]),
            TypeData::Service(_) => TypeData::Service(children[0]),
            TypeData::Parameterized { .. } => TypeData::Parameterized {
                base: children[0],
                params: children[1..].iter().copied().collect(),
            },
            TypeData::Annotated { .. } => TypeData::Annotated {
                annotation: children[0],
                inner: children[1],
            },
            TypeData::Union(..) => TypeData::Union(children[0], children[1]),
            TypeData::Intersection(..) => TypeData::Intersection(children[0], children[1]),
            TypeData::Difference(..) => TypeData::Difference(children[0], children[1]),
        }
    }

    /// The wrapped node of a modifier, if this is a single-child modifier.
    pub fn underlying(&self) -> Option<Idx> {
        match self {
            TypeData::Access { inner, .. }
            | TypeData::Immutable(inner)
            | TypeData::Service(inner)
            | TypeData::Annotated { inner, .. } => Some(*inner),
            TypeData::Parameterized { base, .. } => Some(*base),
            _ => None,
        }
    }

    /// The enclosing node of a parent-dependent or formal-child node.
    pub fn parent(&self) -> Option<Idx> {
        match self {
            TypeData::FormalChild { parent, .. }
            | TypeData::VirtualChild { parent, .. }
            | TypeData::InnerChild { parent, .. }
            | TypeData::AnonymousClass { parent, .. }
            | TypeData::PropertyClass { parent, .. } => Some(*parent),
            _ => None,
        }
    }

    #[inline]
    pub fn is_formal(&self) -> bool {
        self.tag().is_formal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn idx(n: u32) -> Idx {
        Idx::from_raw(n)
    }

    #[test]
    fn parameterized_children_round_trip() {
        let data = TypeData::Parameterized {
            base: idx(1),
            params: SmallVec::from_slice(&[idx(2), idx(3)]),
        };
        let children = data.children();
        assert_eq!(children.as_slice(), &[idx(1), idx(2), idx(3)]);

        let rebuilt = data.with_children(&[idx(1), idx(4), idx(3)]);
        assert_eq!(
            rebuilt,
            TypeData::Parameterized {
                base: idx(1),
                params: SmallVec::from_slice(&[idx(4), idx(3)]),
            }
        );
    }

    #[test]
    fn leaves_have_no_children() {
        assert!(TypeData::Class(ClassId::from_raw(3)).children().is_empty());
        assert!(TypeData::Recursive(TypedefId::from_raw(0))
            .children()
            .is_empty());
    }

    #[test]
    fn underlying_and_parent() {
        let imm = TypeData::Immutable(idx(5));
        assert_eq!(imm.underlying(), Some(idx(5)));
        assert_eq!(imm.parent(), None);

        let child = TypeData::VirtualChild {
            parent: idx(7),
            name: Name::from_raw(1),
        };
        assert_eq!(child.parent(), Some(idx(7)));
        assert_eq!(child.underlying(), None);
    }

    #[test]
    #[should_panic(expected = "expects 2 children")]
    fn wrong_arity_panics() {
        let _ = TypeData::Union(idx(1), idx(2)).with_children(&[idx(1)]);
    }
}
