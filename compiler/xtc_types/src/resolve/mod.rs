//! Resolution passes.
//!
//! Each pass is total, idempotent and flag-gated: a node without the
//! relevant presence flag comes back as the same `Idx` without traversal,
//! and rebuilding re-interns only the nodes on a changed path.
//!
//! - [`typedefs`]: alias expansion, with `Recursive` cycle-breakers
//! - [`generics`]: one-shot substitution of formals through a resolver
//! - [`narrowing`]: `ThisClass` against a target type
//! - [`constraint`]: upper bounds of formals, and type-parameter inference
//! - [`forward`]: replacing bound placeholders with their targets
//!
//! Typedef expansion runs before substitution and relation: a node's
//! formal/modifier shape is only known after expansion.

mod constraint;
mod forward;
mod generics;
mod narrowing;
mod typedefs;

use rustc_hash::FxHashMap;
use xtc_ir::{ClassId, MethodId, Name};

use crate::{Idx, TypeData};

/// Identity of a formal placeholder, as seen by a resolver.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Formal {
    /// Class type parameter.
    Generic { class: ClassId, name: Name },
    /// Method type parameter.
    TypeParam { method: MethodId, register: u32 },
    /// Register-bound formal.
    Dynamic { register: u32 },
}

impl Formal {
    /// The formal a node stands for. `FormalChild` is not a formal identity
    /// of its own; it resolves through its parent.
    pub fn of(data: &TypeData) -> Option<Formal> {
        match *data {
            TypeData::Generic { class, name } => Some(Formal::Generic { class, name }),
            TypeData::TypeParam {
                method, register, ..
            } => Some(Formal::TypeParam { method, register }),
            TypeData::DynamicFormal { register, .. } => Some(Formal::Dynamic { register }),
            _ => None,
        }
    }
}

/// Answers "what does this formal stand for here".
///
/// Returning `None` leaves the formal in place.
pub trait GenericResolver {
    fn resolve_formal(&self, formal: &Formal) -> Option<Idx>;
}

impl<F> GenericResolver for F
where
    F: Fn(&Formal) -> Option<Idx>,
{
    fn resolve_formal(&self, formal: &Formal) -> Option<Idx> {
        self(formal)
    }
}

/// A static formal-to-type map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubstitutionMap {
    map: FxHashMap<Formal, Idx>,
}

impl SubstitutionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `formal`, replacing any previous binding.
    pub fn insert(&mut self, formal: Formal, ty: Idx) -> Option<Idx> {
        self.map.insert(formal, ty)
    }

    /// Bind `formal` unless it is already bound.
    pub fn insert_default(&mut self, formal: Formal, ty: Idx) {
        self.map.entry(formal).or_insert(ty);
    }

    pub fn get(&self, formal: &Formal) -> Option<Idx> {
        self.map.get(formal).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl GenericResolver for SubstitutionMap {
    fn resolve_formal(&self, formal: &Formal) -> Option<Idx> {
        self.get(formal)
    }
}

impl FromIterator<(Formal, Idx)> for SubstitutionMap {
    fn from_iter<I: IntoIterator<Item = (Formal, Idx)>>(iter: I) -> Self {
        SubstitutionMap {
            map: iter.into_iter().collect(),
        }
    }
}
