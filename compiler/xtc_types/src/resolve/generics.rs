//! Generic substitution.
//!
//! Every reachable formal is replaced by the resolver's answer. Answers are
//! not substituted again (one-shot), so a resolver mapping `T` to
//! `List<T>` terminates. `FormalChild(parent, name)` is re-resolved against
//! the substituted parent, so `Map<Int, String>.Key` becomes `Int`.

use xtc_ir::{ClassId, Name};

use super::{Formal, GenericResolver, SubstitutionMap};
use crate::traverse::TypeFolder;
use crate::{Idx, Pool, TypeData, TypeEngine};

struct Substituter<'e, 'a, 'r> {
    engine: &'e mut TypeEngine<'a>,
    resolver: &'r dyn GenericResolver,
}

impl TypeFolder for Substituter<'_, '_, '_> {
    fn pool(&mut self) -> &mut Pool {
        self.engine.pool
    }

    fn fold(&mut self, idx: Idx) -> Idx {
        if !self.engine.pool.contains_formal(idx) {
            return idx;
        }
        let data = self.engine.pool.data(idx).clone();
        if let Some(formal) = Formal::of(&data) {
            return self.resolver.resolve_formal(&formal).unwrap_or(idx);
        }
        match data {
            TypeData::FormalChild { parent, name } => {
                let substituted = self.fold(parent);
                if substituted == parent {
                    idx
                } else {
                    self.engine.resolve_formal_child(substituted, name)
                }
            }
            _ => self.super_fold(idx),
        }
    }
}

impl TypeEngine<'_> {
    /// Substitute formals in `idx` through `resolver`.
    #[tracing::instrument(level = "trace", skip(self, resolver))]
    pub fn resolve_generics(&mut self, idx: Idx, resolver: &dyn GenericResolver) -> Idx {
        if idx.is_sentinel() || !self.pool.contains_formal(idx) {
            return idx;
        }
        let mut substituter = Substituter {
            engine: self,
            resolver,
        };
        substituter.fold(idx)
    }

    /// Resolve `parent.name` once `parent` is no longer a formal: a type
    /// parameter of the parent's class (its actual, else its constraint),
    /// else a typedef the class declares, else the formal child stays.
    pub fn resolve_formal_child(&mut self, parent: Idx, name: Name) -> Idx {
        if self.pool.is_formal(parent) {
            return self.pool.formal_child(parent, name);
        }
        let Some(class) = self.class_of(parent) else {
            return self.pool.formal_child(parent, name);
        };
        let decl = self.class_decl(class);
        if let Some((position, tp)) = decl.type_param(name) {
            return self
                .pool
                .params_of(parent)
                .get(position)
                .copied()
                .unwrap_or(tp.constraint);
        }
        if let Some(typedef) = decl.typedef_named(name) {
            let alias = self.pool.typedef_type(typedef);
            let expanded = self.resolve_typedefs(alias);
            let resolver = self.param_resolver(parent);
            return self.resolve_generics(expanded, &resolver);
        }
        self.pool.formal_child(parent, name)
    }

    /// Substitution for the class formals visible in `ty`: each type
    /// parameter maps to its actual, or to its constraint when `ty` does not
    /// supply one. Enclosing types contribute their own formals.
    pub fn param_resolver(&mut self, ty: Idx) -> SubstitutionMap {
        let mut map = SubstitutionMap::new();
        let limit = self.pool.config().max_depth;
        self.collect_params(ty, &mut map, limit);
        map
    }

    fn collect_params(&mut self, ty: Idx, map: &mut SubstitutionMap, hops: u32) {
        if ty.is_sentinel() || hops == 0 {
            return;
        }
        let ty = self.pool.deref(ty);
        let params: Vec<Idx> = self.pool.params_of(ty).to_vec();
        let head = self.pool.deref(self.pool.head(ty));
        let (class, parent) = match *self.pool.data(head) {
            TypeData::Class(class) | TypeData::ThisClass(class) => (Some(class), None),
            TypeData::InnerChild { parent, class } | TypeData::AnonymousClass { parent, class } => {
                (Some(class), Some(parent))
            }
            TypeData::VirtualChild { parent, .. } => (self.class_of(head), Some(parent)),
            TypeData::Typedef(_) | TypeData::Recursive(_) => {
                let expanded = match *self.pool.data(head) {
                    TypeData::Recursive(typedef) => self.expand_recursive(typedef),
                    _ => self.resolve_typedefs(head),
                };
                if expanded != head {
                    self.collect_params(expanded, map, hops - 1);
                }
                return;
            }
            _ => (None, None),
        };
        if let Some(class) = class {
            self.bind_class_params(class, &params, map);
        }
        if let Some(parent) = parent {
            self.collect_params(parent, map, hops - 1);
        }
    }

    fn bind_class_params(&mut self, class: ClassId, params: &[Idx], map: &mut SubstitutionMap) {
        let decl = self.class_decl(class);
        for (position, tp) in decl.type_params.iter().enumerate() {
            let actual = params.get(position).copied().unwrap_or(tp.constraint);
            map.insert_default(
                Formal::Generic {
                    class,
                    name: tp.name,
                },
                actual,
            );
        }
    }
}
