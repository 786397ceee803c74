//! Typedef expansion.
//!
//! `Typedef(t)` is replaced by the (expanded) target of `t`. An alias that
//! reaches itself again during its own expansion gets `Recursive(t)` at the
//! point of re-entry, so `type T = List<T>` expands to
//! `List<Recursive(T)>`: exactly one cycle-breaker on the cycle.
//!
//! A bound placeholder handed to the pass is followed to its target;
//! placeholders nested inside a node are left for forward resolution, so
//! expansion is idempotent even across recursive forward references.

use xtc_diagnostic::{Diagnostic, ErrorCode};
use xtc_ir::TypedefId;

use crate::traverse::TypeFolder;
use crate::{Idx, Pool, TypeData, TypeEngine};

struct TypedefExpander<'e, 'a> {
    engine: &'e mut TypeEngine<'a>,
    aliases: Vec<TypedefId>,
}

impl TypeFolder for TypedefExpander<'_, '_> {
    fn pool(&mut self) -> &mut Pool {
        self.engine.pool
    }

    fn fold(&mut self, idx: Idx) -> Idx {
        if !self.engine.pool.flags(idx).has_typedef() {
            return idx;
        }
        match *self.engine.pool.data(idx) {
            TypeData::Typedef(typedef) => self.expand(idx, typedef),
            _ => self.super_fold(idx),
        }
    }
}

impl TypedefExpander<'_, '_> {
    fn expand(&mut self, idx: Idx, typedef: TypedefId) -> Idx {
        if self.aliases.contains(&typedef) {
            return self.engine.pool.recursive(typedef);
        }
        let ns = self.engine.ns;
        let decl = ns.typedef(typedef);
        if !decl.is_defined() {
            let name = ns.name_str(decl.name);
            self.engine.report(
                Diagnostic::error(ErrorCode::E3003)
                    .with_message(format!("typedef `{name}` has no target"))
                    .with_subject(name),
            );
            return idx;
        }
        self.engine.pool.stats_mut().typedef_expansions += 1;
        self.aliases.push(typedef);
        let out = xtc_stack::ensure_sufficient_stack(|| self.fold(decl.target));
        self.aliases.pop();
        out
    }
}

impl TypeEngine<'_> {
    /// Expand every typedef reachable from `idx`.
    ///
    /// Returns `idx` itself (or the target of a bound placeholder) when there
    /// is nothing to expand.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn resolve_typedefs(&mut self, idx: Idx) -> Idx {
        if idx.is_sentinel() {
            return idx;
        }
        let idx = self.pool.deref(idx);
        if !self.pool.flags(idx).has_typedef() {
            return idx;
        }
        if let Some(&done) = self.pool.memo().typedefs.get(&idx) {
            return done;
        }
        let mut expander = TypedefExpander {
            engine: self,
            aliases: Vec::new(),
        };
        let out = expander.fold(idx);
        self.pool.memo().typedefs.insert(idx, out);
        out
    }

    /// The one-step expansion a `Recursive(t)` stands for: the target of `t`
    /// with its own re-entries replaced by `Recursive(t)` again.
    pub fn expand_recursive(&mut self, typedef: TypedefId) -> Idx {
        let alias = self.pool.typedef_type(typedef);
        self.resolve_typedefs(alias)
    }
}
