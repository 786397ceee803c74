//! Semantic validation of type nodes.
//!
//! Construction only enforces structural contracts; whether a node makes
//! sense against its declarations is checked here. Children are validated
//! before their parent, and a child that halts stops the walk: the parent's
//! own checks would only restate the same problem.

use rustc_hash::FxHashSet;
use xtc_diagnostic::{Diagnostic, ErrorCode};
use xtc_ir::{Access, ClassId};

use crate::{Idx, Relation, TypeData, TypeEngine};

impl TypeEngine<'_> {
    /// Validate `idx` and everything under it, pushing diagnostics onto the
    /// engine.
    ///
    /// Returns `true` when validation of this subtree had to halt.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn validate(&mut self, idx: Idx) -> bool {
        if idx.is_sentinel() {
            return true;
        }
        let Some(_token) = self.enter(idx) else {
            return true;
        };
        let data = self.pool.data(idx).clone();
        for child in data.children() {
            if xtc_stack::ensure_sufficient_stack(|| self.validate(child)) {
                return true;
            }
        }
        self.check_node(idx, &data)
    }

    fn check_node(&mut self, idx: Idx, data: &TypeData) -> bool {
        match *data {
            TypeData::Immutable(inner) => {
                if self.pool.is_service_specified(inner) {
                    self.invalid(ErrorCode::E1001, idx, "is declared both immutable and service");
                } else if self.is_service(inner) {
                    self.invalid(ErrorCode::E1008, idx, "makes a service class immutable");
                }
                false
            }
            TypeData::Service(inner) => {
                if self.pool.is_immutability_specified(inner) {
                    self.invalid(ErrorCode::E1001, idx, "is declared both service and immutable");
                }
                false
            }
            TypeData::Access {
                access: Access::Struct,
                inner,
            } => {
                if self.format_of(inner).is_some_and(|f| f.is_interface()) {
                    self.invalid(ErrorCode::E1002, idx, "applies struct access to an interface");
                }
                false
            }
            TypeData::Annotated { annotation, .. } => {
                if let Some(format) = self.format_of(annotation) {
                    if !format.is_mixin() {
                        let message = format!("is annotated by a {}, not a mixin", format.keyword());
                        self.invalid(ErrorCode::E1003, idx, &message);
                    }
                }
                false
            }
            TypeData::Parameterized { base, ref params } => self.check_params(idx, base, params),
            TypeData::VirtualChild { parent, name } => {
                let Some(class) = self.class_of(parent) else {
                    return false;
                };
                if self.find_child(class, name).is_some() {
                    return false;
                }
                let message = format!("names no child `{}`", self.ns.name_str(name));
                self.invalid(ErrorCode::E1006, idx, &message);
                true
            }
            TypeData::Unresolved(_) => {
                if !self.pool.is_unbound(idx) {
                    return false;
                }
                self.invalid(ErrorCode::E1007, idx, "was never resolved");
                true
            }
            TypeData::Typedef(typedef) => {
                if self.ns.typedef(typedef).is_defined() {
                    return false;
                }
                self.invalid(ErrorCode::E3003, idx, "names a typedef with no target");
                true
            }
            TypeData::Class(class)
            | TypeData::ThisClass(class)
            | TypeData::InnerChild { class, .. }
            | TypeData::AnonymousClass { class, .. } => {
                if !self.contributes_to_itself(class) {
                    return false;
                }
                self.invalid(ErrorCode::E2005, idx, "has a self-referential defining class");
                true
            }
            _ => false,
        }
    }

    fn check_params(&mut self, idx: Idx, base: Idx, params: &[Idx]) -> bool {
        let Some(class) = self.class_of(base) else {
            return false;
        };
        let decl = self.class_decl(class);
        if params.len() > decl.type_params.len() {
            let message = format!(
                "supplies {} type parameter(s), but `{}` declares {}",
                params.len(),
                self.ns.name_str(decl.name),
                decl.type_params.len()
            );
            self.invalid(ErrorCode::E1004, idx, &message);
            return true;
        }
        let resolver = self.param_resolver(idx);
        for (tp, &param) in decl.type_params.iter().zip(params) {
            if tp.constraint.is_object() {
                continue;
            }
            let bound = self.resolve_generics(tp.constraint, &resolver);
            if self.assignable(bound, param) == Relation::Incompatible {
                let message = format!(
                    "binds `{}` to `{}`, which does not satisfy `{}`",
                    self.ns.name_str(tp.name),
                    self.render(param),
                    self.render(bound)
                );
                self.invalid(ErrorCode::E1005, idx, &message);
            }
        }
        false
    }

    /// Whether following `class`'s contributions leads back to `class`.
    fn contributes_to_itself(&mut self, class: ClassId) -> bool {
        let mut seen = FxHashSet::default();
        let mut queue: Vec<Idx> = self
            .class_decl(class)
            .contributions
            .iter()
            .map(|c| c.ty)
            .collect();
        while let Some(ty) = queue.pop() {
            let Some(next) = self.class_of(ty) else {
                continue;
            };
            if next == class {
                return true;
            }
            if seen.insert(next) {
                queue.extend(self.class_decl(next).contributions.iter().map(|c| c.ty));
            }
        }
        false
    }

    fn invalid(&mut self, code: ErrorCode, idx: Idx, problem: &str) {
        let rendered = self.render(idx);
        self.report(
            Diagnostic::error(code)
                .with_message(format!("`{rendered}` {problem}"))
                .with_subject(rendered),
        );
    }
}
