//! Type formatting for diagnostics and debugging.

use rustc_hash::FxHashSet;

use super::Pool;
use crate::{Idx, Namespace, Tag, TypeData};

impl Pool {
    /// Render a type as source-like text.
    ///
    /// Bound placeholders print as their target; a placeholder reached again
    /// while printing its own target prints as its name.
    pub fn format_type(&self, idx: Idx, ns: &dyn Namespace) -> String {
        let mut buf = String::new();
        let mut visiting = FxHashSet::default();
        self.format_type_into(idx, ns, &mut buf, &mut visiting);
        buf
    }

    fn format_type_into(
        &self,
        idx: Idx,
        ns: &dyn Namespace,
        buf: &mut String,
        visiting: &mut FxHashSet<Idx>,
    ) {
        if idx.is_pending() {
            buf.push_str("<pending>");
            return;
        }
        if idx.is_none() {
            buf.push_str("<none>");
            return;
        }
        match self.data(idx) {
            TypeData::Class(class) => buf.push_str(ns.name_str(ns.class(*class).name)),
            TypeData::Typedef(typedef) | TypeData::Recursive(typedef) => {
                buf.push_str(ns.name_str(ns.typedef(*typedef).name));
            }
            TypeData::ThisClass(class) => {
                buf.push_str("this:class(");
                buf.push_str(ns.name_str(ns.class(*class).name));
                buf.push(')');
            }
            TypeData::Generic { name, .. }
            | TypeData::TypeParam { name, .. }
            | TypeData::DynamicFormal { name, .. } => buf.push_str(ns.name_str(*name)),
            TypeData::FormalChild { parent, name } | TypeData::VirtualChild { parent, name } => {
                self.format_type_into(*parent, ns, buf, visiting);
                buf.push('.');
                buf.push_str(ns.name_str(*name));
            }
            TypeData::InnerChild { parent, class } => {
                self.format_type_into(*parent, ns, buf, visiting);
                buf.push('.');
                buf.push_str(ns.name_str(ns.class(*class).name));
            }
            TypeData::AnonymousClass { class, .. } => {
                buf.push_str(ns.name_str(ns.class(*class).name));
            }
            TypeData::PropertyClass { parent, property } => {
                self.format_type_into(*parent, ns, buf, visiting);
                buf.push('.');
                buf.push_str(ns.name_str(*property));
                buf.push_str(":property");
            }
            TypeData::Access { access, inner } => {
                self.format_type_into(*inner, ns, buf, visiting);
                buf.push(':');
                buf.push_str(access.keyword());
            }
            TypeData::Immutable(inner) => {
                buf.push_str("immutable ");
                self.format_type_into(*inner, ns, buf, visiting);
            }
            TypeData::Service(inner) => {
                buf.push_str("service ");
                self.format_type_into(*inner, ns, buf, visiting);
            }
            TypeData::Parameterized { base, params } => {
                self.format_type_into(*base, ns, buf, visiting);
                buf.push('<');
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        buf.push_str(", ");
                    }
                    self.format_type_into(*param, ns, buf, visiting);
                }
                buf.push('>');
            }
            TypeData::Annotated { annotation, inner } => {
                buf.push('@');
                self.format_type_into(*annotation, ns, buf, visiting);
                buf.push(' ');
                self.format_type_into(*inner, ns, buf, visiting);
            }
            TypeData::Union(a, b) => self.format_relational(idx, *a, *b, " | ", ns, buf, visiting),
            TypeData::Intersection(a, b) => {
                self.format_relational(idx, *a, *b, " & ", ns, buf, visiting);
            }
            TypeData::Difference(a, b) => {
                self.format_relational(idx, *a, *b, " - ", ns, buf, visiting);
            }
            TypeData::Unresolved(cell) => {
                let slot = &self.cells[cell.index()];
                match slot.target {
                    Some(target) if visiting.insert(idx) => {
                        self.format_type_into(target, ns, buf, visiting);
                        visiting.remove(&idx);
                    }
                    _ => buf.push_str(ns.name_str(slot.name)),
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn format_relational(
        &self,
        idx: Idx,
        a: Idx,
        b: Idx,
        op: &str,
        ns: &dyn Namespace,
        buf: &mut String,
        visiting: &mut FxHashSet<Idx>,
    ) {
        let tag = self.tag(idx);
        for (i, side) in [a, b].into_iter().enumerate() {
            if i > 0 {
                buf.push_str(op);
            }
            let side_tag = self.tag(self.deref(side));
            // `-` does not associate to the right.
            let parens = side_tag.is_relational()
                && (side_tag != tag || (tag == Tag::Difference && i > 0));
            if parens {
                buf.push('(');
            }
            self.format_type_into(side, ns, buf, visiting);
            if parens {
                buf.push(')');
            }
        }
    }
}
