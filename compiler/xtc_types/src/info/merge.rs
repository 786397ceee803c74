//! Member collision rules.
//!
//! Members arrive one at a time, either from a contributed layer or from the
//! class's own declarations (`own`). An arrival is matched against the entry
//! already in the view under the same key:
//!
//! - identical identity sets are the same declaration reached twice; the
//!   more specific side stays
//! - disjoint identity sets union, with the last declaration as head; for
//!   properties one type must be at least as specific as the other
//! - overlapping identity sets need a declared override on one side
//! - static and instance members never share a key
//!
//! An own method override without an exact base signature caps the single
//! base method it is substitutable for.

use xtc_diagnostic::{Diagnostic, ErrorCode};

use super::{MethodInfo, PropertyInfo, Signature, TypeInfo};
use crate::TypeEngine;

impl TypeEngine<'_> {
    /// Layer every member of `layer` into `info`.
    pub(super) fn merge_layer(&mut self, info: &mut TypeInfo, layer: &TypeInfo) {
        if !layer.is_complete() {
            info.mark_incomplete();
        }
        for property in layer.properties.values() {
            self.merge_property(info, property.clone(), false);
        }
        for signatures in layer.methods_by_name.values() {
            for signature in signatures {
                if let Some(method) = layer.methods.get(signature) {
                    self.merge_method(info, method.clone(), false);
                }
            }
        }
        for (name, child) in &layer.children {
            info.children.entry(*name).or_insert_with(|| child.clone());
        }
    }

    fn conflict(&mut self, info: &mut TypeInfo, code: ErrorCode, member: &str, note: String) {
        let rendered = self.render(info.ty);
        let diagnostic = Diagnostic::error(code)
            .with_message(format!(
                "{} `{member}` in `{rendered}`",
                code.description()
            ))
            .with_subject(rendered)
            .with_note(note);
        info.diagnostics.push(diagnostic.clone());
        self.report(diagnostic);
    }

    pub(super) fn merge_property(&mut self, info: &mut TypeInfo, incoming: PropertyInfo, own: bool) {
        let ns = self.ns;
        let name = ns.name_str(incoming.name);
        let Some(existing) = info.properties.get(&incoming.name).cloned() else {
            if own && incoming.is_override {
                self.conflict(
                    info,
                    ErrorCode::E2004,
                    name,
                    "no contribution declares this property".to_owned(),
                );
            }
            info.properties.insert(incoming.name, incoming);
            return;
        };

        if existing.is_static != incoming.is_static {
            self.conflict(
                info,
                ErrorCode::E2003,
                name,
                "one declaration is static and the other is not".to_owned(),
            );
            return;
        }

        let narrower = existing.ty == incoming.ty || self.is_a(incoming.ty, existing.ty);
        if existing.identities == incoming.identities {
            if narrower {
                info.properties.insert(incoming.name, incoming);
            }
            return;
        }

        let wider = existing.ty == incoming.ty || self.is_a(existing.ty, incoming.ty);
        let disjoint = existing.identities.is_disjoint(&incoming.identities);
        if disjoint && own && incoming.is_override {
            if !narrower {
                let expected = self.render(existing.ty);
                let found = self.render(incoming.ty);
                self.conflict(
                    info,
                    ErrorCode::E2007,
                    name,
                    format!("`{found}` is not assignable to the overridden `{expected}`"),
                );
            }
        } else if disjoint {
            if !narrower && !wider {
                let a = self.render(existing.ty);
                let b = self.render(incoming.ty);
                self.conflict(
                    info,
                    ErrorCode::E2001,
                    name,
                    format!("contributed as both `{a}` and `{b}`"),
                );
                return;
            }
        } else if !existing.is_override && !incoming.is_override {
            self.conflict(
                info,
                ErrorCode::E2001,
                name,
                "declarations overlap without an override".to_owned(),
            );
            return;
        }

        let mut merged = if narrower || own {
            incoming
        } else {
            PropertyInfo {
                ty: existing.ty,
                ..incoming
            }
        };
        merged.identities.extend(existing.identities);
        info.properties.insert(merged.name, merged);
    }

    pub(super) fn merge_method(&mut self, info: &mut TypeInfo, incoming: MethodInfo, own: bool) {
        let ns = self.ns;
        let name = ns.name_str(incoming.signature.name);
        let signature = incoming.signature.clone();

        let Some(existing) = info.methods.get(&signature).cloned() else {
            if own && incoming.is_override {
                self.narrow_override(info, incoming);
            } else {
                Self::insert_method(info, incoming);
            }
            return;
        };

        if existing.is_static != incoming.is_static {
            self.conflict(
                info,
                ErrorCode::E2003,
                name,
                "one declaration is static and the other is not".to_owned(),
            );
            return;
        }
        if existing.identities == incoming.identities {
            return;
        }
        let disjoint = existing.identities.is_disjoint(&incoming.identities);
        if !disjoint && !existing.is_override && !incoming.is_override {
            self.conflict(
                info,
                ErrorCode::E2002,
                name,
                "declarations overlap without an override".to_owned(),
            );
            return;
        }

        let mut merged = incoming;
        merged.identities.extend(existing.identities);
        merged.capped_by = existing.capped_by;
        info.methods.insert(signature, merged);
    }

    /// An own override whose exact signature is not in the view.
    fn narrow_override(&mut self, info: &mut TypeInfo, incoming: MethodInfo) {
        let ns = self.ns;
        let name = ns.name_str(incoming.signature.name);
        let candidates: Vec<Signature> = info
            .methods_named(incoming.signature.name)
            .filter(|m| {
                m.is_static == incoming.is_static
                    && m.signature.arity() == incoming.signature.arity()
            })
            .map(|m| m.signature.clone())
            .collect();
        let mut matches = Vec::new();
        for base in candidates {
            if self.substitutable(&incoming.signature, &base) {
                matches.push(base);
            }
        }

        match matches.as_slice() {
            [] => {
                self.conflict(
                    info,
                    ErrorCode::E2004,
                    name,
                    "no contributed method has a compatible signature".to_owned(),
                );
                Self::insert_method(info, incoming);
            }
            [base] => {
                if let Some(capped) = info.methods.get_mut(base) {
                    capped.capped_by = Some(incoming.signature.clone());
                    let inherited = capped.identities.clone();
                    let mut merged = incoming;
                    merged.identities.extend(inherited);
                    Self::insert_method(info, merged);
                }
            }
            several => {
                let count = several.len();
                self.conflict(
                    info,
                    ErrorCode::E2006,
                    name,
                    format!("substitutable for {count} contributed methods"),
                );
                Self::insert_method(info, incoming);
            }
        }
    }

    fn insert_method(info: &mut TypeInfo, method: MethodInfo) {
        let signature = method.signature.clone();
        info.methods_by_name
            .entry(signature.name)
            .or_default()
            .push(signature.clone());
        info.methods.insert(signature, method);
    }

    /// Whether a method with signature `sub` can stand in for `base`:
    /// parameters contravariant, returns covariant.
    pub(crate) fn substitutable(&mut self, sub: &Signature, base: &Signature) -> bool {
        if sub.name != base.name || sub.arity() != base.arity() {
            return false;
        }
        let params_ok = sub
            .params
            .iter()
            .zip(&base.params)
            .all(|(&s, &b)| s == b || self.assignable(s, b).is_fit());
        params_ok
            && sub
                .returns
                .iter()
                .zip(&base.returns)
                .all(|(&s, &b)| s == b || self.assignable(b, s).is_fit())
    }
}
