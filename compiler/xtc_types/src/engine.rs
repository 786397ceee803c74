//! The type engine: every pass over a pool runs through here.
//!
//! `TypeEngine` borrows the pool mutably (passes intern new nodes and fill
//! memo tables) and the namespace immutably. Resolution, relation, synthesis
//! and validation are separate `impl TypeEngine` blocks in their modules.
//!
//! # Usage
//!
//! ```text
//! let mut pool = Pool::new();
//! let mut engine = TypeEngine::new(&mut pool, &registry);
//!
//! let expanded = engine.resolve_typedefs(ty);
//! if engine.is_a(expanded, base) { ... }
//! let diagnostics = engine.take_diagnostics();
//! ```

use rustc_hash::{FxHashMap, FxHashSet};
use xtc_diagnostic::{Diagnostic, ErrorCode};
use xtc_ir::{ClassFormat, ClassId};
use xtc_stack::{DepthGuard, DepthToken};

use crate::{ClassDecl, Idx, Namespace, Pool, TypeData};

/// Pass driver over one pool and namespace.
pub struct TypeEngine<'a> {
    pub(crate) pool: &'a mut Pool,
    pub(crate) ns: &'a dyn Namespace,
    /// Accumulated diagnostics (passes keep going after errors).
    diagnostics: Vec<Diagnostic>,
    depth: DepthGuard,
    /// Relation pairs being computed.
    pub(crate) relating: FxHashSet<(Idx, Idx)>,
    /// Relation re-entries seen so far; results computed across a re-entry
    /// are provisional and are not memoized.
    pub(crate) reentries: u64,
    /// Left sides and right classes whose contributions are being walked.
    pub(crate) walking: FxHashSet<(Idx, ClassId)>,
    /// Nodes whose effective view is being synthesized, with the number of
    /// relation queries open when the build started.
    pub(crate) building: FxHashMap<Idx, usize>,
    /// Relation checks that saw an incomplete view; results that depend on
    /// one are not memoized.
    pub(crate) partial_views: u64,
}

impl<'a> TypeEngine<'a> {
    pub fn new(pool: &'a mut Pool, ns: &'a dyn Namespace) -> Self {
        let depth = DepthGuard::new(pool.config().max_depth);
        TypeEngine {
            pool,
            ns,
            diagnostics: Vec::new(),
            depth,
            relating: FxHashSet::default(),
            reentries: 0,
            walking: FxHashSet::default(),
            building: FxHashMap::default(),
            partial_views: 0,
        }
    }

    #[inline]
    pub fn pool(&self) -> &Pool {
        self.pool
    }

    #[inline]
    pub fn pool_mut(&mut self) -> &mut Pool {
        self.pool
    }

    #[inline]
    pub fn namespace(&self) -> &'a dyn Namespace {
        self.ns
    }

    /// Take accumulated diagnostics, leaving an empty vector.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    #[inline]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[inline]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        tracing::trace!(code = %diagnostic.code, message = %diagnostic.message, "type diagnostic");
        self.diagnostics.push(diagnostic);
    }

    /// Render a node for messages.
    pub fn render(&self, idx: Idx) -> String {
        self.pool.format_type(idx, self.ns)
    }

    /// Enter one level of recursive work, reporting `E3001` at the limit.
    pub(crate) fn enter(&mut self, subject: Idx) -> Option<DepthToken> {
        match self.depth.enter() {
            Ok(token) => Some(token),
            Err(exceeded) => {
                tracing::warn!(?subject, limit = exceeded.limit, "type recursion limit reached");
                let rendered = self.render(subject);
                self.report(
                    Diagnostic::error(ErrorCode::E3001)
                        .with_message(format!(
                            "recursion limit of {} reached while resolving `{rendered}`",
                            exceeded.limit
                        ))
                        .with_subject(rendered),
                );
                None
            }
        }
    }

    // === Namespace helpers ===

    #[inline]
    pub(crate) fn class_decl(&self, class: ClassId) -> &'a ClassDecl {
        let ns = self.ns;
        ns.class(class)
    }

    pub(crate) fn format_of(&mut self, idx: Idx) -> Option<ClassFormat> {
        self.class_of(idx).map(|class| self.ns.class(class).format)
    }

    /// The class that defines `idx`, looking through modifiers, aliases,
    /// bound placeholders and formal constraints.
    pub fn class_of(&mut self, idx: Idx) -> Option<ClassId> {
        let limit = self.pool.config().max_depth;
        self.class_of_bounded(idx, limit)
    }

    fn class_of_bounded(&mut self, idx: Idx, hops: u32) -> Option<ClassId> {
        if idx.is_sentinel() || hops == 0 {
            return None;
        }
        let head = self.pool.deref(self.pool.head(self.pool.deref(idx)));
        match self.pool.data(head).clone() {
            TypeData::Class(class) | TypeData::ThisClass(class) => Some(class),
            TypeData::InnerChild { class, .. } | TypeData::AnonymousClass { class, .. } => {
                Some(class)
            }
            TypeData::VirtualChild { parent, name } => {
                let parent = self.class_of_bounded(parent, hops - 1)?;
                self.find_child(parent, name)
            }
            TypeData::Typedef(_) => {
                let expanded = self.resolve_typedefs(head);
                if expanded == head {
                    None
                } else {
                    self.class_of_bounded(expanded, hops - 1)
                }
            }
            TypeData::Recursive(typedef) => {
                let ns = self.ns;
                let target = ns.typedef(typedef).target;
                self.class_of_bounded(target, hops - 1)
            }
            TypeData::PropertyClass { parent, property } => {
                let ty = self.property_type(parent, property)?;
                self.class_of_bounded(ty, hops - 1)
            }
            TypeData::Generic { .. }
            | TypeData::TypeParam { .. }
            | TypeData::FormalChild { .. }
            | TypeData::DynamicFormal { .. } => {
                let constraint = self.constraint(head);
                if constraint == head {
                    None
                } else {
                    self.class_of_bounded(constraint, hops - 1)
                }
            }
            TypeData::Union(..)
            | TypeData::Intersection(..)
            | TypeData::Difference(..)
            | TypeData::Unresolved(_) => None,
            TypeData::Access { .. }
            | TypeData::Immutable(_)
            | TypeData::Service(_)
            | TypeData::Parameterized { .. }
            | TypeData::Annotated { .. } => None,
        }
    }

    /// Find child class `name` declared by `class` or anything it
    /// contributes from.
    pub(crate) fn find_child(&mut self, class: ClassId, name: xtc_ir::Name) -> Option<ClassId> {
        let mut seen = FxHashSet::default();
        let mut queue = vec![class];
        while let Some(next) = queue.pop() {
            if !seen.insert(next) {
                continue;
            }
            let decl = self.class_decl(next);
            if let Some(child) = decl.child(name) {
                return Some(child);
            }
            for contribution in &decl.contributions {
                if let Some(base) = self.class_of(contribution.ty) {
                    queue.push(base);
                }
            }
        }
        None
    }

    /// Whether every value of `idx` is immutable: an immutable wrapper, an
    /// immutable class format, or a virtual child of an immutable parent.
    pub fn is_immutable(&mut self, idx: Idx) -> bool {
        if idx.is_sentinel() {
            return false;
        }
        let idx = self.pool.deref(idx);
        if self.pool.is_immutability_specified(idx) {
            return true;
        }
        let head = self.pool.head(idx);
        match self.pool.data(head).clone() {
            TypeData::VirtualChild { parent, .. } if self.is_immutable(parent) => true,
            TypeData::Union(a, b) => self.is_immutable(a) && self.is_immutable(b),
            TypeData::Intersection(a, b) => self.is_immutable(a) || self.is_immutable(b),
            TypeData::Difference(a, _) => self.is_immutable(a),
            _ => self
                .format_of(head)
                .is_some_and(ClassFormat::is_immutable),
        }
    }

    /// Whether values of `idx` are service references.
    pub fn is_service(&mut self, idx: Idx) -> bool {
        if idx.is_sentinel() {
            return false;
        }
        let idx = self.pool.deref(idx);
        self.pool.is_service_specified(idx)
            || self.format_of(idx).is_some_and(ClassFormat::is_service)
    }

    /// The type a class declares for itself: parameterized by its own
    /// formals, and nested in its parent's declaration type for virtual
    /// children.
    pub fn declaration_type(&mut self, class: ClassId) -> Idx {
        let decl = self.class_decl(class);
        let base = match decl.parent {
            Some(parent) if decl.is_virtual_child => {
                let parent = self.declaration_type(parent);
                self.pool.virtual_child(parent, decl.name)
            }
            _ => self.pool.class_type(class),
        };
        if decl.type_params.is_empty() {
            return base;
        }
        let formals: Vec<Idx> = decl
            .type_params
            .iter()
            .map(|tp| self.pool.generic(class, tp.name))
            .collect();
        self.pool.parameterized(base, &formals)
    }
}
