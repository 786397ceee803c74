//! Effective views: the flattened member set of a type.
//!
//! [`TypeEngine::type_info`] synthesizes a [`TypeInfo`] by layering a
//! class's contributions base-first (extends, implements, incorporates),
//! then its own members, then class annotations, then any `Annotated`
//! modifier on the node itself. Members are keyed by identity: properties by
//! name with the set of declaring classes, methods by [`Signature`] with the
//! set of declaring methods. See [`merge`] for collision rules.
//!
//! # Access
//!
//! The view of `T:private` holds every member; the view of `T` (public)
//! and `T:protected` are restrictions of it. A `T:struct` view keeps
//! properties only.
//!
//! # Caching
//!
//! Complete views are memoized per generation and shared as `Arc`s.
//! A node that still contains unbound placeholders gets an `Incomplete`
//! view that is never cached.

mod build;
mod merge;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use smallvec::SmallVec;
use xtc_diagnostic::{Diagnostic, ErrorCode};
use xtc_ir::{Access, ClassFormat, ClassId, MethodId, Name, Variance};

use crate::{Contribution, Idx, TypeEngine};

/// Whether a view has every member it should.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Progress {
    Complete,
    /// Some input was not ready (placeholder, circular contribution, depth
    /// limit); members may be missing.
    Incomplete,
}

/// A type parameter as the view sees it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamInfo {
    pub name: Name,
    pub actual: Idx,
    pub constraint: Idx,
    pub variance: Variance,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyInfo {
    pub name: Name,
    pub ty: Idx,
    pub access: Access,
    pub is_static: bool,
    pub is_override: bool,
    /// Classes that declare this property.
    pub identities: BTreeSet<ClassId>,
    /// The last declaring class.
    pub head: ClassId,
}

/// Method identity within a view: name plus resolved parameter and return
/// types.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature {
    pub name: Name,
    pub params: SmallVec<[Idx; 4]>,
    pub returns: SmallVec<[Idx; 2]>,
}

impl Signature {
    #[inline]
    pub fn arity(&self) -> (usize, usize) {
        (self.params.len(), self.returns.len())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodInfo {
    pub signature: Signature,
    pub access: Access,
    pub is_static: bool,
    pub is_override: bool,
    /// Method declarations merged into this entry.
    pub identities: BTreeSet<MethodId>,
    /// The last declaration.
    pub head: MethodId,
    /// The narrower override that replaces this method in dispatch.
    pub capped_by: Option<Signature>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChildInfo {
    pub name: Name,
    pub class: ClassId,
    pub is_virtual: bool,
}

/// The flattened view of one type node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeInfo {
    pub ty: Idx,
    pub class: Option<ClassId>,
    pub format: Option<ClassFormat>,
    pub access: Access,
    pub immutable: bool,
    pub service: bool,
    pub type_params: Vec<ParamInfo>,
    pub properties: BTreeMap<Name, PropertyInfo>,
    pub methods: BTreeMap<Signature, MethodInfo>,
    /// Signatures per method name, in layering order.
    pub methods_by_name: BTreeMap<Name, Vec<Signature>>,
    pub children: BTreeMap<Name, ChildInfo>,
    /// Contributions with their types resolved for this node.
    pub contributions: Vec<Contribution>,
    pub annotations: Vec<Idx>,
    pub progress: Progress,
    /// Pool generation the view was built against.
    pub generation: u64,
    /// Problems found while synthesizing this view.
    pub diagnostics: Vec<Diagnostic>,
}

impl TypeInfo {
    pub(crate) fn empty(ty: Idx, generation: u64) -> Self {
        TypeInfo {
            ty,
            class: None,
            format: None,
            access: Access::Public,
            immutable: false,
            service: false,
            type_params: Vec::new(),
            properties: BTreeMap::new(),
            methods: BTreeMap::new(),
            methods_by_name: BTreeMap::new(),
            children: BTreeMap::new(),
            contributions: Vec::new(),
            annotations: Vec::new(),
            progress: Progress::Complete,
            generation,
            diagnostics: Vec::new(),
        }
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.progress == Progress::Complete
    }

    pub fn property(&self, name: Name) -> Option<&PropertyInfo> {
        self.properties.get(&name)
    }

    /// Methods called `name`, in layering order.
    pub fn methods_named(&self, name: Name) -> impl Iterator<Item = &MethodInfo> {
        self.methods_by_name
            .get(&name)
            .into_iter()
            .flatten()
            .filter_map(|sig| self.methods.get(sig))
    }

    pub fn type_param(&self, name: Name) -> Option<&ParamInfo> {
        self.type_params.iter().find(|p| p.name == name)
    }

    /// Keep only members visible through `access`.
    pub(crate) fn restrict(&mut self, access: Access) {
        self.access = access;
        match access {
            Access::Private => {}
            Access::Struct => {
                self.methods.clear();
                self.methods_by_name.clear();
            }
            view => {
                self.properties.retain(|_, p| view.reveals(p.access));
                self.methods.retain(|_, m| view.reveals(m.access));
                let methods = &self.methods;
                for sigs in self.methods_by_name.values_mut() {
                    sigs.retain(|sig| methods.contains_key(sig));
                }
                self.methods_by_name.retain(|_, sigs| !sigs.is_empty());
            }
        }
    }

    pub(crate) fn mark_incomplete(&mut self) {
        self.progress = Progress::Incomplete;
    }
}

impl TypeEngine<'_> {
    /// The effective view of `idx`.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn type_info(&mut self, idx: Idx) -> Arc<TypeInfo> {
        let generation = self.pool.generation();
        if idx.is_sentinel() {
            let mut info = TypeInfo::empty(idx, generation);
            info.mark_incomplete();
            return Arc::new(info);
        }
        if let Some(info) = self.pool.memo().infos.get(&idx) {
            return Arc::clone(info);
        }

        if self.pool.contains_unresolved(idx) {
            let rendered = self.render(idx);
            let diagnostic = Diagnostic::warning(ErrorCode::E2008)
                .with_message(format!("`{rendered}` still refers to unresolved names"))
                .with_subject(rendered);
            let mut info = TypeInfo::empty(idx, generation);
            info.class = self.class_of(idx);
            info.mark_incomplete();
            info.diagnostics.push(diagnostic.clone());
            self.report(diagnostic);
            return Arc::new(info);
        }

        if let Some(&open) = self.building.get(&idx) {
            let mut info = TypeInfo::empty(idx, generation);
            info.class = self.class_of(idx);
            info.mark_incomplete();
            if self.relating.len() > open {
                // A relation query asked for the view it is helping to build.
                self.partial_views += 1;
                return Arc::new(info);
            }
            let rendered = self.render(idx);
            let diagnostic = Diagnostic::error(ErrorCode::E2005)
                .with_message(format!("`{rendered}` contributes to itself"))
                .with_subject(rendered);
            info.diagnostics.push(diagnostic.clone());
            self.report(diagnostic);
            return Arc::new(info);
        }
        self.building.insert(idx, self.relating.len());
        let Some(level) = self.enter(idx) else {
            self.building.remove(&idx);
            let mut info = TypeInfo::empty(idx, generation);
            info.mark_incomplete();
            return Arc::new(info);
        };

        self.pool.stats_mut().type_info_builds += 1;
        let info = xtc_stack::ensure_sufficient_stack(|| self.build_info(idx));
        drop(level);
        self.building.remove(&idx);

        let info = Arc::new(info);
        if info.is_complete() {
            tracing::debug!(
                ?idx,
                properties = info.properties.len(),
                methods = info.methods.len(),
                "effective view built"
            );
            self.pool.memo().infos.insert(idx, Arc::clone(&info));
        }
        info
    }

    /// Resolved type of `property` as seen from `parent`.
    pub fn property_type(&mut self, parent: Idx, property: Name) -> Option<Idx> {
        if parent.is_sentinel() {
            return None;
        }
        let parent = self.pool.strip_access(parent);
        let full = self.pool.access(Access::Private, parent);
        self.type_info(full).property(property).map(|p| p.ty)
    }
}

#[cfg(test)]
mod tests;
