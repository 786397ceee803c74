//! Declaration namespace.
//!
//! The type passes never own declarations; they ask a [`Namespace`] what a
//! `ClassId` declares (format, type parameters, contributions, members,
//! children). [`Registry`] is the in-memory implementation hosts build up
//! alongside a [`Pool`](crate::Pool): declaration types are `Idx` handles into
//! that pool.
//!
//! Editing a registry after types were queried requires
//! [`Pool::invalidate`](crate::Pool::invalidate).

use xtc_ir::{ClassFormat, ClassId, MethodId, Name, StringInterner, TypedefId, Variance};

use crate::Idx;

mod decl;

pub use decl::{
    ClassDecl, Contribution, ContributionKind, MethodDecl, PropertyDecl, TypeParamDecl,
    TypedefDecl,
};

/// Read access to declarations, consumed by every pass.
pub trait Namespace {
    fn class(&self, id: ClassId) -> &ClassDecl;

    fn typedef(&self, id: TypedefId) -> &TypedefDecl;

    fn method(&self, id: MethodId) -> &MethodDecl;

    /// Resolve a declaration or member name.
    fn name_str(&self, name: Name) -> &str;
}

/// Growable in-memory namespace.
///
/// `Object` is always `ClassId::OBJECT`.
pub struct Registry {
    names: StringInterner,
    classes: Vec<ClassDecl>,
    typedefs: Vec<TypedefDecl>,
    methods: Vec<MethodDecl>,
}

impl Registry {
    pub fn new() -> Self {
        let mut registry = Registry {
            names: StringInterner::new(),
            classes: Vec::new(),
            typedefs: Vec::new(),
            methods: Vec::new(),
        };
        let object = registry.declare_class("Object", ClassFormat::Class);
        debug_assert_eq!(object, ClassId::OBJECT);
        registry
    }

    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.names.intern(s)
    }

    pub fn names(&self) -> &StringInterner {
        &self.names
    }

    fn next_id(len: usize) -> u32 {
        u32::try_from(len).unwrap_or_else(|_| panic!("namespace exceeded u32::MAX declarations"))
    }

    /// Declare a top-level class.
    pub fn declare_class(&mut self, name: &str, format: ClassFormat) -> ClassId {
        let id = ClassId::from_raw(Self::next_id(self.classes.len()));
        let name = self.intern(name);
        self.classes.push(ClassDecl::new(id, name, format, None));
        id
    }

    /// Declare a class nested in `parent`.
    ///
    /// Virtual children are re-bound in every subclass of the parent and are
    /// named through `VirtualChild` types; the others through `InnerChild`.
    pub fn declare_child(
        &mut self,
        parent: ClassId,
        name: &str,
        format: ClassFormat,
        is_virtual: bool,
    ) -> ClassId {
        let id = ClassId::from_raw(Self::next_id(self.classes.len()));
        let name = self.intern(name);
        let mut decl = ClassDecl::new(id, name, format, Some(parent));
        decl.is_virtual_child = is_virtual;
        self.classes.push(decl);
        self.classes[parent.index()].children.push((name, id));
        id
    }

    /// Declare an anonymous class inside `parent`.
    pub fn declare_anonymous(&mut self, parent: ClassId, base: Idx) -> ClassId {
        let id = ClassId::from_raw(Self::next_id(self.classes.len()));
        let name = self.intern(&format!("{}:anon#{}", self.name_of(parent), id.raw()));
        let mut decl = ClassDecl::new(id, name, ClassFormat::Class, Some(parent));
        decl.is_anonymous = true;
        decl.contributions.push(Contribution {
            kind: ContributionKind::Extends,
            ty: base,
        });
        self.classes.push(decl);
        id
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut ClassDecl {
        &mut self.classes[id.index()]
    }

    fn name_of(&self, class: ClassId) -> &'static str {
        self.names.lookup(self.classes[class.index()].name)
    }

    /// Find a top-level class by name.
    pub fn find_class(&self, name: &str) -> Option<ClassId> {
        let name = self.names.get(name)?;
        self.classes
            .iter()
            .find(|c| c.name == name && c.parent.is_none())
            .map(|c| c.id)
    }

    /// Add a class type parameter; returns its name.
    pub fn add_type_param(
        &mut self,
        class: ClassId,
        name: &str,
        constraint: Idx,
        variance: Variance,
    ) -> Name {
        let name = self.intern(name);
        self.classes[class.index()]
            .type_params
            .push(TypeParamDecl {
                name,
                constraint,
                variance,
            });
        name
    }

    pub fn add_contribution(&mut self, class: ClassId, kind: ContributionKind, ty: Idx) {
        self.classes[class.index()]
            .contributions
            .push(Contribution { kind, ty });
    }

    /// Add a public instance property.
    pub fn add_property(&mut self, class: ClassId, name: &str, ty: Idx) -> &mut PropertyDecl {
        let name = self.intern(name);
        let props = &mut self.classes[class.index()].properties;
        props.push(PropertyDecl::new(name, ty));
        let last = props.len() - 1;
        &mut props[last]
    }

    /// Add a public instance method.
    pub fn add_method(
        &mut self,
        class: ClassId,
        name: &str,
        params: &[Idx],
        returns: &[Idx],
    ) -> MethodId {
        let id = MethodId::from_raw(Self::next_id(self.methods.len()));
        let name = self.intern(name);
        self.methods
            .push(MethodDecl::new(id, class, name, params.to_vec(), returns.to_vec()));
        self.classes[class.index()].methods.push(id);
        id
    }

    pub fn method_mut(&mut self, id: MethodId) -> &mut MethodDecl {
        &mut self.methods[id.index()]
    }

    /// Add a method type parameter; returns its name and register.
    pub fn add_method_type_param(
        &mut self,
        method: MethodId,
        name: &str,
        constraint: Idx,
    ) -> (Name, u32) {
        let name = self.intern(name);
        let params = &mut self.methods[method.index()].type_params;
        let register = Self::next_id(params.len());
        params.push(TypeParamDecl {
            name,
            constraint,
            variance: Variance::Invariant,
        });
        (name, register)
    }

    /// Declare a typedef whose target is supplied later by
    /// [`define_typedef`](Self::define_typedef), so aliases may refer to
    /// themselves.
    pub fn declare_typedef(&mut self, owner: Option<ClassId>, name: &str) -> TypedefId {
        let id = TypedefId::from_raw(Self::next_id(self.typedefs.len()));
        let name = self.intern(name);
        self.typedefs.push(TypedefDecl {
            id,
            name,
            owner,
            target: Idx::NONE,
        });
        if let Some(owner) = owner {
            self.classes[owner.index()].typedefs.push((name, id));
        }
        id
    }

    pub fn define_typedef(&mut self, id: TypedefId, target: Idx) {
        assert!(!target.is_sentinel(), "typedef target must be a real type");
        self.typedefs[id.index()].target = target;
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Namespace for Registry {
    fn class(&self, id: ClassId) -> &ClassDecl {
        &self.classes[id.index()]
    }

    fn typedef(&self, id: TypedefId) -> &TypedefDecl {
        &self.typedefs[id.index()]
    }

    fn method(&self, id: MethodId) -> &MethodDecl {
        &self.methods[id.index()]
    }

    fn name_str(&self, name: Name) -> &str {
        self.names.lookup(name)
    }
}
