//! Declaration records.

use xtc_ir::{Access, ClassFormat, ClassId, MethodId, Name, TypedefId, Variance};

use crate::Idx;

/// A declared type parameter of a class or method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParamDecl {
    pub name: Name,
    pub constraint: Idx,
    pub variance: Variance,
}

/// How a contribution joins its class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContributionKind {
    Extends,
    Implements,
    Incorporates,
    Annotation,
}

impl ContributionKind {
    /// Layering order: bases first, then interfaces, mixins, annotations.
    pub(crate) const fn layer_rank(self) -> u8 {
        match self {
            ContributionKind::Extends => 0,
            ContributionKind::Implements => 1,
            ContributionKind::Incorporates => 2,
            ContributionKind::Annotation => 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contribution {
    pub kind: ContributionKind,
    pub ty: Idx,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyDecl {
    pub name: Name,
    pub ty: Idx,
    pub access: Access,
    pub is_static: bool,
    pub is_override: bool,
}

impl PropertyDecl {
    pub fn new(name: Name, ty: Idx) -> Self {
        PropertyDecl {
            name,
            ty,
            access: Access::Public,
            is_static: false,
            is_override: false,
        }
    }

    pub fn set_access(&mut self, access: Access) -> &mut Self {
        self.access = access;
        self
    }

    pub fn set_static(&mut self) -> &mut Self {
        self.is_static = true;
        self
    }

    pub fn set_override(&mut self) -> &mut Self {
        self.is_override = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDecl {
    pub id: MethodId,
    pub owner: ClassId,
    pub name: Name,
    pub type_params: Vec<TypeParamDecl>,
    pub params: Vec<Idx>,
    pub returns: Vec<Idx>,
    pub access: Access,
    pub is_static: bool,
    pub is_override: bool,
}

impl MethodDecl {
    pub fn new(
        id: MethodId,
        owner: ClassId,
        name: Name,
        params: Vec<Idx>,
        returns: Vec<Idx>,
    ) -> Self {
        MethodDecl {
            id,
            owner,
            name,
            type_params: Vec::new(),
            params,
            returns,
            access: Access::Public,
            is_static: false,
            is_override: false,
        }
    }

    pub fn set_access(&mut self, access: Access) -> &mut Self {
        self.access = access;
        self
    }

    pub fn set_static(&mut self) -> &mut Self {
        self.is_static = true;
        self
    }

    pub fn set_override(&mut self) -> &mut Self {
        self.is_override = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedefDecl {
    pub id: TypedefId,
    pub name: Name,
    pub owner: Option<ClassId>,
    /// `Idx::NONE` until defined.
    pub target: Idx,
}

impl TypedefDecl {
    pub fn is_defined(&self) -> bool {
        !self.target.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDecl {
    pub id: ClassId,
    pub name: Name,
    pub format: ClassFormat,
    /// Enclosing class for nested declarations.
    pub parent: Option<ClassId>,
    pub is_virtual_child: bool,
    pub is_anonymous: bool,
    pub type_params: Vec<TypeParamDecl>,
    pub contributions: Vec<Contribution>,
    pub properties: Vec<PropertyDecl>,
    pub methods: Vec<MethodId>,
    pub children: Vec<(Name, ClassId)>,
    pub typedefs: Vec<(Name, TypedefId)>,
}

impl ClassDecl {
    pub fn new(id: ClassId, name: Name, format: ClassFormat, parent: Option<ClassId>) -> Self {
        ClassDecl {
            id,
            name,
            format,
            parent,
            is_virtual_child: false,
            is_anonymous: false,
            type_params: Vec::new(),
            contributions: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            children: Vec::new(),
            typedefs: Vec::new(),
        }
    }

    /// Position and declaration of the type parameter called `name`.
    pub fn type_param(&self, name: Name) -> Option<(usize, &TypeParamDecl)> {
        self.type_params
            .iter()
            .enumerate()
            .find(|(_, tp)| tp.name == name)
    }

    pub fn child(&self, name: Name) -> Option<ClassId> {
        self.children
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, id)| *id)
    }

    pub fn typedef_named(&self, name: Name) -> Option<TypedefId> {
        self.typedefs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, id)| *id)
    }

    pub fn property(&self, name: Name) -> Option<&PropertyDecl> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Contributions sorted into layering order, stable within a kind.
    pub fn layered_contributions(&self) -> Vec<&Contribution> {
        let mut out: Vec<&Contribution> = self.contributions.iter().collect();
        out.sort_by_key(|c| c.kind.layer_rank());
        out
    }
}
