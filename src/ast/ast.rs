//! Top-level declarations and the handles used to refer to them.
//!
//! A parsed file is a [`Program`]: its `using` directives plus the functions
//! and classes it declares. Those vectors double as arenas, so other parts of
//! the front-end refer to declarations by [`FnId`] / [`ClassId`] rather than
//! by reference.

use std::fmt::Display;

use crate::Span;

use super::{expressions::Expr, statements::Block, types::Type};

/// Identifies one expression node. Unique across every file parsed in a
/// process, so type tables of merged modules never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Index of a function in its module's `Program::functions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FnId(pub usize);

/// Index of a class in its module's `Program::classes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(pub usize);

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub usings: Vec<Using>,
    pub functions: Vec<FnDecl>,
    pub classes: Vec<ClassDecl>,
}

impl Program {
    pub fn function(&self, id: FnId) -> &FnDecl {
        &self.functions[id.0]
    }

    pub fn class(&self, id: ClassId) -> &ClassDecl {
        &self.classes[id.0]
    }

    pub fn find_function(&self, name: &str) -> Option<FnId> {
        self.functions.iter().position(|f| f.name == name).map(FnId)
    }

    pub fn find_class(&self, name: &str) -> Option<ClassId> {
        self.classes.iter().position(|c| c.name == name).map(ClassId)
    }
}

/// `using a.b.c;`
#[derive(Debug, Clone)]
pub struct Using {
    pub path: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FnDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub body: Block,
    pub is_public: bool,
    pub is_static: bool,
    pub name_span: Span,
    pub span: Span,
}

impl FnDecl {
    /// The function's signature as a value type.
    pub fn signature(&self) -> Type {
        Type::Function {
            params: self.params.iter().map(|p| p.ty.clone()).collect(),
            ret: Box::new(self.return_type.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub ty: Type,
    pub initializer: Option<Expr>,
    pub is_public: bool,
    pub is_static: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<FnDecl>,
    pub is_public: bool,
    pub name_span: Span,
    pub span: Span,
}

/// A class member found by name.
#[derive(Debug, Clone, Copy)]
pub enum Member<'a> {
    Field(&'a FieldDecl),
    Method(&'a FnDecl),
}

impl ClassDecl {
    pub fn member(&self, name: &str) -> Option<Member<'_>> {
        if let Some(field) = self.fields.iter().find(|f| f.name == name) {
            return Some(Member::Field(field));
        }

        self.methods
            .iter()
            .find(|m| m.name == name)
            .map(Member::Method)
    }
}

impl Member<'_> {
    pub fn is_public(&self) -> bool {
        match self {
            Member::Field(field) => field.is_public,
            Member::Method(method) => method.is_public,
        }
    }

    pub fn is_static(&self) -> bool {
        match self {
            Member::Field(field) => field.is_static,
            Member::Method(method) => method.is_static,
        }
    }

    pub fn ty(&self) -> Type {
        match self {
            Member::Field(field) => field.ty.clone(),
            Member::Method(method) => method.signature(),
        }
    }
}
