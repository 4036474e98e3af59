//! Expression nodes.
//!
//! Every expression carries a [`NodeId`] so later passes can attach facts
//! (resolved bindings, computed types) without mutating the tree.

use std::fmt::Display;

use crate::Span;

use super::{
    ast::{NodeId, Param},
    statements::Block,
    types::Type,
};

#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    /// `$"Hello {name}!"`
    Interpolated(Vec<InterpolationPart>),
    Ident(String),
    This,
    NoneLit,
    Some(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Member {
        object: Box<Expr>,
        member: String,
        member_span: Span,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    New {
        class: String,
        class_span: Span,
        args: Vec<Expr>,
    },
    Array(Vec<Expr>),
    Lambda {
        params: Vec<Param>,
        return_type: Type,
        body: Block,
    },
}

#[derive(Debug, Clone)]
pub enum InterpolationPart {
    Text(String),
    Hole(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Less
                | BinaryOp::LessEq
                | BinaryOp::Greater
                | BinaryOp::GreaterEq
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEq => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        };
        write!(f, "{}", symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

impl Expr {
    /// Name of the function a call expression targets, for diagnostics.
    pub fn callee_name(&self) -> String {
        match &self.kind {
            ExprKind::Ident(name) => name.clone(),
            ExprKind::Member { member, .. } => member.clone(),
            _ => String::from("<expression>"),
        }
    }
}
