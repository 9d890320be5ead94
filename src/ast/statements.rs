use crate::Span;

use super::{
    ast::{Expr, Stmt},
    types::Type,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub typ: Type,
    /// Whether the annotation was written out. Only `self` may omit it.
    pub annotated: bool,
}

/// A free function or a method. Method bodies see `self` as their first
/// parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct FunDef<A> {
    pub name: String,
    pub params: Vec<Parameter>,
    pub ret: Type,
    pub body: Vec<Stmt<A>>,
    pub span: Span,
}

/// `name: type = init` inside a class body.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl<A> {
    pub name: String,
    pub typ: Type,
    pub init: Expr<A>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind<A> {
    /// The target is validated by the type checker, which only accepts
    /// identifiers and field accesses.
    Assign {
        target: Expr<A>,
        value: Expr<A>,
    },
    VarInit {
        name: String,
        typ: Type,
        init: Expr<A>,
    },
    Expr(Expr<A>),
    Pass,
    While {
        cond: Expr<A>,
        body: Vec<Stmt<A>>,
    },
    If {
        cond: Expr<A>,
        body: Vec<Stmt<A>>,
        elifs: Vec<(Expr<A>, Vec<Stmt<A>>)>,
        else_body: Vec<Stmt<A>>,
    },
    Define(FunDef<A>),
    Class {
        name: String,
        fields: Vec<FieldDecl<A>>,
        methods: Vec<FunDef<A>>,
    },
    Return(Expr<A>),
}

impl<A> StmtKind<A> {
    /// Short human-readable name used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            StmtKind::Assign { .. } => "assignment",
            StmtKind::VarInit { .. } => "variable declaration",
            StmtKind::Expr(_) => "expression",
            StmtKind::Pass => "pass",
            StmtKind::While { .. } => "while",
            StmtKind::If { .. } => "if",
            StmtKind::Define(_) => "def",
            StmtKind::Class { .. } => "class",
            StmtKind::Return(_) => "return",
        }
    }
}
