use crate::lexer::tokens::TokenKind;

use super::ast::Expr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::Neg => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    FloorDiv,
    Mod,
    Eq,
    Ne,
    Le,
    Ge,
    Lt,
    Gt,
    Is,
    And,
    Or,
}

impl BinaryOp {
    pub fn from_token(kind: TokenKind) -> Option<BinaryOp> {
        let op = match kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Dash => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::SlashSlash => BinaryOp::FloorDiv,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::Equals => BinaryOp::Eq,
            TokenKind::NotEquals => BinaryOp::Ne,
            TokenKind::LessEquals => BinaryOp::Le,
            TokenKind::GreaterEquals => BinaryOp::Ge,
            TokenKind::Less => BinaryOp::Lt,
            TokenKind::Greater => BinaryOp::Gt,
            TokenKind::Is => BinaryOp::Is,
            TokenKind::And => BinaryOp::And,
            TokenKind::Or => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Is => "is",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::FloorDiv | BinaryOp::Mod
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Le | BinaryOp::Ge | BinaryOp::Lt | BinaryOp::Gt
        )
    }
}

/// Expression kinds.
///
/// `Construct` is never produced by the parser: a call to a class name is
/// parsed as `Call` and rewritten by the type checker.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind<A> {
    Number(i64),
    True,
    False,
    None,
    /// `global` is set by the type checker when the name resolved to a
    /// module-level binding.
    Id {
        name: String,
        global: bool,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr<A>>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr<A>>,
        rhs: Box<Expr<A>>,
    },
    Call {
        name: String,
        args: Vec<Expr<A>>,
    },
    Field {
        object: Box<Expr<A>>,
        field: String,
    },
    MethodCall {
        object: Box<Expr<A>>,
        method: String,
        args: Vec<Expr<A>>,
    },
    Construct {
        class: String,
    },
}
