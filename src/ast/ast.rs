use crate::Span;

use super::{
    expressions::ExprKind,
    statements::{FieldDecl, FunDef, StmtKind},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Expr<A> {
    pub a: A,
    pub span: Span,
    pub kind: ExprKind<A>,
}

impl Expr<()> {
    pub fn new(kind: ExprKind<()>, span: Span) -> Self {
        Expr { a: (), span, kind }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt<A> {
    pub a: A,
    pub span: Span,
    pub kind: StmtKind<A>,
}

impl Stmt<()> {
    pub fn new(kind: StmtKind<()>, span: Span) -> Self {
        Stmt { a: (), span, kind }
    }
}

pub type Program<A> = Vec<Stmt<A>>;

/// Drops every annotation, turning a checked tree back into parser output.
pub fn erase<A>(program: &[Stmt<A>]) -> Program<()> {
    program.iter().map(Stmt::erase).collect()
}

impl<A> Expr<A> {
    pub fn erase(&self) -> Expr<()> {
        let kind = match &self.kind {
            ExprKind::Number(value) => ExprKind::Number(*value),
            ExprKind::True => ExprKind::True,
            ExprKind::False => ExprKind::False,
            ExprKind::None => ExprKind::None,
            ExprKind::Id { name, .. } => ExprKind::Id {
                name: name.clone(),
                global: false,
            },
            ExprKind::Unary { op, operand } => ExprKind::Unary {
                op: *op,
                operand: Box::new(operand.erase()),
            },
            ExprKind::Binary { op, lhs, rhs } => ExprKind::Binary {
                op: *op,
                lhs: Box::new(lhs.erase()),
                rhs: Box::new(rhs.erase()),
            },
            ExprKind::Call { name, args } => ExprKind::Call {
                name: name.clone(),
                args: args.iter().map(Expr::erase).collect(),
            },
            ExprKind::Field { object, field } => ExprKind::Field {
                object: Box::new(object.erase()),
                field: field.clone(),
            },
            ExprKind::MethodCall {
                object,
                method,
                args,
            } => ExprKind::MethodCall {
                object: Box::new(object.erase()),
                method: method.clone(),
                args: args.iter().map(Expr::erase).collect(),
            },
            // Constructions are written as calls.
            ExprKind::Construct { class } => ExprKind::Call {
                name: class.clone(),
                args: vec![],
            },
        };

        Expr::new(kind, self.span.clone())
    }
}

impl<A> Stmt<A> {
    pub fn erase(&self) -> Stmt<()> {
        let kind = match &self.kind {
            StmtKind::Assign { target, value } => StmtKind::Assign {
                target: target.erase(),
                value: value.erase(),
            },
            StmtKind::VarInit { name, typ, init } => StmtKind::VarInit {
                name: name.clone(),
                typ: typ.clone(),
                init: init.erase(),
            },
            StmtKind::Expr(expr) => StmtKind::Expr(expr.erase()),
            StmtKind::Pass => StmtKind::Pass,
            StmtKind::While { cond, body } => StmtKind::While {
                cond: cond.erase(),
                body: erase(body),
            },
            StmtKind::If {
                cond,
                body,
                elifs,
                else_body,
            } => StmtKind::If {
                cond: cond.erase(),
                body: erase(body),
                elifs: elifs
                    .iter()
                    .map(|(cond, body)| (cond.erase(), erase(body)))
                    .collect(),
                else_body: erase(else_body),
            },
            StmtKind::Define(def) => StmtKind::Define(def.erase()),
            StmtKind::Class {
                name,
                fields,
                methods,
            } => StmtKind::Class {
                name: name.clone(),
                fields: fields.iter().map(FieldDecl::erase).collect(),
                methods: methods.iter().map(FunDef::erase).collect(),
            },
            StmtKind::Return(value) => StmtKind::Return(value.erase()),
        };

        Stmt::new(kind, self.span.clone())
    }
}

impl<A> FunDef<A> {
    pub fn erase(&self) -> FunDef<()> {
        FunDef {
            name: self.name.clone(),
            params: self.params.clone(),
            ret: self.ret.clone(),
            body: erase(&self.body),
            span: self.span.clone(),
        }
    }
}

impl<A> FieldDecl<A> {
    pub fn erase(&self) -> FieldDecl<()> {
        FieldDecl {
            name: self.name.clone(),
            typ: self.typ.clone(),
            init: self.init.erase(),
            span: self.span.clone(),
        }
    }
}
