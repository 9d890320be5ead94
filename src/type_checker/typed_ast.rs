//! Typed AST aliases.
//!
//! The checked tree reuses the parser's node types with every annotation
//! slot holding the node's resolved [`Type`].

use crate::ast::{
    ast::{Expr, Stmt},
    statements::{FieldDecl, FunDef},
    types::Type,
};

pub type TypedExpr = Expr<Type>;
pub type TypedStmt = Stmt<Type>;
pub type TypedFunDef = FunDef<Type>;
pub type TypedFieldDecl = FieldDecl<Type>;
pub type TypedProgram = Vec<TypedStmt>;

impl Expr<Type> {
    pub fn get_type(&self) -> &Type {
        &self.a
    }
}

impl Stmt<Type> {
    pub fn get_type(&self) -> &Type {
        &self.a
    }
}
