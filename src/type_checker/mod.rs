//! Type checking and semantic analysis module.
//!
//! This module performs type checking and semantic analysis on the AST.
//! It transforms the untyped AST into a typed AST while:
//!
//! - Collecting function signatures and class tables up front
//! - Verifying type correctness of expressions and statements
//! - Resolving variables, free calls, constructions, fields and methods
//! - Managing copy-on-descend scopes
//!
//! Type errors are fatal: the first one found is returned.

pub mod type_checker;
pub mod typed_ast;

#[cfg(test)]
mod tests;
