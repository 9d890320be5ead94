//! AST (Abstract Syntax Tree) module.
//!
//! Every node carries an annotation slot `a`. The parser produces trees
//! annotated with `()`, the type checker produces trees annotated with
//! [`types::Type`].
//!
//! Submodules:
//! - ast: Node wrappers (`Expr<A>`, `Stmt<A>`) and annotation erasure
//! - expressions: Expression kinds and operators
//! - statements: Statement kinds, function and field declarations
//! - types: The source-level type representation
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
