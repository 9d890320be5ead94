//! Code generation module for the compiler.
//!
//! This module lowers the typed AST to WebAssembly text. It handles:
//!
//! - The tagged value convention shared with the executor
//! - Compilation of expressions and statements
//! - Heap allocation of objects and field access
//! - Assembly of the final module with its host imports

pub mod compiler;
pub mod expr;
pub mod runtime;
pub mod stmt;

#[cfg(test)]
mod tests;
