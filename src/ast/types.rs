//! Type system definitions for the AST.
//!
//! The language has three value types plus nominal class types. Object
//! types are compared by class name; `None` is the only value shared by
//! every object type.

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Bool,
    None,
    Object(String),
}

impl Type {
    /// Resolves a source annotation. Any name other than the builtin ones
    /// refers to a class, which the type checker verifies exists.
    pub fn from_annotation(name: &str) -> Type {
        match name {
            "int" => Type::Int,
            "bool" => Type::Bool,
            "None" => Type::None,
            _ => Type::Object(name.to_string()),
        }
    }

    /// `self` may be used wherever `other` is expected.
    pub fn is_assignable_to(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::None, Type::Object(_)) => true,
            (Type::Object(a), Type::Object(b)) => a == b,
            (a, b) => a == b,
        }
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::Object(name) => Some(name),
            _ => None,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "bool"),
            Type::None => write!(f, "<None>"),
            Type::Object(name) => write!(f, "{}", name),
        }
    }
}
