use std::fmt::Display;

use thiserror::Error;

use crate::Position;

/// Broad category of an error, used by the driver to decide how to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Raised by the lexer or the parser.
    Syntax,
    /// Raised by the type checker.
    Type,
    /// Raised by the code generator when the typed tree breaks an invariant
    /// the type checker is supposed to guarantee.
    Internal,
    /// Raised while executing a compiled module.
    Runtime,
}

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_kind(&self) -> ErrorKind {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. }
            | ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::UnexpectedTokenDetailed { .. }
            | ErrorImpl::NumberParseError { .. }
            | ErrorImpl::IndentationError { .. } => ErrorKind::Syntax,
            ErrorImpl::CodegenInvariant { .. } => ErrorKind::Internal,
            ErrorImpl::RuntimeError { .. } => ErrorKind::Runtime,
            _ => ErrorKind::Type,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::IndentationError { .. } => "IndentationError",
            ErrorImpl::VariableAlreadyDeclared { .. } => "VariableAlreadyDeclared",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::FunctionAlreadyDeclared { .. } => "FunctionAlreadyDeclared",
            ErrorImpl::FunctionNotDeclared { .. } => "FunctionNotDeclared",
            ErrorImpl::ClassAlreadyDeclared { .. } => "ClassAlreadyDeclared",
            ErrorImpl::ClassNotDeclared { .. } => "ClassNotDeclared",
            ErrorImpl::FieldAlreadyDeclared { .. } => "FieldAlreadyDeclared",
            ErrorImpl::FieldNotDeclared { .. } => "FieldNotDeclared",
            ErrorImpl::MethodAlreadyDeclared { .. } => "MethodAlreadyDeclared",
            ErrorImpl::MethodNotDeclared { .. } => "MethodNotDeclared",
            ErrorImpl::MissingSelfParameter { .. } => "MissingSelfParameter",
            ErrorImpl::UnexpectedArguments { .. } => "UnexpectedArguments",
            ErrorImpl::MissingArguments { .. } => "MissingArguments",
            ErrorImpl::ArgumentTypeMatchError { .. } => "ArgumentTypeMatchError",
            ErrorImpl::OperandTypeMatchError { .. } => "OperandTypeMatchError",
            ErrorImpl::ConditionTypeMatchError { .. } => "ConditionTypeMatchError",
            ErrorImpl::ReturnTypeMatchError { .. } => "ReturnTypeMatchError",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::NotAnObject { .. } => "NotAnObject",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::InvalidAssignmentTarget => "InvalidAssignmentTarget",
            ErrorImpl::ReturnOutsideFunction => "ReturnOutsideFunction",
            ErrorImpl::MissingReturn { .. } => "MissingReturn",
            ErrorImpl::UnsupportedStatement { .. } => "UnsupportedStatement",
            ErrorImpl::IntegerLiteralOutOfRange { .. } => "IntegerLiteralOutOfRange",
            ErrorImpl::RecursiveConstruction { .. } => "RecursiveConstruction",
            ErrorImpl::CodegenInvariant { .. } => "CodegenInvariant",
            ErrorImpl::RuntimeError { .. } => "RuntimeError",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a newline or a colon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::IndentationError { message } => ErrorTip::Suggestion(message.clone()),
            ErrorImpl::VariableAlreadyDeclared { variable } => ErrorTip::Suggestion(format!(
                "Variable `{}` already declared in this scope",
                variable
            )),
            ErrorImpl::VariableNotDeclared { variable } => {
                ErrorTip::Suggestion(format!("Variable `{}` not declared", variable))
            }
            ErrorImpl::FunctionAlreadyDeclared { function } => {
                ErrorTip::Suggestion(format!("Function `{}` already declared", function))
            }
            ErrorImpl::FunctionNotDeclared { function } => {
                ErrorTip::Suggestion(format!("Function `{}` not declared", function))
            }
            ErrorImpl::ClassAlreadyDeclared { class } => {
                ErrorTip::Suggestion(format!("Class `{}` already declared", class))
            }
            ErrorImpl::ClassNotDeclared { class } => {
                ErrorTip::Suggestion(format!("Class `{}` not declared", class))
            }
            ErrorImpl::FieldAlreadyDeclared { class, field } => ErrorTip::Suggestion(format!(
                "Field `{}` already declared in class `{}`",
                field, class
            )),
            ErrorImpl::FieldNotDeclared { class, field } => ErrorTip::Suggestion(format!(
                "Class `{}` has no field `{}`",
                class, field
            )),
            ErrorImpl::MethodAlreadyDeclared { class, method } => ErrorTip::Suggestion(format!(
                "Method `{}` already declared in class `{}`",
                method, class
            )),
            ErrorImpl::MethodNotDeclared { class, method } => ErrorTip::Suggestion(format!(
                "Class `{}` has no method `{}`",
                class, method
            )),
            ErrorImpl::MissingSelfParameter { class, method } => ErrorTip::Suggestion(format!(
                "Method `{}` of class `{}` must take `self` as its first parameter",
                method, class
            )),
            ErrorImpl::UnexpectedArguments { expected, received }
            | ErrorImpl::MissingArguments { expected, received } => ErrorTip::Suggestion(format!(
                "Expected {} arguments, received {}",
                expected, received
            )),
            ErrorImpl::ArgumentTypeMatchError {
                position,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "Expected argument {} to be `{}`, received `{}`",
                position, expected, received
            )),
            ErrorImpl::OperandTypeMatchError {
                operator,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "Operator `{}` expects `{}` operands, received `{}`",
                operator, expected, received
            )),
            ErrorImpl::ConditionTypeMatchError { received } => ErrorTip::Suggestion(format!(
                "Conditions must be `bool`, received `{}`",
                received
            )),
            ErrorImpl::ReturnTypeMatchError { expected, received } => ErrorTip::Suggestion(
                format!("Expected return type `{}`, received `{}`", expected, received),
            ),
            ErrorImpl::TypeMatchError { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::NotAnObject { type_ } => ErrorTip::Suggestion(format!(
                "Only objects have fields and methods, found `{}`",
                type_
            )),
            ErrorImpl::UnknownType { type_ } => {
                ErrorTip::Suggestion(format!("Unknown type `{}` found", type_))
            }
            ErrorImpl::InvalidAssignmentTarget => ErrorTip::Suggestion(String::from(
                "Only variables and fields can be assigned to",
            )),
            ErrorImpl::ReturnOutsideFunction => {
                ErrorTip::Suggestion(String::from("`return` is only allowed inside a function"))
            }
            ErrorImpl::MissingReturn { function } => ErrorTip::Suggestion(format!(
                "Function `{}` does not return a value on every path",
                function
            )),
            ErrorImpl::UnsupportedStatement { statement } => {
                ErrorTip::Suggestion(format!("`{}` is not allowed here", statement))
            }
            ErrorImpl::IntegerLiteralOutOfRange { value } => ErrorTip::Suggestion(format!(
                "Integer literal `{}` does not fit in 30 bits",
                value
            )),
            ErrorImpl::RecursiveConstruction { class } => ErrorTip::Suggestion(format!(
                "Field initializers of class `{}` end up constructing `{}` again",
                class, class
            )),
            ErrorImpl::CodegenInvariant { message } => ErrorTip::Suggestion(format!(
                "Internal compiler error: {}",
                message
            )),
            ErrorImpl::RuntimeError { message } => ErrorTip::Suggestion(message.clone()),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.get_error_name(), self.internal_error)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("indentation error: {message}")]
    IndentationError { message: String },
    #[error("variable {variable:?} already declared")]
    VariableAlreadyDeclared { variable: String },
    #[error("variable {variable:?} not declared")]
    VariableNotDeclared { variable: String },
    #[error("function {function:?} already declared")]
    FunctionAlreadyDeclared { function: String },
    #[error("function {function:?} not declared")]
    FunctionNotDeclared { function: String },
    #[error("class {class:?} already declared")]
    ClassAlreadyDeclared { class: String },
    #[error("class {class:?} not declared")]
    ClassNotDeclared { class: String },
    #[error("field {field:?} already declared in class {class:?}")]
    FieldAlreadyDeclared { class: String, field: String },
    #[error("class {class:?} has no field {field:?}")]
    FieldNotDeclared { class: String, field: String },
    #[error("method {method:?} already declared in class {class:?}")]
    MethodAlreadyDeclared { class: String, method: String },
    #[error("class {class:?} has no method {method:?}")]
    MethodNotDeclared { class: String, method: String },
    #[error("method {method:?} of class {class:?} is missing its self parameter")]
    MissingSelfParameter { class: String, method: String },
    #[error("unexpected arguments: expected {expected:?}, received {received:?}")]
    UnexpectedArguments { expected: usize, received: usize },
    #[error("missing arguments: expected {expected:?}, received {received:?}")]
    MissingArguments { expected: usize, received: usize },
    #[error("argument {position} type does not match: expected {expected}, received {received}")]
    ArgumentTypeMatchError {
        position: usize,
        expected: String,
        received: String,
    },
    #[error("operand types do not match for {operator:?}: expected {expected}, received {received}")]
    OperandTypeMatchError {
        operator: String,
        expected: String,
        received: String,
    },
    #[error("condition must be bool, received {received}")]
    ConditionTypeMatchError { received: String },
    #[error("return type does not match: expected {expected}, received {received}")]
    ReturnTypeMatchError { expected: String, received: String },
    #[error("types do not match: expected {expected}, received {received}")]
    TypeMatchError { expected: String, received: String },
    #[error("{type_} is not an object type")]
    NotAnObject { type_: String },
    #[error("unknown type {type_} found")]
    UnknownType { type_: String },
    #[error("invalid assignment target")]
    InvalidAssignmentTarget,
    #[error("return statement outside of function")]
    ReturnOutsideFunction,
    #[error("function {function:?} does not always return")]
    MissingReturn { function: String },
    #[error("unsupported statement: {statement}")]
    UnsupportedStatement { statement: String },
    #[error("integer literal {value} out of range")]
    IntegerLiteralOutOfRange { value: i64 },
    #[error("class {class:?} is constructed by its own field initializers")]
    RecursiveConstruction { class: String },
    #[error("code generation invariant broken: {message}")]
    CodegenInvariant { message: String },
    #[error("runtime error: {message}")]
    RuntimeError { message: String },
}
