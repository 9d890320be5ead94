use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use crate::{
    ast::{
        ast::{Expr, Stmt},
        expressions::{ExprKind, UnaryOp},
        statements::{FieldDecl, FunDef, StmtKind},
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::typed_ast::{TypedExpr, TypedFieldDecl, TypedFunDef, TypedProgram, TypedStmt};

/// Smallest and largest integers representable as a tagged value.
pub const MIN_INT: i64 = -(1 << 29);
pub const MAX_INT: i64 = (1 << 29) - 1;

/// Name of the builtin output function.
pub const PRINT: &str = "print";

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSig {
    pub params: Vec<Type>,
    pub ret: Type,
}

/// Field and method tables of one class. Method signatures exclude `self`.
#[derive(Debug, Clone, Default)]
pub struct ClassInfo {
    pub fields: HashMap<String, Type>,
    pub methods: HashMap<String, FunctionSig>,
}

pub type FunctionTable = HashMap<String, FunctionSig>;
pub type ClassTable = HashMap<String, ClassInfo>;

#[derive(Debug, Clone)]
pub struct Environment {
    bindings: HashMap<String, (Type, bool)>,
    declared: HashSet<String>,
    is_global: bool,
}

impl Environment {
    /// The module-level scope. Names declared here are globals.
    pub fn global() -> Self {
        Environment {
            bindings: HashMap::new(),
            declared: HashSet::new(),
            is_global: true,
        }
    }

    /// Scope for a function body: sees every enclosing binding, declares
    /// into a fresh set so outer names may be shadowed.
    pub fn descend(&self) -> Self {
        Environment {
            bindings: self.bindings.clone(),
            declared: HashSet::new(),
            is_global: false,
        }
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.declared.contains(name)
    }

    pub fn declare(&mut self, name: &str, typ: Type, position: Position) -> Result<(), Error> {
        if !self.declared.insert(name.to_string()) {
            return Err(Error::new(
                ErrorImpl::VariableAlreadyDeclared {
                    variable: name.to_string(),
                },
                position,
            ));
        }

        self.bindings
            .insert(name.to_string(), (typ, self.is_global));
        Ok(())
    }

    /// Returns the binding's type and whether it is a global.
    pub fn lookup(&self, name: &str) -> Option<&(Type, bool)> {
        self.bindings.get(name)
    }
}

fn validate_type(typ: &Type, classes: &ClassTable, position: &Position) -> Result<(), Error> {
    match typ {
        Type::Object(name) if !classes.contains_key(name) => Err(Error::new(
            ErrorImpl::UnknownType {
                type_: name.clone(),
            },
            position.clone(),
        )),
        _ => Ok(()),
    }
}

fn check_literal(value: i64, position: &Position) -> Result<(), Error> {
    if (MIN_INT..=MAX_INT).contains(&value) {
        Ok(())
    } else {
        Err(Error::new(
            ErrorImpl::IntegerLiteralOutOfRange { value },
            position.clone(),
        ))
    }
}

fn expect_operand(operator: &str, expected: &Type, operand: &TypedExpr) -> Result<(), Error> {
    if operand.get_type() == expected {
        Ok(())
    } else {
        Err(Error::new(
            ErrorImpl::OperandTypeMatchError {
                operator: operator.to_string(),
                expected: expected.to_string(),
                received: operand.get_type().to_string(),
            },
            operand.span.start.clone(),
        ))
    }
}

fn expect_condition(cond: &TypedExpr) -> Result<(), Error> {
    if *cond.get_type() == Type::Bool {
        Ok(())
    } else {
        Err(Error::new(
            ErrorImpl::ConditionTypeMatchError {
                received: cond.get_type().to_string(),
            },
            cond.span.start.clone(),
        ))
    }
}

/// Checks call arguments against parameter types. Arguments must match
/// their parameter type exactly.
fn check_args(
    call: &Expr<()>,
    args: &[Expr<()>],
    params: &[Type],
    functions: &FunctionTable,
    scope: &Environment,
    classes: &ClassTable,
    current_class: Option<&str>,
) -> Result<Vec<TypedExpr>, Error> {
    if args.len() > params.len() {
        return Err(Error::new(
            ErrorImpl::UnexpectedArguments {
                expected: params.len(),
                received: args.len(),
            },
            args[params.len()].span.start.clone(),
        ));
    } else if args.len() < params.len() {
        return Err(Error::new(
            ErrorImpl::MissingArguments {
                expected: params.len(),
                received: args.len(),
            },
            call.span.end.clone(),
        ));
    }

    args.iter()
        .zip(params)
        .enumerate()
        .map(|(i, (arg, param))| {
            let typed = check_expr(arg, functions, scope, classes, current_class)?;
            if typed.get_type() != param {
                return Err(Error::new(
                    ErrorImpl::ArgumentTypeMatchError {
                        position: i + 1,
                        expected: param.to_string(),
                        received: typed.get_type().to_string(),
                    },
                    arg.span.start.clone(),
                ));
            }
            Ok(typed)
        })
        .collect()
}

/// Resolves the class of a receiver expression.
fn receiver_class<'a>(
    object: &TypedExpr,
    classes: &'a ClassTable,
) -> Result<(&'a str, &'a ClassInfo), Error> {
    let not_an_object = || {
        Error::new(
            ErrorImpl::NotAnObject {
                type_: object.get_type().to_string(),
            },
            object.span.start.clone(),
        )
    };

    let name = object.get_type().class_name().ok_or_else(not_an_object)?;
    classes
        .get_key_value(name)
        .map(|(name, info)| (name.as_str(), info))
        .ok_or_else(|| {
            Error::new(
                ErrorImpl::ClassNotDeclared {
                    class: name.to_string(),
                },
                object.span.start.clone(),
            )
        })
}

pub fn check_expr(
    expr: &Expr<()>,
    functions: &FunctionTable,
    scope: &Environment,
    classes: &ClassTable,
    current_class: Option<&str>,
) -> Result<TypedExpr, Error> {
    let position = &expr.span.start;
    let typed = |a: Type, kind: ExprKind<Type>| -> Result<TypedExpr, Error> {
        Ok(Expr {
            a,
            span: expr.span.clone(),
            kind,
        })
    };

    match &expr.kind {
        ExprKind::Number(value) => {
            check_literal(*value, position)?;
            typed(Type::Int, ExprKind::Number(*value))
        }
        ExprKind::True => typed(Type::Bool, ExprKind::True),
        ExprKind::False => typed(Type::Bool, ExprKind::False),
        ExprKind::None => typed(Type::None, ExprKind::None),
        ExprKind::Id { name, .. } => {
            // `self` always names the receiver inside a class.
            if let (Some(class), "self") = (current_class, name.as_str()) {
                return typed(
                    Type::Object(class.to_string()),
                    ExprKind::Id {
                        name: name.clone(),
                        global: false,
                    },
                );
            }

            match scope.lookup(name) {
                Some((typ, global)) => typed(
                    typ.clone(),
                    ExprKind::Id {
                        name: name.clone(),
                        global: *global,
                    },
                ),
                None => Err(Error::new(
                    ErrorImpl::VariableNotDeclared {
                        variable: name.clone(),
                    },
                    position.clone(),
                )),
            }
        }
        ExprKind::Unary { op, operand } => {
            let typed_operand = match (op, &operand.kind) {
                // A negated literal is range-checked with its sign.
                (UnaryOp::Neg, ExprKind::Number(value)) => {
                    check_literal(-value, position)?;
                    Expr {
                        a: Type::Int,
                        span: operand.span.clone(),
                        kind: ExprKind::Number(*value),
                    }
                }
                _ => check_expr(operand, functions, scope, classes, current_class)?,
            };

            let result = match op {
                UnaryOp::Not => Type::Bool,
                UnaryOp::Neg => Type::Int,
            };
            expect_operand(op.symbol(), &result, &typed_operand)?;

            typed(
                result,
                ExprKind::Unary {
                    op: *op,
                    operand: Box::new(typed_operand),
                },
            )
        }
        ExprKind::Binary { op, lhs, rhs } => {
            let typed_lhs = check_expr(lhs, functions, scope, classes, current_class)?;
            let typed_rhs = check_expr(rhs, functions, scope, classes, current_class)?;

            let result = if op.is_arithmetic() || op.is_comparison() {
                expect_operand(op.symbol(), &Type::Int, &typed_lhs)?;
                expect_operand(op.symbol(), &Type::Int, &typed_rhs)?;
                if op.is_arithmetic() {
                    Type::Int
                } else {
                    Type::Bool
                }
            } else {
                // `is`, `and`, `or` accept any operands.
                Type::Bool
            };

            typed(
                result,
                ExprKind::Binary {
                    op: *op,
                    lhs: Box::new(typed_lhs),
                    rhs: Box::new(typed_rhs),
                },
            )
        }
        ExprKind::Call { name, args } => {
            if name == PRINT {
                let typed_args = if args.len() == 1 {
                    vec![check_expr(&args[0], functions, scope, classes, current_class)?]
                } else if args.len() > 1 {
                    return Err(Error::new(
                        ErrorImpl::UnexpectedArguments {
                            expected: 1,
                            received: args.len(),
                        },
                        args[1].span.start.clone(),
                    ));
                } else {
                    return Err(Error::new(
                        ErrorImpl::MissingArguments {
                            expected: 1,
                            received: 0,
                        },
                        expr.span.end.clone(),
                    ));
                };

                return typed(
                    Type::None,
                    ExprKind::Call {
                        name: name.clone(),
                        args: typed_args,
                    },
                );
            }

            if let Some(sig) = functions.get(name) {
                let typed_args =
                    check_args(expr, args, &sig.params, functions, scope, classes, current_class)?;
                return typed(
                    sig.ret.clone(),
                    ExprKind::Call {
                        name: name.clone(),
                        args: typed_args,
                    },
                );
            }

            if classes.contains_key(name) {
                if !args.is_empty() {
                    return Err(Error::new(
                        ErrorImpl::UnexpectedArguments {
                            expected: 0,
                            received: args.len(),
                        },
                        args[0].span.start.clone(),
                    ));
                }
                trace!("call to `{}` is a construction", name);
                return typed(
                    Type::Object(name.clone()),
                    ExprKind::Construct {
                        class: name.clone(),
                    },
                );
            }

            Err(Error::new(
                ErrorImpl::FunctionNotDeclared {
                    function: name.clone(),
                },
                position.clone(),
            ))
        }
        // Parsed sources only hold calls. Constructions come from re-checking
        // an erased typed tree.
        ExprKind::Construct { class } => {
            if !classes.contains_key(class) {
                return Err(Error::new(
                    ErrorImpl::ClassNotDeclared {
                        class: class.clone(),
                    },
                    position.clone(),
                ));
            }
            typed(
                Type::Object(class.clone()),
                ExprKind::Construct {
                    class: class.clone(),
                },
            )
        }
        ExprKind::Field { object, field } => {
            let typed_object = check_expr(object, functions, scope, classes, current_class)?;
            let (class, info) = receiver_class(&typed_object, classes)?;

            let field_type = info.fields.get(field).cloned().ok_or_else(|| {
                Error::new(
                    ErrorImpl::FieldNotDeclared {
                        class: class.to_string(),
                        field: field.clone(),
                    },
                    position.clone(),
                )
            })?;

            typed(
                field_type,
                ExprKind::Field {
                    object: Box::new(typed_object),
                    field: field.clone(),
                },
            )
        }
        ExprKind::MethodCall {
            object,
            method,
            args,
        } => {
            let typed_object = check_expr(object, functions, scope, classes, current_class)?;
            let (class, info) = receiver_class(&typed_object, classes)?;

            let sig = info.methods.get(method).ok_or_else(|| {
                Error::new(
                    ErrorImpl::MethodNotDeclared {
                        class: class.to_string(),
                        method: method.clone(),
                    },
                    position.clone(),
                )
            })?;

            let typed_args =
                check_args(expr, args, &sig.params, functions, scope, classes, current_class)?;

            typed(
                sig.ret.clone(),
                ExprKind::MethodCall {
                    object: Box::new(typed_object),
                    method: method.clone(),
                    args: typed_args,
                },
            )
        }
    }
}

/// Checks the body of a `while`, `if`, `elif` or `else`. Definitions are
/// only allowed at module level and in class bodies.
fn check_body(
    body: &[Stmt<()>],
    functions: &FunctionTable,
    scope: &mut Environment,
    classes: &ClassTable,
    current_class: Option<&str>,
    expected_return: Option<&Type>,
) -> Result<Vec<TypedStmt>, Error> {
    body.iter()
        .map(|stmt| {
            if let StmtKind::Define(_) | StmtKind::Class { .. } = stmt.kind {
                return Err(Error::new(
                    ErrorImpl::UnsupportedStatement {
                        statement: format!("nested {}", stmt.kind.describe()),
                    },
                    stmt.span.start.clone(),
                ));
            }
            check_stmt(stmt, functions, scope, classes, current_class, expected_return)
        })
        .collect()
}

/// Whether every path through `body` ends in a `return`.
fn always_returns<A>(body: &[Stmt<A>]) -> bool {
    body.iter().any(|stmt| match &stmt.kind {
        StmtKind::Return(_) => true,
        StmtKind::If {
            body,
            elifs,
            else_body,
            ..
        } => {
            always_returns(body)
                && elifs.iter().all(|(_, body)| always_returns(body))
                && always_returns(else_body)
        }
        _ => false,
    })
}

fn check_fun_def(
    def: &FunDef<()>,
    functions: &FunctionTable,
    scope: &Environment,
    classes: &ClassTable,
    current_class: Option<&str>,
) -> Result<TypedFunDef, Error> {
    let position = &def.span.start;
    let mut body_scope = scope.descend();

    // The receiver of a method is resolved through `current_class`.
    let skip = usize::from(current_class.is_some());
    for param in def.params.iter() {
        validate_type(&param.typ, classes, position)?;
    }
    for param in def.params.iter().skip(skip) {
        body_scope.declare(&param.name, param.typ.clone(), position.clone())?;
    }
    validate_type(&def.ret, classes, position)?;

    let body = def
        .body
        .iter()
        .map(|stmt| {
            check_stmt(
                stmt,
                functions,
                &mut body_scope,
                classes,
                current_class,
                Some(&def.ret),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    if def.ret != Type::None && !always_returns(&body) {
        return Err(Error::new(
            ErrorImpl::MissingReturn {
                function: def.name.clone(),
            },
            position.clone(),
        ));
    }

    Ok(FunDef {
        name: def.name.clone(),
        params: def.params.clone(),
        ret: def.ret.clone(),
        body,
        span: def.span.clone(),
    })
}

fn check_field(
    field: &FieldDecl<()>,
    functions: &FunctionTable,
    scope: &Environment,
    classes: &ClassTable,
    class: &str,
) -> Result<TypedFieldDecl, Error> {
    validate_type(&field.typ, classes, &field.span.start)?;

    let init = check_expr(&field.init, functions, scope, classes, Some(class))?;
    if *init.get_type() != field.typ {
        return Err(Error::new(
            ErrorImpl::TypeMatchError {
                expected: field.typ.to_string(),
                received: init.get_type().to_string(),
            },
            field.init.span.start.clone(),
        ));
    }

    Ok(FieldDecl {
        name: field.name.clone(),
        typ: field.typ.clone(),
        init,
        span: field.span.clone(),
    })
}

/// Checks one statement. `expected_return` is `None` at module level.
pub fn check_stmt(
    stmt: &Stmt<()>,
    functions: &FunctionTable,
    scope: &mut Environment,
    classes: &ClassTable,
    current_class: Option<&str>,
    expected_return: Option<&Type>,
) -> Result<TypedStmt, Error> {
    let position = &stmt.span.start;
    let typed = |a: Type, kind: StmtKind<Type>| -> Result<TypedStmt, Error> {
        Ok(Stmt {
            a,
            span: stmt.span.clone(),
            kind,
        })
    };

    match &stmt.kind {
        StmtKind::VarInit { name, typ, init } => {
            if scope.is_declared(name) || (current_class.is_some() && name == "self") {
                return Err(Error::new(
                    ErrorImpl::VariableAlreadyDeclared {
                        variable: name.clone(),
                    },
                    position.clone(),
                ));
            }
            validate_type(typ, classes, position)?;

            let typed_init = check_expr(init, functions, scope, classes, current_class)?;
            if typed_init.get_type() != typ {
                return Err(Error::new(
                    ErrorImpl::TypeMatchError {
                        expected: typ.to_string(),
                        received: typed_init.get_type().to_string(),
                    },
                    init.span.start.clone(),
                ));
            }

            scope.declare(name, typ.clone(), position.clone())?;
            typed(
                Type::None,
                StmtKind::VarInit {
                    name: name.clone(),
                    typ: typ.clone(),
                    init: typed_init,
                },
            )
        }
        StmtKind::Assign { target, value } => {
            let typed_value = check_expr(value, functions, scope, classes, current_class)?;

            if !matches!(target.kind, ExprKind::Id { .. } | ExprKind::Field { .. }) {
                return Err(Error::new(
                    ErrorImpl::InvalidAssignmentTarget,
                    target.span.start.clone(),
                ));
            }
            let typed_target = check_expr(target, functions, scope, classes, current_class)?;

            if !typed_value
                .get_type()
                .is_assignable_to(typed_target.get_type())
            {
                return Err(Error::new(
                    ErrorImpl::TypeMatchError {
                        expected: typed_target.get_type().to_string(),
                        received: typed_value.get_type().to_string(),
                    },
                    value.span.start.clone(),
                ));
            }

            typed(
                Type::None,
                StmtKind::Assign {
                    target: typed_target,
                    value: typed_value,
                },
            )
        }
        StmtKind::Expr(expr) => {
            let typed_expr = check_expr(expr, functions, scope, classes, current_class)?;
            typed(typed_expr.get_type().clone(), StmtKind::Expr(typed_expr))
        }
        StmtKind::Pass => typed(Type::None, StmtKind::Pass),
        StmtKind::While { cond, body } => {
            let typed_cond = check_expr(cond, functions, scope, classes, current_class)?;
            expect_condition(&typed_cond)?;
            let typed_body =
                check_body(body, functions, scope, classes, current_class, expected_return)?;

            typed(
                Type::None,
                StmtKind::While {
                    cond: typed_cond,
                    body: typed_body,
                },
            )
        }
        StmtKind::If {
            cond,
            body,
            elifs,
            else_body,
        } => {
            let typed_cond = check_expr(cond, functions, scope, classes, current_class)?;
            expect_condition(&typed_cond)?;
            let typed_body =
                check_body(body, functions, scope, classes, current_class, expected_return)?;

            let mut typed_elifs = Vec::with_capacity(elifs.len());
            for (elif_cond, elif_body) in elifs {
                let typed_elif_cond =
                    check_expr(elif_cond, functions, scope, classes, current_class)?;
                expect_condition(&typed_elif_cond)?;
                let typed_elif_body = check_body(
                    elif_body,
                    functions,
                    scope,
                    classes,
                    current_class,
                    expected_return,
                )?;
                typed_elifs.push((typed_elif_cond, typed_elif_body));
            }

            let typed_else =
                check_body(else_body, functions, scope, classes, current_class, expected_return)?;

            typed(
                Type::None,
                StmtKind::If {
                    cond: typed_cond,
                    body: typed_body,
                    elifs: typed_elifs,
                    else_body: typed_else,
                },
            )
        }
        StmtKind::Define(def) => {
            if expected_return.is_some() || current_class.is_some() {
                return Err(Error::new(
                    ErrorImpl::UnsupportedStatement {
                        statement: String::from("def inside a function"),
                    },
                    position.clone(),
                ));
            }

            let typed_def = check_fun_def(def, functions, scope, classes, None)?;
            typed(Type::None, StmtKind::Define(typed_def))
        }
        StmtKind::Class {
            name,
            fields,
            methods,
        } => {
            if expected_return.is_some() || current_class.is_some() {
                return Err(Error::new(
                    ErrorImpl::UnsupportedStatement {
                        statement: String::from("class inside a function"),
                    },
                    position.clone(),
                ));
            }

            let typed_fields = fields
                .iter()
                .map(|field| check_field(field, functions, scope, classes, name))
                .collect::<Result<Vec<_>, _>>()?;

            let typed_methods = methods
                .iter()
                .map(|method| {
                    check_fun_def(method, functions, scope, classes, Some(name.as_str()))
                })
                .collect::<Result<Vec<_>, _>>()?;

            typed(
                Type::None,
                StmtKind::Class {
                    name: name.clone(),
                    fields: typed_fields,
                    methods: typed_methods,
                },
            )
        }
        StmtKind::Return(value) => {
            let expected = expected_return.ok_or_else(|| {
                Error::new(ErrorImpl::ReturnOutsideFunction, position.clone())
            })?;

            let typed_value = check_expr(value, functions, scope, classes, current_class)?;
            if typed_value.get_type() != expected {
                return Err(Error::new(
                    ErrorImpl::ReturnTypeMatchError {
                        expected: expected.to_string(),
                        received: typed_value.get_type().to_string(),
                    },
                    value.span.start.clone(),
                ));
            }

            typed(typed_value.get_type().clone(), StmtKind::Return(typed_value))
        }
    }
}

fn signature_of(def: &FunDef<()>) -> FunctionSig {
    FunctionSig {
        params: def.params.iter().map(|param| param.typ.clone()).collect(),
        ret: def.ret.clone(),
    }
}

fn collect_class(
    name: &str,
    fields: &[FieldDecl<()>],
    methods: &[FunDef<()>],
) -> Result<ClassInfo, Error> {
    let mut info = ClassInfo::default();

    for field in fields {
        if info
            .fields
            .insert(field.name.clone(), field.typ.clone())
            .is_some()
        {
            return Err(Error::new(
                ErrorImpl::FieldAlreadyDeclared {
                    class: name.to_string(),
                    field: field.name.clone(),
                },
                field.span.start.clone(),
            ));
        }
    }

    for method in methods {
        let receiver = Type::Object(name.to_string());
        match method.params.first() {
            Some(param) if param.name == "self" && param.typ == receiver => {}
            _ => {
                return Err(Error::new(
                    ErrorImpl::MissingSelfParameter {
                        class: name.to_string(),
                        method: method.name.clone(),
                    },
                    method.span.start.clone(),
                ))
            }
        }

        let mut sig = signature_of(method);
        sig.params.remove(0);

        if info.methods.insert(method.name.clone(), sig).is_some() {
            return Err(Error::new(
                ErrorImpl::MethodAlreadyDeclared {
                    class: name.to_string(),
                    method: method.name.clone(),
                },
                method.span.start.clone(),
            ));
        }
    }

    Ok(info)
}

/// Builds the function-signature table and the class table from the
/// module-level definitions.
pub fn collect_declarations(program: &[Stmt<()>]) -> Result<(FunctionTable, ClassTable), Error> {
    let mut functions = FunctionTable::new();
    let mut classes = ClassTable::new();

    for stmt in program {
        match &stmt.kind {
            StmtKind::Define(def) => {
                if def.name == PRINT || functions.contains_key(&def.name) {
                    return Err(Error::new(
                        ErrorImpl::FunctionAlreadyDeclared {
                            function: def.name.clone(),
                        },
                        stmt.span.start.clone(),
                    ));
                }
                functions.insert(def.name.clone(), signature_of(def));
            }
            StmtKind::Class {
                name,
                fields,
                methods,
            } => {
                let builtin = matches!(name.as_str(), "int" | "bool" | "None" | "object");
                if builtin || classes.contains_key(name) {
                    return Err(Error::new(
                        ErrorImpl::ClassAlreadyDeclared {
                            class: name.clone(),
                        },
                        stmt.span.start.clone(),
                    ));
                }
                classes.insert(name.clone(), collect_class(name, fields, methods)?);
            }
            _ => {}
        }
    }

    Ok((functions, classes))
}

pub fn check_program(program: &[Stmt<()>]) -> Result<TypedProgram, Error> {
    let (functions, classes) = collect_declarations(program)?;
    debug!(
        "collected {} functions and {} classes",
        functions.len(),
        classes.len()
    );

    let mut scope = Environment::global();
    let typed = program
        .iter()
        .map(|stmt| check_stmt(stmt, &functions, &mut scope, &classes, None, None))
        .collect::<Result<TypedProgram, Error>>()?;

    check_construction_cycles(&typed)?;
    Ok(typed)
}

type ConstructionGraph<'a> = HashMap<&'a str, Vec<(&'a str, &'a Position)>>;

/// Collects every class constructed inside `expr`, with its position.
fn constructions<'a>(expr: &'a TypedExpr, found: &mut Vec<(&'a str, &'a Position)>) {
    match &expr.kind {
        ExprKind::Construct { class } => found.push((class.as_str(), &expr.span.start)),
        ExprKind::Unary { operand, .. } => constructions(operand, found),
        ExprKind::Binary { lhs, rhs, .. } => {
            constructions(lhs, found);
            constructions(rhs, found);
        }
        ExprKind::Call { args, .. } => args.iter().for_each(|arg| constructions(arg, found)),
        ExprKind::Field { object, .. } => constructions(object, found),
        ExprKind::MethodCall { object, args, .. } => {
            constructions(object, found);
            args.iter().for_each(|arg| constructions(arg, found));
        }
        ExprKind::Number(_)
        | ExprKind::True
        | ExprKind::False
        | ExprKind::None
        | ExprKind::Id { .. } => {}
    }
}

fn reaches<'a>(
    graph: &ConstructionGraph<'a>,
    from: &'a str,
    target: &str,
    visited: &mut HashSet<&'a str>,
) -> bool {
    if from == target {
        return true;
    }
    if !visited.insert(from) {
        return false;
    }

    graph.get(from).map_or(false, |edges| {
        edges
            .iter()
            .any(|&(next, _)| reaches(graph, next, target, visited))
    })
}

/// Field initializers run on every construction, so a class whose
/// initializers end up constructing the class again can never be built.
fn check_construction_cycles(program: &[TypedStmt]) -> Result<(), Error> {
    let mut order = vec![];
    let mut graph = ConstructionGraph::new();

    for stmt in program {
        if let StmtKind::Class { name, fields, .. } = &stmt.kind {
            let mut found = vec![];
            for field in fields {
                constructions(&field.init, &mut found);
            }
            order.push(name.as_str());
            graph.insert(name.as_str(), found);
        }
    }

    for class in order {
        for &(constructed, position) in &graph[class] {
            if reaches(&graph, constructed, class, &mut HashSet::new()) {
                return Err(Error::new(
                    ErrorImpl::RecursiveConstruction {
                        class: class.to_string(),
                    },
                    position.clone(),
                ));
            }
        }
    }

    Ok(())
}
