//! Unit tests for the parser module.

use std::rc::Rc;

use super::parser::parse;
use crate::{
    ast::{
        ast::{Expr, Program},
        expressions::{BinaryOp, ExprKind, UnaryOp},
        statements::StmtKind,
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::lexer::tokenize,
};

fn parse_source(source: &str) -> Result<Program<()>, Error> {
    let tokens = tokenize(source.to_string(), Some("test.py".to_string()))?;
    parse(tokens, Rc::new("test.py".to_string()))
}

fn parse_expr_stmt(source: &str) -> Expr<()> {
    let program = parse_source(source).unwrap();
    match &program[0].kind {
        StmtKind::Expr(expr) => expr.clone(),
        other => panic!("expected an expression statement, found {:?}", other),
    }
}

/// Renders an expression with explicit parentheses.
fn show(expr: &Expr<()>) -> String {
    match &expr.kind {
        ExprKind::Number(n) => n.to_string(),
        ExprKind::True => "True".to_string(),
        ExprKind::False => "False".to_string(),
        ExprKind::None => "None".to_string(),
        ExprKind::Id { name, .. } => name.clone(),
        ExprKind::Unary { op, operand } => format!("({} {})", op.symbol(), show(operand)),
        ExprKind::Binary { op, lhs, rhs } => {
            format!("({} {} {})", show(lhs), op.symbol(), show(rhs))
        }
        ExprKind::Call { name, args } => format!(
            "{}({})",
            name,
            args.iter().map(show).collect::<Vec<_>>().join(", ")
        ),
        ExprKind::Field { object, field } => format!("{}.{}", show(object), field),
        ExprKind::MethodCall {
            object,
            method,
            args,
        } => format!(
            "{}.{}({})",
            show(object),
            method,
            args.iter().map(show).collect::<Vec<_>>().join(", ")
        ),
        ExprKind::Construct { class } => format!("{}()", class),
    }
}

#[test]
fn test_parse_variable_declaration() {
    let program = parse_source("x: int = 42\n").unwrap();

    match &program[0].kind {
        StmtKind::VarInit { name, typ, init } => {
            assert_eq!(name, "x");
            assert_eq!(*typ, Type::Int);
            assert_eq!(init.kind, ExprKind::Number(42));
        }
        other => panic!("unexpected statement {:?}", other),
    }
}

#[test]
fn test_parse_object_declaration() {
    let program = parse_source("p: Point = None").unwrap();

    match &program[0].kind {
        StmtKind::VarInit { typ, init, .. } => {
            assert_eq!(*typ, Type::Object("Point".to_string()));
            assert_eq!(init.kind, ExprKind::None);
        }
        other => panic!("unexpected statement {:?}", other),
    }
}

#[test]
fn test_parse_assignment_targets() {
    let program = parse_source("x = 1\np.x = 2\n").unwrap();

    assert!(matches!(
        &program[0].kind,
        StmtKind::Assign { target, .. } if matches!(target.kind, ExprKind::Id { .. })
    ));
    assert!(matches!(
        &program[1].kind,
        StmtKind::Assign { target, .. } if matches!(target.kind, ExprKind::Field { .. })
    ));
}

#[test]
fn test_precedence() {
    assert_eq!(show(&parse_expr_stmt("2 + 3 * 4")), "(2 + (3 * 4))");
    assert_eq!(show(&parse_expr_stmt("1 - 2 - 3")), "((1 - 2) - 3)");
    assert_eq!(show(&parse_expr_stmt("(1 - 2) * 3")), "((1 - 2) * 3)");
    assert_eq!(show(&parse_expr_stmt("-a * b")), "((- a) * b)");
    assert_eq!(
        show(&parse_expr_stmt("a < b and not c == d or e")),
        "(((a < b) and (not (c == d))) or e)"
    );
    assert_eq!(show(&parse_expr_stmt("x is None")), "(x is None)");
    assert_eq!(show(&parse_expr_stmt("a // b % c")), "((a // b) % c)");
}

#[test]
fn test_parse_calls_and_members() {
    assert_eq!(show(&parse_expr_stmt("f(1, g(2))")), "f(1, g(2))");
    assert_eq!(show(&parse_expr_stmt("p.q.x")), "p.q.x");
    assert_eq!(show(&parse_expr_stmt("p.move(1, 2).y")), "p.move(1, 2).y");
    assert_eq!(show(&parse_expr_stmt("-c.x")), "(- c.x)");
}

#[test]
fn test_unary_operators() {
    let expr = parse_expr_stmt("not True");
    assert!(matches!(
        expr.kind,
        ExprKind::Unary {
            op: UnaryOp::Not,
            ..
        }
    ));
}

#[test]
fn test_parse_function_declaration() {
    let source = "def add(a: int, b: int) -> int:\n    return a + b\n";
    let program = parse_source(source).unwrap();

    match &program[0].kind {
        StmtKind::Define(def) => {
            assert_eq!(def.name, "add");
            assert_eq!(def.params.len(), 2);
            assert_eq!(def.params[1].typ, Type::Int);
            assert_eq!(def.ret, Type::Int);
            assert!(matches!(def.body[0].kind, StmtKind::Return(_)));
        }
        other => panic!("unexpected statement {:?}", other),
    }
}

#[test]
fn test_missing_return_type_is_none() {
    let program = parse_source("def f():\n    pass\n").unwrap();

    match &program[0].kind {
        StmtKind::Define(def) => assert_eq!(def.ret, Type::None),
        other => panic!("unexpected statement {:?}", other),
    }
}

#[test]
fn test_bare_return_returns_none() {
    let program = parse_source("def f():\n    return\n").unwrap();

    match &program[0].kind {
        StmtKind::Define(def) => match &def.body[0].kind {
            StmtKind::Return(value) => assert_eq!(value.kind, ExprKind::None),
            other => panic!("unexpected statement {:?}", other),
        },
        other => panic!("unexpected statement {:?}", other),
    }
}

#[test]
fn test_parse_class() {
    let source = "\
class Point(object):
    x: int = 0
    y: int = 0
    def sum(self) -> int:
        return self.x + self.y
    def scale(self: Point, k: int):
        pass
";
    let program = parse_source(source).unwrap();

    match &program[0].kind {
        StmtKind::Class {
            name,
            fields,
            methods,
        } => {
            assert_eq!(name, "Point");
            assert_eq!(fields.len(), 2);
            assert_eq!(fields[1].name, "y");
            assert_eq!(methods.len(), 2);
            assert_eq!(methods[0].params[0].typ, Type::Object("Point".to_string()));
            assert!(!methods[0].params[0].annotated);
            assert!(methods[1].params[0].annotated);
        }
        other => panic!("unexpected statement {:?}", other),
    }
}

#[test]
fn test_self_needs_annotation_outside_class() {
    let error = parse_source("def f(self):\n    pass\n").unwrap_err();
    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_class_body_rejects_statements() {
    let error = parse_source("class C:\n    print(1)\n").unwrap_err();
    assert!(matches!(
        error.get_impl(),
        ErrorImpl::UnsupportedStatement { .. }
    ));
}

#[test]
fn test_inheritance_is_rejected() {
    let error = parse_source("class C(D):\n    pass\n").unwrap_err();
    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_parse_if_elif_else() {
    let source = "\
if a:
    x = 1
elif b:
    x = 2
elif c:
    x = 3
else:
    x = 4
";
    let program = parse_source(source).unwrap();

    match &program[0].kind {
        StmtKind::If {
            elifs, else_body, ..
        } => {
            assert_eq!(elifs.len(), 2);
            assert_eq!(else_body.len(), 1);
        }
        other => panic!("unexpected statement {:?}", other),
    }
}

#[test]
fn test_parse_while_loop() {
    let program = parse_source("while x < 10:\n    x = x + 1\n").unwrap();

    match &program[0].kind {
        StmtKind::While { cond, body } => {
            assert!(matches!(
                cond.kind,
                ExprKind::Binary {
                    op: BinaryOp::Lt,
                    ..
                }
            ));
            assert_eq!(body.len(), 1);
        }
        other => panic!("unexpected statement {:?}", other),
    }
}

#[test]
fn test_single_line_suite() {
    let program = parse_source("while False: pass\nx = 1\n").unwrap();
    assert_eq!(program.len(), 2);
}

#[test]
fn test_missing_indent() {
    let error = parse_source("while True:\nx = 1\n").unwrap_err();
    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_missing_newline_between_statements() {
    let error = parse_source("x = 1 y = 2").unwrap_err();
    assert!(matches!(error.get_impl(), ErrorImpl::UnexpectedToken { .. }));
}

#[test]
fn test_only_names_and_fields_are_callable() {
    let error = parse_source("(1)(2)").unwrap_err();
    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_number_too_large() {
    let error = parse_source("99999999999999999999999").unwrap_err();
    assert!(matches!(error.get_impl(), ErrorImpl::NumberParseError { .. }));
}

#[test]
fn test_statement_spans() {
    let program = parse_source("x: int = 1\ny = x\n").unwrap();

    assert_eq!(program[0].span.start.0, 0);
    assert_eq!(program[0].span.end.0, 10);
    assert_eq!(program[1].span.start.0, 11);
}
