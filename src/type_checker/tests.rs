//! Unit tests for the type checker.

use std::rc::Rc;

use super::{
    type_checker::{check_program, collect_declarations, Environment},
    typed_ast::TypedProgram,
};
use crate::{
    ast::{
        ast::{erase, Program},
        expressions::ExprKind,
        statements::StmtKind,
        types::Type,
    },
    errors::errors::{Error, ErrorImpl, ErrorKind},
    lexer::lexer::tokenize,
    parser::parser::parse,
    Position,
};

fn parse_source(source: &str) -> Program<()> {
    let tokens = tokenize(source.to_string(), Some("test.py".to_string())).unwrap();
    parse(tokens, Rc::new("test.py".to_string())).unwrap()
}

fn check(source: &str) -> Result<TypedProgram, Error> {
    check_program(&parse_source(source))
}

fn error_name(source: &str) -> String {
    let error = check(source).unwrap_err();
    assert_eq!(error.get_kind(), ErrorKind::Type, "{}", error);
    error.get_error_name().to_string()
}

const POINT: &str = "\
class Point(object):
    x: int = 1
    y: int = 2
    def sum(self) -> int:
        return self.x + self.y
    def shift(self, dx: int, flag: bool) -> Point:
        self.x = self.x + dx
        return self
";

#[test]
fn test_literal_and_operator_types() {
    let program = check("1 + 2 * 3\n").unwrap();
    assert_eq!(*program[0].get_type(), Type::Int);

    let program = check("1 < 2 and not False\n").unwrap();
    assert_eq!(*program[0].get_type(), Type::Bool);

    let program = check("None\n").unwrap();
    assert_eq!(*program[0].get_type(), Type::None);
}

#[test]
fn test_permissive_logical_operators() {
    let program = check("1 and None\n").unwrap();
    assert_eq!(*program[0].get_type(), Type::Bool);

    let program = check(&format!("{}Point() is None\n", POINT)).unwrap();
    assert_eq!(*program[1].get_type(), Type::Bool);
}

#[test]
fn test_operand_type_errors() {
    assert_eq!(error_name("1 + True\n"), "OperandTypeMatchError");
    assert_eq!(error_name("not 1\n"), "OperandTypeMatchError");
    assert_eq!(error_name("-True\n"), "OperandTypeMatchError");
    assert_eq!(error_name("None < 1\n"), "OperandTypeMatchError");
}

#[test]
fn test_integer_literal_range() {
    assert!(check("536870911\n").is_ok());
    assert!(check("-536870912\n").is_ok());

    let error = check("536870912\n").unwrap_err();
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::IntegerLiteralOutOfRange { value: 536870912 }
    );

    let error = check("-536870913\n").unwrap_err();
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::IntegerLiteralOutOfRange { value: -536870913 }
    );
}

#[test]
fn test_globals_are_flagged() {
    let source = "\
x: int = 1
def f(y: int) -> int:
    return x + y
";
    let program = check(source).unwrap();

    let StmtKind::Define(def) = &program[1].kind else {
        panic!("expected a definition");
    };
    let StmtKind::Return(value) = &def.body[0].kind else {
        panic!("expected a return");
    };
    let ExprKind::Binary { lhs, rhs, .. } = &value.kind else {
        panic!("expected a binary expression");
    };

    assert!(matches!(&lhs.kind, ExprKind::Id { global: true, .. }));
    assert!(matches!(&rhs.kind, ExprKind::Id { global: false, .. }));
}

#[test]
fn test_local_shadows_global() {
    let source = "\
x: int = 1
def f() -> bool:
    x: bool = True
    return x
";
    assert!(check(source).is_ok());
}

#[test]
fn test_redeclaration_in_same_scope() {
    assert_eq!(
        error_name("x: int = 1\nx: int = 2\n"),
        "VariableAlreadyDeclared"
    );
    assert_eq!(
        error_name("def f(a: int):\n    a: int = 1\n"),
        "VariableAlreadyDeclared"
    );
}

#[test]
fn test_varinit_requires_exact_type() {
    assert_eq!(error_name("x: int = True\n"), "TypeMatchError");
    assert_eq!(
        error_name(&format!("{}p: Point = None\n", POINT)),
        "TypeMatchError"
    );
    assert_eq!(error_name("p: Missing = None\n"), "UnknownType");
}

#[test]
fn test_assignment_uses_assignability() {
    let source = format!("{}p: Point = Point()\np = None\n", POINT);
    assert!(check(&source).is_ok());

    assert_eq!(error_name("x: int = 1\nx = False\n"), "TypeMatchError");
    assert_eq!(error_name("y = 1\n"), "VariableNotDeclared");
    assert_eq!(error_name("1 = 1\n"), "InvalidAssignmentTarget");
}

#[test]
fn test_calls() {
    let source = "\
def f(a: int, b: bool) -> int:
    return a
f(1, True)
";
    let program = check(source).unwrap();
    assert_eq!(*program[1].get_type(), Type::Int);

    let prefix = "def f(a: int, b: bool) -> int:\n    return a\n";
    assert_eq!(error_name(&format!("{}f(1)\n", prefix)), "MissingArguments");
    assert_eq!(
        error_name(&format!("{}f(1, True, 3)\n", prefix)),
        "UnexpectedArguments"
    );
    assert_eq!(error_name("g()\n"), "FunctionNotDeclared");

    let error = check(&format!("{}f(1, 2)\n", prefix)).unwrap_err();
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::ArgumentTypeMatchError {
            position: 2,
            expected: "bool".to_string(),
            received: "int".to_string(),
        }
    );
}

#[test]
fn test_print_is_builtin() {
    let program = check("print(1)\nprint(True)\nprint(None)\n").unwrap();
    assert_eq!(*program[0].get_type(), Type::None);

    assert_eq!(error_name("print()\n"), "MissingArguments");
    assert_eq!(error_name("print(1, 2)\n"), "UnexpectedArguments");
    assert_eq!(
        error_name("def print(x: int):\n    pass\n"),
        "FunctionAlreadyDeclared"
    );
}

#[test]
fn test_construction_and_members() {
    let source = format!(
        "{}p: Point = Point()\np.x\np.sum()\np.shift(2, True).y\n",
        POINT
    );
    let program = check(&source).unwrap();

    let StmtKind::VarInit { init, .. } = &program[1].kind else {
        panic!("expected a declaration");
    };
    assert_eq!(
        init.kind,
        ExprKind::Construct {
            class: "Point".to_string()
        }
    );
    assert_eq!(*init.get_type(), Type::Object("Point".to_string()));
    assert_eq!(*program[2].get_type(), Type::Int);
    assert_eq!(*program[3].get_type(), Type::Int);
    assert_eq!(*program[4].get_type(), Type::Int);
}

#[test]
fn test_member_errors() {
    let error = check(&format!("{}Point().z\n", POINT)).unwrap_err();
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::FieldNotDeclared {
            class: "Point".to_string(),
            field: "z".to_string(),
        }
    );

    assert_eq!(
        error_name(&format!("{}Point().scale()\n", POINT)),
        "MethodNotDeclared"
    );
    assert_eq!(error_name("x: int = 1\nx.y\n"), "NotAnObject");
    assert_eq!(error_name("None.f()\n"), "NotAnObject");
    assert_eq!(
        error_name(&format!("{}Point(1)\n", POINT)),
        "UnexpectedArguments"
    );
}

#[test]
fn test_conditions_must_be_bool() {
    assert_eq!(error_name("while 1:\n    pass\n"), "ConditionTypeMatchError");
    assert_eq!(
        error_name("if True:\n    pass\nelif 2:\n    pass\n"),
        "ConditionTypeMatchError"
    );
}

#[test]
fn test_return_rules() {
    assert_eq!(error_name("return 1\n"), "ReturnOutsideFunction");
    assert_eq!(
        error_name("def f() -> int:\n    return True\n"),
        "ReturnTypeMatchError"
    );
    assert_eq!(
        error_name("def f() -> int:\n    pass\n"),
        "MissingReturn"
    );
    assert_eq!(
        error_name("def f(b: bool) -> int:\n    if b:\n        return 1\n"),
        "MissingReturn"
    );

    let exhaustive = "\
def f(n: int) -> int:
    if n < 0:
        return 0
    elif n == 0:
        return 1
    else:
        return 2
";
    assert!(check(exhaustive).is_ok());
    assert!(check("def f():\n    return\n").is_ok());
}

#[test]
fn test_nested_definitions_are_rejected() {
    assert_eq!(
        error_name("def f():\n    def g():\n        pass\n"),
        "UnsupportedStatement"
    );
    assert_eq!(
        error_name("while True:\n    def g():\n        pass\n"),
        "UnsupportedStatement"
    );
    assert_eq!(
        error_name("if True:\n    class C:\n        pass\n"),
        "UnsupportedStatement"
    );
}

#[test]
fn test_class_declarations() {
    assert_eq!(
        error_name("class C:\n    pass\nclass C:\n    pass\n"),
        "ClassAlreadyDeclared"
    );
    assert_eq!(
        error_name("class C:\n    x: int = 1\n    x: int = 2\n"),
        "FieldAlreadyDeclared"
    );
    assert_eq!(
        error_name("class C:\n    def m(self):\n        pass\n    def m(self):\n        pass\n"),
        "MethodAlreadyDeclared"
    );
    assert_eq!(
        error_name("class C:\n    def m(this: C):\n        pass\n"),
        "MissingSelfParameter"
    );
    assert_eq!(
        error_name("class C:\n    def m():\n        pass\n"),
        "MissingSelfParameter"
    );
    assert_eq!(
        error_name("class C:\n    x: bool = 1\n"),
        "TypeMatchError"
    );
    assert_eq!(
        error_name("def f():\n    pass\ndef f():\n    pass\n"),
        "FunctionAlreadyDeclared"
    );
}

#[test]
fn test_forward_references() {
    let source = "\
def make() -> A:
    return A()
class A:
    b: B = None
class B:
    pass
";
    // `None` is not exactly `B`.
    assert_eq!(error_name(source), "TypeMatchError");

    let source = "\
def f() -> int:
    return g()
def g() -> int:
    return 1
class A:
    def get(self) -> B:
        return B()
class B:
    pass
";
    assert!(check(source).is_ok());
}

#[test]
fn test_method_self_is_the_receiver() {
    let source = "\
class C:
    n: int = 0
    def get(self) -> int:
        return self.n
";
    assert!(check(source).is_ok());
    assert_eq!(
        error_name("def f() -> int:\n    return self\n"),
        "VariableNotDeclared"
    );
}

#[test]
fn test_collect_declarations() {
    let program = parse_source(POINT);
    let (functions, classes) = collect_declarations(&program).unwrap();

    assert!(functions.is_empty());
    let point = &classes["Point"];
    assert_eq!(point.fields.len(), 2);
    assert_eq!(
        point.methods["shift"].params,
        vec![Type::Int, Type::Bool]
    );
    assert_eq!(
        point.methods["shift"].ret,
        Type::Object("Point".to_string())
    );
}

#[test]
fn test_environment_scoping() {
    let mut global = Environment::global();
    global
        .declare("x", Type::Int, Position::null())
        .unwrap();
    assert_eq!(global.lookup("x"), Some(&(Type::Int, true)));

    let mut local = global.descend();
    assert_eq!(local.lookup("x"), Some(&(Type::Int, true)));
    local
        .declare("x", Type::Bool, Position::null())
        .unwrap();
    assert_eq!(local.lookup("x"), Some(&(Type::Bool, false)));
    assert!(local
        .declare("x", Type::Int, Position::null())
        .is_err());

    // The outer scope is untouched.
    assert_eq!(global.lookup("x"), Some(&(Type::Int, true)));
}

#[test]
fn test_checking_is_idempotent() {
    let source = format!(
        "{}x: int = 5\ndef f(p: Point) -> int:\n    return p.sum() + x\nf(Point())\n",
        POINT
    );
    let typed = check(&source).unwrap();
    let rechecked = check_program(&erase(&typed)).unwrap();

    assert_eq!(typed, rechecked);
}

#[test]
fn test_recursive_construction_is_rejected() {
    let error = check("class A:\n    a: A = A()\n").unwrap_err();
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::RecursiveConstruction {
            class: "A".to_string()
        }
    );
    assert_eq!(error.get_kind(), ErrorKind::Type);

    let source = "\
class A:
    b: B = B()
class B:
    a: A = A()
";
    assert_eq!(error_name(source), "RecursiveConstruction");

    let source = "\
class A:
    n: int = A().n
";
    assert_eq!(error_name(source), "RecursiveConstruction");

    // Constructions inside methods run only when called.
    let source = "\
class A:
    n: int = 1
    def copy(self) -> A:
        return A()
class B:
    a: A = A()
";
    assert!(check(source).is_ok());
}

#[test]
fn test_rechecked_construction_of_unknown_class() {
    let typed = check("class A:\n    pass\nA()\n").unwrap();
    let mut program = erase(&typed);

    if let StmtKind::Expr(expr) = &mut program[1].kind {
        expr.kind = ExprKind::Construct {
            class: "Ghost".to_string(),
        };
    }

    assert_eq!(
        check_program(&program).unwrap_err().get_impl(),
        &ErrorImpl::ClassNotDeclared {
            class: "Ghost".to_string()
        }
    );
}
