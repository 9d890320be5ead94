//! Unit tests for the code generator.

use std::rc::Rc;

use super::{
    compiler::{collect_declarations, compile, ClassLayout, Module},
    runtime::{decode, decode_int, default_word, encode_int, RuntimeValue},
};
use crate::{
    ast::{
        ast::Expr,
        expressions::ExprKind,
        statements::{FieldDecl, StmtKind},
        types::Type,
    },
    errors::errors::Error,
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::type_checker::check_program,
    Position, Span,
};

fn compile_source(source: &str) -> Result<Module, Error> {
    let tokens = tokenize(source.to_string(), Some("test.py".to_string())).unwrap();
    let program = parse(tokens, Rc::new("test.py".to_string())).unwrap();
    compile(&check_program(&program).unwrap())
}

fn assert_valid(module: &Module) {
    let wat = module.to_wat();
    if let Err(error) = wat::parse_str(&wat) {
        panic!("invalid module: {}\n{}", error, wat);
    }
}

const POINT: &str = "\
class Point(object):
    x: int = 1
    y: int = 2
    def sum(self) -> int:
        return self.x + self.y
";

#[test]
fn test_value_encoding() {
    assert_eq!(encode_int(7), 28);
    assert_eq!(encode_int(-1), -4);
    assert_eq!(decode_int(encode_int(-536870912)), -536870912);

    assert_eq!(default_word(&Type::Int), 0);
    assert_eq!(default_word(&Type::Bool), 2);
    assert_eq!(default_word(&Type::Object("Point".to_string())), 1);

    assert_eq!(decode(12, &Type::Int), RuntimeValue::Int(3));
    assert_eq!(decode(3, &Type::Bool), RuntimeValue::Bool(true));
    assert_eq!(
        decode(1, &Type::Object("Point".to_string())),
        RuntimeValue::None
    );
    assert_eq!(
        decode(8, &Type::Object("Point".to_string())).to_string(),
        "<Point object at 0x8>"
    );
}

#[test]
fn test_globals_and_result() {
    let module = compile_source("x: int = 1\nb: bool = True\nx\n").unwrap();

    let globals = module
        .globals
        .iter()
        .map(|global| (global.id.as_str(), global.init))
        .collect::<Vec<_>>();
    assert_eq!(globals, vec![("$$heap", 4), ("$x", 0), ("$b", 2)]);

    assert!(module.start.result);
    assert_eq!(module.result_type, Some(Type::Int));
    assert_eq!(module.start.body.last().unwrap(), "local.get $$scratch");
    assert_valid(&module);
}

#[test]
fn test_no_result_without_final_expression() {
    let module = compile_source("x: int = 1\nx = 2\n").unwrap();

    assert!(!module.start.result);
    assert_eq!(module.result_type, None);
    assert_valid(&module);
}

#[test]
fn test_nested_globals_are_hoisted() {
    let module = compile_source("if True:\n    y: int = 5\nwhile False:\n    z: bool = True\n").unwrap();

    let ids = module
        .globals
        .iter()
        .map(|global| global.id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["$$heap", "$y", "$z"]);
}

#[test]
fn test_function_locals() {
    let source = "\
def f(n: int) -> int:
    while n > 0:
        m: int = n
        n = n - 1
    return n
f(3)
";
    let module = compile_source(source).unwrap();
    let function = &module.functions[0];

    assert_eq!(function.id, "$f");
    assert_eq!(function.params, vec!["$n".to_string()]);
    assert!(function.locals.contains(&"$m".to_string()));
    assert!(!function.locals.contains(&"$n".to_string()));
    assert_eq!(function.body.last().unwrap(), "i32.const 1");
    assert_valid(&module);
}

#[test]
fn test_methods_take_self_first() {
    let module = compile_source(&format!("{}Point().sum()\n", POINT)).unwrap();
    let method = &module.functions[0];

    assert_eq!(method.id, "$Point$sum");
    assert_eq!(method.params, vec!["$self".to_string()]);
    assert!(module
        .start
        .body
        .contains(&"call $Point$sum".to_string()));
    assert_valid(&module);
}

#[test]
fn test_construction_reserves_before_initializing() {
    let module = compile_source(&format!("{}p: Point = Point()\n", POINT)).unwrap();
    let body = &module.start.body;

    let reserve = body
        .iter()
        .position(|instruction| instruction == "global.set $$heap")
        .unwrap();
    let first_store = body
        .iter()
        .position(|instruction| instruction == "i32.store")
        .unwrap();
    assert!(reserve < first_store);
    assert!(body.contains(&"i32.const 8".to_string()));
    assert!(module.start.locals.contains(&"$$alloc0".to_string()));
    assert_valid(&module);
}

#[test]
fn test_nested_construction_uses_separate_locals() {
    let source = "\
class Inner:
    v: int = 3
class Outer:
    n: int = Inner().v
o: Outer = Outer()
";
    let module = compile_source(source).unwrap();

    assert!(module.start.locals.contains(&"$$alloc0".to_string()));
    assert!(module.start.locals.contains(&"$$alloc1".to_string()));
    assert_valid(&module);
}

#[test]
fn test_recursive_construction_is_an_invariant_breach() {
    let tokens = tokenize("class A:\n    a: int = 0\nA()\n".to_string(), None).unwrap();
    let program = parse(tokens, Rc::new("test.py".to_string())).unwrap();
    let mut typed = check_program(&program).unwrap();

    if let StmtKind::Class { fields, .. } = &mut typed[0].kind {
        let span = fields[0].init.span.clone();
        fields[0].typ = Type::Object("A".to_string());
        fields[0].init = Expr {
            a: Type::Object("A".to_string()),
            span,
            kind: ExprKind::Construct {
                class: "A".to_string(),
            },
        };
    }

    let error = compile(&typed).unwrap_err();
    assert_eq!(error.get_error_name(), "CodegenInvariant");
}

#[test]
fn test_negative_literal_is_folded() {
    let module = compile_source("-536870912\n").unwrap();

    assert_eq!(module.start.body[0], "i32.const -2147483648");
    assert_valid(&module);
}

#[test]
fn test_control_flow_is_valid() {
    let source = "\
def classify(n: int) -> int:
    if n < 0:
        return 0 - 1
    elif n == 0:
        return 0
    elif n % 2 == 0:
        return n // 2
    else:
        return 1
i: int = 0 - 3
while i < 4:
    print(classify(i))
    i = i + 1
";
    let module = compile_source(source).unwrap();
    let wat = module.to_wat();

    assert!(wat.contains("block $$while_exit_0"));
    assert!(wat.contains("br_if $$while_exit_0"));
    assert!(wat.contains("call $$print_num"));
    assert_valid(&module);
}

#[test]
fn test_receiver_checks_and_printing_objects() {
    let source = format!("{}p: Point = Point()\np = None\nprint(p)\np.x = 5\n", POINT);
    let module = compile_source(&source).unwrap();
    let wat = module.to_wat();

    assert!(wat.contains("call $$err"));
    assert!(wat.contains("call $$print_none"));
    assert_valid(&module);
}

#[test]
fn test_module_imports() {
    let wat = compile_source("pass\n").unwrap().to_wat();

    assert!(wat.contains("(import \"imports\" \"mem\" (memory 1))"));
    assert!(wat.contains(
        "(import \"imports\" \"print_num\" (func $$print_num (param i32) (result i32)))"
    ));
    assert!(wat.contains("(import \"imports\" \"err\" (func $$err))"));
    assert!(wat.contains("(export \"_start\")"));
}

#[test]
fn test_duplicate_fields_in_layout() {
    let span = Span {
        start: Position::null(),
        end: Position::null(),
    };
    let field = FieldDecl {
        name: "x".to_string(),
        typ: Type::Int,
        init: Expr {
            a: Type::Int,
            span: span.clone(),
            kind: ExprKind::Number(0),
        },
        span,
    };

    let layout = ClassLayout::new("C", &[field.clone()]).unwrap();
    assert_eq!(layout.size(), 4);
    assert_eq!(layout.offsets["x"], 0);

    let error = ClassLayout::new("C", &[field.clone(), field]).unwrap_err();
    assert_eq!(error.get_error_name(), "FieldAlreadyDeclared");
}

#[test]
fn test_collect_declarations_in_order() {
    let tokens = tokenize(
        "a: int = 1\nif True:\n    b: bool = False\nelse:\n    c: int = 2\n".to_string(),
        None,
    )
    .unwrap();
    let program = parse(tokens, Rc::new("shell".to_string())).unwrap();
    let typed = check_program(&program).unwrap();

    let names = collect_declarations(&typed)
        .into_iter()
        .map(|(name, _)| name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["a", "b", "c"]);
}
