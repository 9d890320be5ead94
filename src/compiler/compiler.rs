//! Main code generation module.
//!
//! This module contains the [`Module`] representation of the emitted
//! WebAssembly text, the [`Compiler`] state shared by expression and statement
//! generation, and the [`compile`] entry point that walks a checked program.

use std::{
    collections::{HashMap, HashSet},
    fmt::Display,
};

use log::{debug, trace};

use crate::{
    ast::{statements::StmtKind, types::Type},
    errors::errors::{Error, ErrorImpl},
    type_checker::typed_ast::{TypedFieldDecl, TypedFunDef, TypedProgram, TypedStmt},
    Position,
};

use super::{
    runtime::{
        default_word, ENTRY_POINT, ERR, HEAP_START, IMPORT_MODULE, MEMORY_IMPORT, NONE_WORD,
        PRINT_BOOL, PRINT_NONE, PRINT_NUM, WORD_SIZE,
    },
    stmt::gen_statement,
};

/// Global holding the next free heap address.
pub const HEAP_POINTER: &str = "$$heap";
/// Receives the value of every expression statement.
pub const SCRATCH_LOCAL: &str = "$$scratch";
/// Holds a receiver while it is checked against `None`.
pub const RECEIVER_LOCAL: &str = "$$tmp";
/// Operands of floor division and modulo.
pub const LHS_LOCAL: &str = "$$lhs";
pub const RHS_LOCAL: &str = "$$rhs";

/// Name of the local holding the object built at construction depth `depth`.
pub fn alloc_local(depth: usize) -> String {
    format!("$$alloc{}", depth)
}

pub fn function_id(name: &str) -> String {
    format!("${}", name)
}

pub fn method_id(class: &str, method: &str) -> String {
    format!("${}${}", class, method)
}

pub fn variable_id(name: &str) -> String {
    format!("${}", name)
}

pub fn import_id(name: &str) -> String {
    format!("$${}", name)
}

/// A host function the module imports. Every import takes and returns `i32`
/// words.
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub name: String,
    pub params: usize,
    pub result: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Global {
    pub id: String,
    pub init: i32,
}

/// A generated function. Identifiers already carry their `$` prefix and
/// `body` holds one flat instruction per entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub id: String,
    pub export: Option<String>,
    pub params: Vec<String>,
    pub locals: Vec<String>,
    pub result: bool,
    pub body: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub imports: Vec<Import>,
    pub globals: Vec<Global>,
    pub functions: Vec<Function>,
    pub start: Function,
    /// Static type of the value `_start` returns, if it returns one.
    pub result_type: Option<Type>,
}

impl Module {
    pub fn to_wat(&self) -> String {
        self.to_string()
    }
}

impl Display for Import {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(import \"{}\" \"{}\" (func {}",
            IMPORT_MODULE,
            self.name,
            import_id(&self.name)
        )?;
        for _ in 0..self.params {
            write!(f, " (param i32)")?;
        }
        if self.result {
            write!(f, " (result i32)")?;
        }
        write!(f, "))")
    }
}

impl Display for Global {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(global {} (mut i32) (i32.const {}))", self.id, self.init)
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  (func {}", self.id)?;
        if let Some(export) = &self.export {
            write!(f, " (export \"{}\")", export)?;
        }
        for param in &self.params {
            write!(f, " (param {} i32)", param)?;
        }
        if self.result {
            write!(f, " (result i32)")?;
        }
        writeln!(f)?;

        for local in &self.locals {
            writeln!(f, "    (local {} i32)", local)?;
        }

        let mut depth = 2;
        for instruction in &self.body {
            if instruction == "end" || instruction == "else" {
                depth -= 1;
            }
            writeln!(f, "{}{}", "  ".repeat(depth), instruction)?;
            if instruction == "else"
                || instruction.starts_with("block")
                || instruction.starts_with("loop")
                || instruction == "if"
            {
                depth += 1;
            }
        }

        write!(f, "  )")
    }
}

impl Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "(module")?;
        writeln!(
            f,
            "  (import \"{}\" \"{}\" (memory 1))",
            IMPORT_MODULE, MEMORY_IMPORT
        )?;
        for import in &self.imports {
            writeln!(f, "  {}", import)?;
        }
        for global in &self.globals {
            writeln!(f, "  {}", global)?;
        }
        for function in &self.functions {
            writeln!(f, "{}", function)?;
        }
        writeln!(f, "{}", self.start)?;
        write!(f, ")")
    }
}

/// Memory layout of a class: its field initializers in declaration order and
/// the byte offset of each field.
#[derive(Debug, Clone)]
pub struct ClassLayout {
    pub fields: Vec<TypedFieldDecl>,
    pub offsets: HashMap<String, i32>,
}

impl ClassLayout {
    /// Builds the layout, rejecting duplicate field names.
    ///
    /// # Arguments
    ///
    /// * `class` - Name of the class, used in errors
    /// * `fields` - Field declarations in source order
    pub fn new(class: &str, fields: &[TypedFieldDecl]) -> Result<Self, Error> {
        let mut offsets = HashMap::new();

        for (index, field) in fields.iter().enumerate() {
            if offsets
                .insert(field.name.clone(), index as i32 * WORD_SIZE)
                .is_some()
            {
                return Err(Error::new(
                    ErrorImpl::FieldAlreadyDeclared {
                        class: class.to_string(),
                        field: field.name.clone(),
                    },
                    field.span.start.clone(),
                ));
            }
        }

        Ok(ClassLayout {
            fields: fields.to_vec(),
            offsets,
        })
    }

    pub fn size(&self) -> i32 {
        self.fields.len() as i32 * WORD_SIZE
    }
}

/// State of the code generator.
///
/// Holds the program-wide class layouts together with the bookkeeping of the
/// function currently being generated.
pub struct Compiler {
    /// Layout of every class, keyed by name.
    pub classes: HashMap<String, ClassLayout>,

    /// Whether code is being generated inside a function or method body.
    /// Declarations there create locals; at the top level they set globals.
    pub in_function: bool,
    /// Local that `self` resolves to while field initializers run.
    pub self_local: Option<String>,
    /// Classes whose initializers are currently being generated, innermost
    /// last.
    pub constructing: Vec<String>,

    /// Current nesting depth of object constructions.
    alloc_depth: usize,
    /// Deepest construction nesting seen in the current function.
    max_alloc_depth: usize,
    /// Counter used to make loop labels unique.
    label_count: usize,
}

impl Compiler {
    pub fn new(classes: HashMap<String, ClassLayout>) -> Self {
        Compiler {
            classes,
            in_function: false,
            self_local: None,
            constructing: vec![],
            alloc_depth: 0,
            max_alloc_depth: 0,
            label_count: 0,
        }
    }

    pub fn layout(&self, class: &str, position: &Position) -> Result<&ClassLayout, Error> {
        self.classes.get(class).ok_or_else(|| {
            invariant(
                format!("no layout for class `{}`", class),
                position.clone(),
            )
        })
    }

    pub fn next_label(&mut self) -> usize {
        let label = self.label_count;
        self.label_count += 1;
        label
    }

    /// Opens a construction and returns the local that holds its object.
    pub fn enter_construction(&mut self) -> String {
        let local = alloc_local(self.alloc_depth);
        self.alloc_depth += 1;
        self.max_alloc_depth = self.max_alloc_depth.max(self.alloc_depth);
        local
    }

    pub fn exit_construction(&mut self) {
        self.alloc_depth -= 1;
    }

    /// Resets the per-function state.
    fn begin_function(&mut self, in_function: bool) {
        self.in_function = in_function;
        self.self_local = None;
        self.alloc_depth = 0;
        self.max_alloc_depth = 0;
    }

    /// Locals every generated function carries, besides user variables.
    fn internal_locals(&self) -> Vec<String> {
        let mut locals = vec![
            SCRATCH_LOCAL.to_string(),
            RECEIVER_LOCAL.to_string(),
            LHS_LOCAL.to_string(),
            RHS_LOCAL.to_string(),
        ];
        locals.extend((0..self.max_alloc_depth).map(alloc_local));
        locals
    }

    /// Generates a function or method.
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier of the generated function
    /// * `def` - The checked definition; methods include `self` in their parameters
    fn gen_function(&mut self, id: String, def: &TypedFunDef) -> Result<Function, Error> {
        trace!("generating function {}", id);
        self.begin_function(true);

        let params = def
            .params
            .iter()
            .map(|param| variable_id(&param.name))
            .collect::<Vec<String>>();

        let mut locals = vec![];
        let mut seen = def
            .params
            .iter()
            .map(|param| param.name.clone())
            .collect::<HashSet<String>>();
        for (name, _) in collect_declarations(&def.body) {
            if seen.insert(name.clone()) {
                locals.push(variable_id(&name));
            }
        }

        let mut body = vec![];
        for stmt in &def.body {
            gen_statement(self, stmt, &mut body)?;
        }
        // Falling off the end returns None.
        body.push(format!("i32.const {}", NONE_WORD));

        locals.extend(self.internal_locals());

        Ok(Function {
            id,
            export: None,
            params,
            locals,
            result: true,
            body,
        })
    }
}

pub fn invariant(message: String, position: Position) -> Error {
    Error::new(ErrorImpl::CodegenInvariant { message }, position)
}

/// Variable declarations in a statement list, including those nested in
/// loop and branch bodies, in source order.
pub fn collect_declarations(stmts: &[TypedStmt]) -> Vec<(String, Type)> {
    let mut found = vec![];
    collect_into(stmts, &mut found);
    found
}

fn collect_into(stmts: &[TypedStmt], found: &mut Vec<(String, Type)>) {
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::VarInit { name, typ, .. } => found.push((name.clone(), typ.clone())),
            StmtKind::While { body, .. } => collect_into(body, found),
            StmtKind::If {
                body,
                elifs,
                else_body,
                ..
            } => {
                collect_into(body, found);
                for (_, elif_body) in elifs {
                    collect_into(elif_body, found);
                }
                collect_into(else_body, found);
            }
            _ => {}
        }
    }
}

fn host_imports() -> Vec<Import> {
    let print = |name: &str| Import {
        name: name.to_string(),
        params: 1,
        result: true,
    };

    vec![
        print(PRINT_NUM),
        print(PRINT_BOOL),
        print(PRINT_NONE),
        Import {
            name: ERR.to_string(),
            params: 0,
            result: false,
        },
    ]
}

fn class_layouts(program: &TypedProgram) -> Result<HashMap<String, ClassLayout>, Error> {
    let mut classes = HashMap::new();

    for stmt in program {
        if let StmtKind::Class { name, fields, .. } = &stmt.kind {
            classes.insert(name.clone(), ClassLayout::new(name, fields)?);
        }
    }

    Ok(classes)
}

/// Compiles a checked program into a WebAssembly module.
///
/// Function and class definitions become module functions. Every other
/// top-level statement runs, in order, inside the exported `_start`
/// function, which returns the value of the final statement when that
/// statement is an expression.
///
/// # Arguments
///
/// * `program` - The output of the type checker
///
/// # Returns
///
/// The generated [`Module`], or a codegen error if the tree breaks an
/// invariant the checker guarantees.
pub fn compile(program: &TypedProgram) -> Result<Module, Error> {
    let mut compiler = Compiler::new(class_layouts(program)?);

    let mut functions = vec![];
    let mut top_level = vec![];

    for stmt in program {
        match &stmt.kind {
            StmtKind::Define(def) => {
                functions.push(compiler.gen_function(function_id(&def.name), def)?);
            }
            StmtKind::Class { name, methods, .. } => {
                for method in methods {
                    functions.push(compiler.gen_function(method_id(name, &method.name), method)?);
                }
            }
            _ => top_level.push(stmt.clone()),
        }
    }

    let mut globals = vec![Global {
        id: HEAP_POINTER.to_string(),
        init: HEAP_START,
    }];
    let mut seen = HashSet::new();
    for (name, typ) in collect_declarations(&top_level) {
        if seen.insert(name.clone()) {
            globals.push(Global {
                id: variable_id(&name),
                init: default_word(&typ),
            });
        }
    }

    compiler.begin_function(false);
    let mut body = vec![];
    for stmt in &top_level {
        gen_statement(&mut compiler, stmt, &mut body)?;
    }

    let result_type = match program.last() {
        Some(stmt) if matches!(stmt.kind, StmtKind::Expr(_)) => Some(stmt.get_type().clone()),
        _ => None,
    };
    if result_type.is_some() {
        body.push(format!("local.get {}", SCRATCH_LOCAL));
    }

    let start = Function {
        id: "$$start".to_string(),
        export: Some(ENTRY_POINT.to_string()),
        params: vec![],
        locals: compiler.internal_locals(),
        result: result_type.is_some(),
        body,
    };

    debug!(
        "generated {} functions and {} globals",
        functions.len(),
        globals.len()
    );

    Ok(Module {
        imports: host_imports(),
        globals,
        functions,
        start,
        result_type,
    })
}

