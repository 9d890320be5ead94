#![allow(clippy::module_inception)]

use std::rc::Rc;

use log::info;

use crate::{
    compiler::compiler::{compile, Module},
    errors::errors::{Error, ErrorImpl, ErrorTip},
    lexer::lexer::tokenize,
    parser::parser::parse,
    runner::{decode, run_wat, RuntimeValue},
    type_checker::{type_checker::check_program, typed_ast::TypedProgram},
};

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod runner;
pub mod type_checker;

extern crate regex;

/// Byte offset into a named source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position(pub u32, pub Rc<String>);

const NULL_FILE: &str = "<null>";

impl Position {
    /// Position of errors that have no place in the source, such as traps.
    pub fn null() -> Self {
        Position(0, Rc::new(String::from(NULL_FILE)))
    }

    pub fn is_null(&self) -> bool {
        self.1.as_str() == NULL_FILE
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Finds the line holding byte `position` of `source`.
///
/// Returns the 1-based line number, the line's text and the offset of the
/// position within it. Positions past the end point at the end of the last
/// line.
pub fn get_line_at_position(source: &str, position: u32) -> (usize, String, usize) {
    let pos = position as usize;

    let mut start = 0;
    let mut line_number = 1;
    let mut last = (1, String::new(), 0);

    for line in source.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            return (line_number, line.to_string(), pos - start);
        }

        last = (line_number, line.to_string(), line.trim_end_matches('\n').len());
        start = end;
        line_number += 1;
    }

    last
}

/// Renders an error against the source line it points at.
///
/// ```text
/// Error: UnrecognisedToken
/// -> main.py
///   |
/// 1 | x = @
///   | ----^
/// ```
pub fn format_error(error: &Error, source: &str, file_name: &str) -> String {
    let mut rendered = if let ErrorTip::None = error.get_tip() {
        format!("Error: {}\n", error.get_error_name())
    } else {
        format!("Error: {} ({})\n", error.get_error_name(), error.get_tip())
    };

    let position = error.get_position();
    if position.is_null() {
        return rendered;
    }

    let (line, line_text, line_pos) = get_line_at_position(source, position.0);
    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;

    rendered.push_str(&format!("-> {}\n", file_name));
    rendered.push_str(&format!("{:>padding$}\n", "|"));
    rendered.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim()));
    rendered.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));
    rendered
}

pub fn display_error(error: &Error, source: &str, file_name: &str) {
    eprint!("{}", format_error(error, source, file_name));
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let mut start = 0;
    for c in string.chars() {
        if c == ' ' || c == '\t' {
            start += 1;
        } else {
            break;
        }
    }

    (String::from(&string[start..]), start)
}

/// Tokenizes, parses and type checks a source file.
pub fn check_source(source: &str, file_name: &str) -> Result<TypedProgram, Error> {
    let tokens = tokenize(source.to_string(), Some(file_name.to_string()))?;
    let program = parse(tokens, Rc::new(file_name.to_string()))?;
    check_program(&program)
}

pub fn compile_source(source: &str, file_name: &str) -> Result<Module, Error> {
    let typed = check_source(source, file_name)?;
    let module = compile(&typed)?;
    info!("compiled {}", file_name);
    Ok(module)
}

pub fn compile_to_wat(source: &str, file_name: &str) -> Result<String, Error> {
    Ok(compile_source(source, file_name)?.to_wat())
}

/// Compiles to the binary WebAssembly format.
pub fn compile_to_wasm(source: &str, file_name: &str) -> Result<Vec<u8>, Error> {
    let wat = compile_to_wat(source, file_name)?;
    wat::parse_str(&wat).map_err(|error| {
        Error::new(
            ErrorImpl::CodegenInvariant {
                message: format!("generated module does not assemble: {}", error),
            },
            Position::null(),
        )
    })
}

/// Result of running a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub output: Vec<String>,
    /// Value of the final top-level expression statement, if the program
    /// ends with one.
    pub value: Option<RuntimeValue>,
}

/// Compiles and runs a program, returning what it printed.
pub fn run_source(source: &str, file_name: &str, echo: bool) -> Result<RunOutput, Error> {
    let module = compile_source(source, file_name)?;
    let execution = run_wat(&module.to_wat(), echo)?;

    let value = match (execution.value, &module.result_type) {
        (Some(word), Some(typ)) => Some(decode(word, typ)),
        _ => None,
    };

    Ok(RunOutput {
        output: execution.output,
        value,
    })
}
