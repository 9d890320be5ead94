//! Executes generated modules with `wasmtime`.
//!
//! The host supplies the memory and the print and error intrinsics the
//! module imports. Printed lines are captured and, when `echo` is set, also
//! written to stdout as they are produced.

use anyhow::anyhow;
use log::{debug, trace};
use wasmtime::{Caller, Engine, Linker, Memory, MemoryType, Module, Store, Trap};

use crate::{
    compiler::runtime::{
        decode_int, ENTRY_POINT, ERR, IMPORT_MODULE, MEMORY_IMPORT, PRINT_BOOL, PRINT_NONE,
        PRINT_NUM, TRUE_WORD,
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

pub use crate::compiler::runtime::{decode, RuntimeValue};

/// Pages of linear memory handed to each run.
const MEMORY_PAGES: u32 = 16;

const NONE_ACCESS: &str = "attempted to use None as an object";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Lines printed by the program, in order.
    pub output: Vec<String>,
    /// Raw word returned by `_start`, if it returns one.
    pub value: Option<i32>,
}

struct HostState {
    output: Vec<String>,
    echo: bool,
}

impl HostState {
    fn print(&mut self, line: String) {
        if self.echo {
            println!("{}", line);
        }
        self.output.push(line);
    }
}

fn link(engine: &Engine, store: &mut Store<HostState>) -> anyhow::Result<Linker<HostState>> {
    let mut linker = Linker::new(engine);

    let memory = Memory::new(&mut *store, MemoryType::new(MEMORY_PAGES, None))?;
    linker.define(&*store, IMPORT_MODULE, MEMORY_IMPORT, memory)?;

    linker.func_wrap(
        IMPORT_MODULE,
        PRINT_NUM,
        |mut caller: Caller<'_, HostState>, word: i32| -> i32 {
            caller.data_mut().print(decode_int(word).to_string());
            word
        },
    )?;
    linker.func_wrap(
        IMPORT_MODULE,
        PRINT_BOOL,
        |mut caller: Caller<'_, HostState>, word: i32| -> i32 {
            let text = if word == TRUE_WORD { "True" } else { "False" };
            caller.data_mut().print(text.to_string());
            word
        },
    )?;
    linker.func_wrap(
        IMPORT_MODULE,
        PRINT_NONE,
        |mut caller: Caller<'_, HostState>, word: i32| -> i32 {
            caller.data_mut().print("None".to_string());
            word
        },
    )?;
    linker.func_wrap(IMPORT_MODULE, ERR, || -> anyhow::Result<()> {
        Err(anyhow!(NONE_ACCESS))
    })?;

    Ok(linker)
}

fn execute(binary: &[u8], echo: bool) -> anyhow::Result<Execution> {
    let engine = Engine::default();
    let module = Module::new(&engine, binary)?;
    let mut store = Store::new(
        &engine,
        HostState {
            output: vec![],
            echo,
        },
    );

    let linker = link(&engine, &mut store)?;
    let instance = linker.instantiate(&mut store, &module)?;

    let returns_value = module
        .get_export(ENTRY_POINT)
        .and_then(|export| export.func().map(|func| func.results().len() == 1))
        .ok_or_else(|| anyhow!("module does not export `{}`", ENTRY_POINT))?;

    let value = if returns_value {
        let start = instance.get_typed_func::<(), i32>(&mut store, ENTRY_POINT)?;
        Some(start.call(&mut store, ())?)
    } else {
        let start = instance.get_typed_func::<(), ()>(&mut store, ENTRY_POINT)?;
        start.call(&mut store, ())?;
        None
    };

    trace!("execution returned {:?}", value);
    Ok(Execution {
        output: store.into_data().output,
        value,
    })
}

fn runtime_error(error: anyhow::Error) -> Error {
    let message = match error.downcast_ref::<Trap>() {
        Some(Trap::IntegerDivisionByZero) => "division or modulo by zero".to_string(),
        Some(Trap::MemoryOutOfBounds) => "out of memory".to_string(),
        Some(trap) => trap.to_string(),
        None => error.root_cause().to_string(),
    };

    Error::new(ErrorImpl::RuntimeError { message }, Position::null())
}

/// Assembles and runs a module in WebAssembly text format.
///
/// Text that does not assemble is reported as a code generation error;
/// failures while instantiating or running become runtime errors.
pub fn run_wat(wat: &str, echo: bool) -> Result<Execution, Error> {
    let binary = wat::parse_str(wat).map_err(|error| {
        Error::new(
            ErrorImpl::CodegenInvariant {
                message: format!("generated module does not assemble: {}", error),
            },
            Position::null(),
        )
    })?;
    debug!("assembled module of {} bytes", binary.len());

    execute(&binary, echo).map_err(runtime_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRINTS: &str = r#"
(module
  (import "imports" "mem" (memory 1))
  (import "imports" "print_num" (func $$print_num (param i32) (result i32)))
  (import "imports" "print_bool" (func $$print_bool (param i32) (result i32)))
  (import "imports" "print_none" (func $$print_none (param i32) (result i32)))
  (import "imports" "err" (func $$err))
  (func (export "_start") (result i32)
    i32.const 28
    call $$print_num
    drop
    i32.const 3
    call $$print_bool
    drop
    i32.const 1
    call $$print_none
    drop
    i32.const -8)
)
"#;

    #[test]
    fn test_prints_are_captured() {
        let execution = run_wat(PRINTS, false).unwrap();

        assert_eq!(execution.output, vec!["7", "True", "None"]);
        assert_eq!(execution.value, Some(-8));
        assert_eq!(
            decode(-8, &crate::ast::types::Type::Int),
            RuntimeValue::Int(-2)
        );
    }

    #[test]
    fn test_err_aborts() {
        let wat = r#"
(module
  (import "imports" "err" (func $$err))
  (func (export "_start")
    call $$err)
)
"#;
        let error = run_wat(wat, false).unwrap_err();

        assert_eq!(
            error.get_impl(),
            &ErrorImpl::RuntimeError {
                message: NONE_ACCESS.to_string()
            }
        );
    }

    #[test]
    fn test_traps_are_runtime_errors() {
        let wat = r#"
(module
  (func (export "_start") (result i32)
    i32.const 4
    i32.const 0
    i32.div_s)
)
"#;
        let error = run_wat(wat, false).unwrap_err();

        assert_eq!(error.get_error_name(), "RuntimeError");
        assert_eq!(
            error.get_impl(),
            &ErrorImpl::RuntimeError {
                message: "division or modulo by zero".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_text_is_internal() {
        let error = run_wat("(module (func", false).unwrap_err();

        assert_eq!(error.get_error_name(), "CodegenInvariant");
    }
}
