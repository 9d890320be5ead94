//! Runtime value convention shared by the code generator and the executor.
//!
//! Every value is a 32-bit word. The low two bits tag it:
//!
//! | tag  | meaning                  |
//! |------|--------------------------|
//! | `00` | int, stored as `v << 2`  |
//! | `01` | `None`                   |
//! | `10` | `False`                  |
//! | `11` | `True`                   |
//!
//! Objects are heap addresses. They are word aligned and never below
//! [`HEAP_START`], so they always carry the int tag and can be told apart
//! from `None`.

use std::fmt::Display;

use crate::ast::types::Type;

pub const TAG_BITS: u32 = 2;

pub const NONE_WORD: i32 = 1;
pub const FALSE_WORD: i32 = 2;
pub const TRUE_WORD: i32 = 3;

/// Size in bytes of one object slot.
pub const WORD_SIZE: i32 = 4;
/// First heap address handed out. Anything below it is not an object.
pub const HEAP_START: i32 = 4;

pub const IMPORT_MODULE: &str = "imports";
pub const MEMORY_IMPORT: &str = "mem";
pub const PRINT_NUM: &str = "print_num";
pub const PRINT_BOOL: &str = "print_bool";
pub const PRINT_NONE: &str = "print_none";
pub const ERR: &str = "err";
pub const ENTRY_POINT: &str = "_start";

/// Integers wrap to 32 bits before tagging.
pub fn encode_int(value: i64) -> i32 {
    (value as i32).wrapping_shl(TAG_BITS)
}

pub fn encode_bool(value: bool) -> i32 {
    if value {
        TRUE_WORD
    } else {
        FALSE_WORD
    }
}

pub fn decode_int(word: i32) -> i32 {
    word >> TAG_BITS
}

/// Initial value of a module-level variable of the given type.
pub fn default_word(typ: &Type) -> i32 {
    match typ {
        Type::Int => encode_int(0),
        Type::Bool => encode_bool(false),
        Type::None | Type::Object(_) => NONE_WORD,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeValue {
    Int(i32),
    Bool(bool),
    None,
    Object { class: String, address: i32 },
}

/// Interprets a word according to the static type it was produced with.
pub fn decode(word: i32, typ: &Type) -> RuntimeValue {
    match typ {
        Type::Int => RuntimeValue::Int(decode_int(word)),
        Type::Bool => RuntimeValue::Bool(word == TRUE_WORD),
        Type::None => RuntimeValue::None,
        Type::Object(_) if word == NONE_WORD => RuntimeValue::None,
        Type::Object(class) => RuntimeValue::Object {
            class: class.clone(),
            address: word,
        },
    }
}

impl Display for RuntimeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeValue::Int(value) => write!(f, "{}", value),
            RuntimeValue::Bool(true) => write!(f, "True"),
            RuntimeValue::Bool(false) => write!(f, "False"),
            RuntimeValue::None => write!(f, "None"),
            RuntimeValue::Object { class, address } => {
                write!(f, "<{} object at {:#x}>", class, address)
            }
        }
    }
}
