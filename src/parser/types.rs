//! Type annotation parsing.
//!
//! Annotations are a single name: `int`, `bool`, `None` or a class name.
//! They are dispatched through a NUD table like expressions are.

use std::collections::HashMap;

use crate::{
    ast::types::Type,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::parser::Parser;

/// Type alias for type null denotation handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<Type, Error>;

/// Type alias for type NUD lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Identifier, parse_named_type);
    parser.type_nud(TokenKind::None, parse_none_type);
}

pub fn parse_named_type(parser: &mut Parser) -> Result<Type, Error> {
    let token = parser.expect(TokenKind::Identifier)?;
    Ok(Type::from_annotation(&token.value))
}

pub fn parse_none_type(parser: &mut Parser) -> Result<Type, Error> {
    parser.expect(TokenKind::None)?;
    Ok(Type::None)
}

pub fn parse_type(parser: &mut Parser) -> Result<Type, Error> {
    let token_kind = parser.current_token_kind();
    let handler = parser.get_type_nud_lookup().get(&token_kind).copied();
    match handler {
        Some(handler) => handler(parser),
        None => Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected a type"),
            },
            parser.get_position(),
        )),
    }
}
