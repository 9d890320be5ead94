//! Unit tests for the lexer module.

use super::{lexer::tokenize, tokens::TokenKind};
use crate::errors::errors::ErrorImpl;

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source.to_string(), Some("test.py".to_string()))
        .unwrap()
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn test_tokenize_keywords() {
    let source = "def class return if elif else while pass True False None and or not is".to_string();
    let tokens = tokenize(source, Some("test.py".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Def);
    assert_eq!(tokens[1].kind, TokenKind::Class);
    assert_eq!(tokens[2].kind, TokenKind::Return);
    assert_eq!(tokens[3].kind, TokenKind::If);
    assert_eq!(tokens[4].kind, TokenKind::Elif);
    assert_eq!(tokens[5].kind, TokenKind::Else);
    assert_eq!(tokens[6].kind, TokenKind::While);
    assert_eq!(tokens[7].kind, TokenKind::Pass);
    assert_eq!(tokens[8].kind, TokenKind::True);
    assert_eq!(tokens[9].kind, TokenKind::False);
    assert_eq!(tokens[10].kind, TokenKind::None);
    assert_eq!(tokens[11].kind, TokenKind::And);
    assert_eq!(tokens[12].kind, TokenKind::Or);
    assert_eq!(tokens[13].kind, TokenKind::Not);
    assert_eq!(tokens[14].kind, TokenKind::Is);
    assert_eq!(tokens[15].kind, TokenKind::Newline);
    assert_eq!(tokens[16].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_identifiers() {
    let source = "foo baz_123 _underscore CamelCase".to_string();
    let tokens = tokenize(source, Some("test.py".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].value, "foo");
    assert_eq!(tokens[1].value, "baz_123");
    assert_eq!(tokens[2].value, "_underscore");
    assert_eq!(tokens[3].value, "CamelCase");
    assert_eq!(tokens[4].kind, TokenKind::Newline);
}

#[test]
fn test_tokenize_numbers() {
    let tokens = tokenize("0 42 123456".to_string(), None).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].value, "0");
    assert_eq!(tokens[1].value, "42");
    assert_eq!(tokens[2].value, "123456");
}

#[test]
fn test_tokenize_operators() {
    assert_eq!(
        kinds("+ - * // % == != < <= > >= = -> . : ,"),
        vec![
            TokenKind::Plus,
            TokenKind::Dash,
            TokenKind::Star,
            TokenKind::SlashSlash,
            TokenKind::Percent,
            TokenKind::Equals,
            TokenKind::NotEquals,
            TokenKind::Less,
            TokenKind::LessEquals,
            TokenKind::Greater,
            TokenKind::GreaterEquals,
            TokenKind::Assignment,
            TokenKind::Arrow,
            TokenKind::Dot,
            TokenKind::Colon,
            TokenKind::Comma,
            TokenKind::Newline,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_indentation() {
    let source = "while x:\n    y = 1\n    z = 2\nw = 3\n";

    assert_eq!(
        kinds(source),
        vec![
            TokenKind::While,
            TokenKind::Identifier,
            TokenKind::Colon,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Identifier,
            TokenKind::Assignment,
            TokenKind::Number,
            TokenKind::Newline,
            TokenKind::Identifier,
            TokenKind::Assignment,
            TokenKind::Number,
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::Identifier,
            TokenKind::Assignment,
            TokenKind::Number,
            TokenKind::Newline,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_dedents_are_closed_at_end_of_input() {
    let source = "if a:\n  if b:\n    pass";
    let tokens = kinds(source);
    let dedents = tokens.iter().filter(|k| **k == TokenKind::Dedent).count();

    assert_eq!(dedents, 2);
    assert_eq!(tokens[tokens.len() - 1], TokenKind::EOF);
    assert_eq!(tokens[tokens.len() - 4], TokenKind::Newline);
}

#[test]
fn test_blank_and_comment_lines_are_ignored() {
    let source = "x = 1\n\n   # indented comment\n\n# another\ny = 2 # trailing\n";

    assert_eq!(
        kinds(source),
        vec![
            TokenKind::Identifier,
            TokenKind::Assignment,
            TokenKind::Number,
            TokenKind::Newline,
            TokenKind::Identifier,
            TokenKind::Assignment,
            TokenKind::Number,
            TokenKind::Newline,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_newlines_inside_parentheses_are_joined() {
    let source = "f(1,\n      2)\n";

    assert_eq!(
        kinds(source),
        vec![
            TokenKind::Identifier,
            TokenKind::OpenParen,
            TokenKind::Number,
            TokenKind::Comma,
            TokenKind::Number,
            TokenKind::CloseParen,
            TokenKind::Newline,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_inconsistent_dedent() {
    let source = "if a:\n    x = 1\n  y = 2\n";
    let error = tokenize(source.to_string(), None).unwrap_err();

    assert!(matches!(
        error.get_impl(),
        ErrorImpl::IndentationError { .. }
    ));
}

#[test]
fn test_unrecognised_token() {
    let error = tokenize("x = @".to_string(), None).unwrap_err();

    assert_eq!(
        error.get_impl(),
        &ErrorImpl::UnrecognisedToken {
            token: "@".to_string()
        }
    );
    assert_eq!(error.get_position().0, 4);
}

#[test]
fn test_token_spans() {
    let tokens = tokenize("abc = 12".to_string(), None).unwrap();

    assert_eq!(tokens[0].span.start.0, 0);
    assert_eq!(tokens[0].span.end.0, 3);
    assert_eq!(tokens[2].span.start.0, 6);
    assert_eq!(tokens[2].span.end.0, 8);
}
