use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("def", TokenKind::Def);
        map.insert("class", TokenKind::Class);
        map.insert("return", TokenKind::Return);
        map.insert("if", TokenKind::If);
        map.insert("elif", TokenKind::Elif);
        map.insert("else", TokenKind::Else);
        map.insert("while", TokenKind::While);
        map.insert("pass", TokenKind::Pass);
        map.insert("True", TokenKind::True);
        map.insert("False", TokenKind::False);
        map.insert("None", TokenKind::None);
        map.insert("and", TokenKind::And);
        map.insert("or", TokenKind::Or);
        map.insert("not", TokenKind::Not);
        map.insert("is", TokenKind::Is);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Number,
    Identifier,

    // Layout
    Newline,
    Indent,
    Dedent,

    OpenParen,
    CloseParen,

    Assignment, // =
    Equals,     // ==
    NotEquals,  // !=

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Dot,
    Colon,
    Comma,
    Arrow,

    Plus,
    Dash,
    Star,
    SlashSlash,
    Percent,

    // Reserved
    Def,
    Class,
    Return,
    If,
    Elif,
    Else,
    While,
    Pass,
    True,
    False,
    None,
    And,
    Or,
    Not,
    Is,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nvalue: {}}}", self.kind, self.value)
    }
}

impl Token {
    pub fn is_one_of(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind)
    }
}
