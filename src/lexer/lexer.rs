use std::rc::Rc;

use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

/// Handlers receive the text matched by their pattern, which always starts
/// at the current lexer position.
pub type RegexHandler = fn(&mut Lexer, &str) -> Result<(), Error>;

#[derive(Clone)]
pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

impl RegexPattern {
    fn new(pattern: &str, handler: RegexHandler) -> Self {
        RegexPattern {
            // Patterns are compile-time constants.
            regex: Regex::new(pattern).expect("invalid lexer pattern"),
            handler,
        }
    }
}

#[derive(Clone)]
pub struct Lexer {
    patterns: Vec<RegexPattern>,
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    file: Rc<String>,
    /// Widths of the currently open indentation levels, innermost last.
    indent_stack: Vec<usize>,
    /// Newlines inside parentheses do not end a logical line.
    paren_depth: usize,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        Lexer {
            pos: 0,
            tokens: vec![],
            patterns: vec![
                RegexPattern::new(r"^\r?\n([ \t]*(#[^\n]*)?\r?\n)*[ \t]*", newline_handler),
                RegexPattern::new(r"^[ \t\r]+", skip_handler),
                RegexPattern::new(r"^#[^\n]*", skip_handler),
                RegexPattern::new(r"^[a-zA-Z_][a-zA-Z0-9_]*", symbol_handler),
                RegexPattern::new(r"^[0-9]+", number_handler),
                RegexPattern::new(r"^\(", open_paren_handler),
                RegexPattern::new(r"^\)", close_paren_handler),
                RegexPattern::new(r"^->", MK_DEFAULT_HANDLER!(TokenKind::Arrow, "->")),
                RegexPattern::new(r"^==", MK_DEFAULT_HANDLER!(TokenKind::Equals, "==")),
                RegexPattern::new(r"^!=", MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=")),
                RegexPattern::new(r"^<=", MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=")),
                RegexPattern::new(r"^>=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=")),
                RegexPattern::new(r"^//", MK_DEFAULT_HANDLER!(TokenKind::SlashSlash, "//")),
                RegexPattern::new(r"^<", MK_DEFAULT_HANDLER!(TokenKind::Less, "<")),
                RegexPattern::new(r"^>", MK_DEFAULT_HANDLER!(TokenKind::Greater, ">")),
                RegexPattern::new(r"^=", MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=")),
                RegexPattern::new(r"^\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+")),
                RegexPattern::new(r"^-", MK_DEFAULT_HANDLER!(TokenKind::Dash, "-")),
                RegexPattern::new(r"^\*", MK_DEFAULT_HANDLER!(TokenKind::Star, "*")),
                RegexPattern::new(r"^%", MK_DEFAULT_HANDLER!(TokenKind::Percent, "%")),
                RegexPattern::new(r"^:", MK_DEFAULT_HANDLER!(TokenKind::Colon, ":")),
                RegexPattern::new(r"^,", MK_DEFAULT_HANDLER!(TokenKind::Comma, ",")),
                RegexPattern::new(r"^\.", MK_DEFAULT_HANDLER!(TokenKind::Dot, ".")),
            ],
            source,
            file: file_name,
            indent_stack: vec![0],
            paren_depth: 0,
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn position(&self) -> Position {
        Position(self.pos as u32, Rc::clone(&self.file))
    }

    /// Span of `len` bytes starting at the current position.
    pub fn span_of(&self, len: usize) -> Span {
        Span {
            start: self.position(),
            end: Position((self.pos + len) as u32, Rc::clone(&self.file)),
        }
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn last_kind(&self) -> Option<TokenKind> {
        self.tokens.last().map(|token| token.kind)
    }

    /// Ends the current logical line, collapsing blank lines.
    fn push_newline(&mut self) {
        match self.last_kind() {
            None | Some(TokenKind::Newline) => {}
            Some(_) => {
                let span = self.span_of(0);
                self.push(MK_TOKEN!(TokenKind::Newline, String::from("\\n"), span));
            }
        }
    }

    fn change_indentation(&mut self, width: usize) -> Result<(), Error> {
        let current = *self.indent_stack.last().unwrap_or(&0);

        if width > current {
            self.indent_stack.push(width);
            let span = self.span_of(0);
            self.push(MK_TOKEN!(TokenKind::Indent, String::from("<indent>"), span));
            return Ok(());
        }

        while width < *self.indent_stack.last().unwrap_or(&0) {
            self.indent_stack.pop();
            let span = self.span_of(0);
            self.push(MK_TOKEN!(TokenKind::Dedent, String::from("<dedent>"), span));
        }

        if width != *self.indent_stack.last().unwrap_or(&0) {
            return Err(Error::new(
                ErrorImpl::IndentationError {
                    message: String::from("unindent does not match any outer indentation level"),
                },
                self.position(),
            ));
        }

        Ok(())
    }
}

fn newline_handler(lexer: &mut Lexer, matched: &str) -> Result<(), Error> {
    lexer.advance_n(matched.len());

    if lexer.paren_depth > 0 {
        return Ok(());
    }

    lexer.push_newline();

    // Comment-only trailing lines and the end of input do not open blocks.
    if lexer.at_eof() || lexer.remainder().starts_with('#') {
        return Ok(());
    }

    let width = matched.len() - matched.rfind('\n').map(|i| i + 1).unwrap_or(0);
    lexer.change_indentation(width)
}

fn skip_handler(lexer: &mut Lexer, matched: &str) -> Result<(), Error> {
    lexer.advance_n(matched.len());
    Ok(())
}

fn number_handler(lexer: &mut Lexer, matched: &str) -> Result<(), Error> {
    let span = lexer.span_of(matched.len());
    lexer.push(MK_TOKEN!(TokenKind::Number, matched.to_string(), span));
    lexer.advance_n(matched.len());
    Ok(())
}

fn symbol_handler(lexer: &mut Lexer, matched: &str) -> Result<(), Error> {
    let kind = RESERVED_LOOKUP
        .get(matched)
        .copied()
        .unwrap_or(TokenKind::Identifier);
    let span = lexer.span_of(matched.len());

    lexer.push(MK_TOKEN!(kind, matched.to_string(), span));
    lexer.advance_n(matched.len());
    Ok(())
}

fn open_paren_handler(lexer: &mut Lexer, matched: &str) -> Result<(), Error> {
    lexer.paren_depth += 1;
    let span = lexer.span_of(matched.len());
    lexer.push(MK_TOKEN!(TokenKind::OpenParen, String::from("("), span));
    lexer.advance_n(matched.len());
    Ok(())
}

fn close_paren_handler(lexer: &mut Lexer, matched: &str) -> Result<(), Error> {
    lexer.paren_depth = lexer.paren_depth.saturating_sub(1);
    let span = lexer.span_of(matched.len());
    lexer.push(MK_TOKEN!(TokenKind::CloseParen, String::from(")"), span));
    lexer.advance_n(matched.len());
    Ok(())
}

pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file);

    while !lex.at_eof() {
        let matched = lex.patterns.iter().find_map(|pattern| {
            pattern
                .regex
                .find(lex.remainder())
                .map(|found| (pattern.handler, found.as_str().to_string()))
        });

        match matched {
            Some((handler, text)) => handler(&mut lex, &text)?,
            None => {
                let token = lex.remainder().chars().next().unwrap_or(' ').to_string();
                return Err(Error::new(
                    ErrorImpl::UnrecognisedToken { token },
                    lex.position(),
                ));
            }
        }
    }

    lex.push_newline();
    lex.change_indentation(0)?;

    let span = lex.span_of(0);
    lex.push(MK_TOKEN!(TokenKind::EOF, String::from("EOF"), span));
    Ok(lex.tokens)
}
