use crate::{
    ast::{
        ast::{Expr, Stmt},
        expressions::ExprKind,
        statements::{FieldDecl, FunDef, Parameter, StmtKind},
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
    Position, Span,
};

use super::{parser::Parser, types::parse_type};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt<()>, Error> {
    let handler = parser
        .get_stmt_lookup()
        .get(&parser.current_token_kind())
        .copied();
    if let Some(handler) = handler {
        return handler(parser);
    }

    parse_simple_stmt(parser)
}

/// Declarations, assignments and expression statements all start with an
/// expression; the token after it decides which one this is.
fn parse_simple_stmt(parser: &mut Parser) -> Result<Stmt<()>, Error> {
    let expr = parse_expr(parser, BindingPower::Default)?;
    let start = expr.span.start.clone();

    let kind = match parser.current_token_kind() {
        TokenKind::Colon => {
            let name = match &expr.kind {
                ExprKind::Id { name, .. } => name.clone(),
                _ => return Err(parser.unexpected("only variables can be declared")),
            };
            parser.advance();
            let typ = parse_type(parser)?;

            let error = parser.unexpected("variable declarations need an initial value");
            parser.expect_error(TokenKind::Assignment, Some(error))?;
            let init = parse_expr(parser, BindingPower::Default)?;

            StmtKind::VarInit { name, typ, init }
        }
        TokenKind::Assignment => {
            parser.advance();
            let value = parse_expr(parser, BindingPower::Default)?;

            StmtKind::Assign {
                target: expr,
                value,
            }
        }
        _ => StmtKind::Expr(expr),
    };

    let end = parser.previous_end();
    parser.expect(TokenKind::Newline)?;

    Ok(Stmt::new(kind, Span { start, end }))
}

/// Parses `: NEWLINE INDENT stmt+ DEDENT` or `: stmt` on the same line.
fn parse_suite(parser: &mut Parser) -> Result<Vec<Stmt<()>>, Error> {
    parser.expect(TokenKind::Colon)?;

    if parser.current_token_kind() != TokenKind::Newline {
        return Ok(vec![parse_stmt(parser)?]);
    }

    parser.advance();
    let error = parser.unexpected("expected an indented block");
    parser.expect_error(TokenKind::Indent, Some(error))?;

    let mut body = vec![];
    while !parser
        .current_token()
        .is_one_of(&[TokenKind::Dedent, TokenKind::EOF])
    {
        body.push(parse_stmt(parser)?);
    }

    parser.expect(TokenKind::Dedent)?;
    Ok(body)
}

fn span_from(parser: &Parser, start: Position) -> Span {
    Span {
        start,
        end: parser.previous_end(),
    }
}

pub fn parse_pass_stmt(parser: &mut Parser) -> Result<Stmt<()>, Error> {
    let start = parser.advance().span.start.clone();
    let span = span_from(parser, start);
    parser.expect(TokenKind::Newline)?;

    Ok(Stmt::new(StmtKind::Pass, span))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt<()>, Error> {
    let token = parser.advance().clone();

    let value = if parser.current_token_kind() == TokenKind::Newline {
        Expr::new(ExprKind::None, token.span.clone())
    } else {
        parse_expr(parser, BindingPower::Default)?
    };

    let span = span_from(parser, token.span.start);
    parser.expect(TokenKind::Newline)?;

    Ok(Stmt::new(StmtKind::Return(value), span))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Stmt<()>, Error> {
    let start = parser.advance().span.start.clone();

    let cond = parse_expr(parser, BindingPower::Default)?;
    let body = parse_suite(parser)?;

    Ok(Stmt::new(
        StmtKind::While { cond, body },
        span_from(parser, start),
    ))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt<()>, Error> {
    let start = parser.advance().span.start.clone();

    let cond = parse_expr(parser, BindingPower::Default)?;
    let body = parse_suite(parser)?;

    let mut elifs = vec![];
    while parser.current_token_kind() == TokenKind::Elif {
        parser.advance();
        let elif_cond = parse_expr(parser, BindingPower::Default)?;
        let elif_body = parse_suite(parser)?;
        elifs.push((elif_cond, elif_body));
    }

    let else_body = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        parse_suite(parser)?
    } else {
        vec![]
    };

    Ok(Stmt::new(
        StmtKind::If {
            cond,
            body,
            elifs,
            else_body,
        },
        span_from(parser, start),
    ))
}

pub fn parse_fn_def_stmt(parser: &mut Parser) -> Result<Stmt<()>, Error> {
    let def = parse_fn_def(parser)?;
    let span = def.span.clone();

    Ok(Stmt::new(StmtKind::Define(def), span))
}

/// Parses a `def`. Inside a class body the first parameter may be a bare
/// `self`, which is typed as the enclosing class.
fn parse_fn_def(parser: &mut Parser) -> Result<FunDef<()>, Error> {
    let start = parser.advance().span.start.clone();

    let error = parser.unexpected("expected a function name");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    parser.expect(TokenKind::OpenParen)?;

    let mut params: Vec<Parameter> = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseParen {
        let error = parser.unexpected("expected a parameter name");
        let param = parser.expect_error(TokenKind::Identifier, Some(error))?;

        let (typ, annotated) = if parser.current_token_kind() == TokenKind::Colon {
            parser.advance();
            (parse_type(parser)?, true)
        } else {
            match parser.current_class() {
                Some(class) if params.is_empty() && param.value == "self" => {
                    (Type::Object(class.to_string()), false)
                }
                _ => return Err(parser.unexpected("expected a type annotation")),
            }
        };

        params.push(Parameter {
            name: param.value,
            typ,
            annotated,
        });

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else {
            break;
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    let ret = if parser.current_token_kind() == TokenKind::Arrow {
        parser.advance();
        parse_type(parser)?
    } else {
        Type::None
    };

    // Only the signature sees the enclosing class.
    let outer_class = parser.set_current_class(None);
    let body = parse_suite(parser);
    parser.set_current_class(outer_class);

    Ok(FunDef {
        name,
        params,
        ret,
        body: body?,
        span: span_from(parser, start),
    })
}

pub fn parse_class_stmt(parser: &mut Parser) -> Result<Stmt<()>, Error> {
    let start = parser.advance().span.start.clone();

    let error = parser.unexpected("expected a class name");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    if parser.current_token_kind() == TokenKind::OpenParen {
        parser.advance();
        let base = parser.expect(TokenKind::Identifier)?;
        if base.value != "object" {
            return Err(Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: base.value,
                    message: String::from("classes may only inherit from `object`"),
                },
                base.span.start,
            ));
        }
        parser.expect(TokenKind::CloseParen)?;
    }

    parser.expect(TokenKind::Colon)?;

    let mut fields = vec![];
    let mut methods = vec![];

    let outer_class = parser.set_current_class(Some(name.clone()));
    let result = parse_class_body(parser, &mut fields, &mut methods);
    parser.set_current_class(outer_class);
    result?;

    Ok(Stmt::new(
        StmtKind::Class {
            name,
            fields,
            methods,
        },
        span_from(parser, start),
    ))
}

fn parse_class_body(
    parser: &mut Parser,
    fields: &mut Vec<FieldDecl<()>>,
    methods: &mut Vec<FunDef<()>>,
) -> Result<(), Error> {
    if parser.current_token_kind() != TokenKind::Newline {
        return parse_class_member(parser, fields, methods);
    }

    parser.advance();
    let error = parser.unexpected("expected an indented class body");
    parser.expect_error(TokenKind::Indent, Some(error))?;

    while !parser
        .current_token()
        .is_one_of(&[TokenKind::Dedent, TokenKind::EOF])
    {
        parse_class_member(parser, fields, methods)?;
    }

    parser.expect(TokenKind::Dedent)?;
    Ok(())
}

fn parse_class_member(
    parser: &mut Parser,
    fields: &mut Vec<FieldDecl<()>>,
    methods: &mut Vec<FunDef<()>>,
) -> Result<(), Error> {
    match parser.current_token_kind() {
        TokenKind::Def => methods.push(parse_fn_def(parser)?),
        TokenKind::Pass => {
            parse_pass_stmt(parser)?;
        }
        _ => {
            let stmt = parse_stmt(parser)?;
            match stmt.kind {
                StmtKind::VarInit { name, typ, init } => fields.push(FieldDecl {
                    name,
                    typ,
                    init,
                    span: stmt.span,
                }),
                other => {
                    return Err(Error::new(
                        ErrorImpl::UnsupportedStatement {
                            statement: format!("{} in a class body", other.describe()),
                        },
                        stmt.span.start,
                    ))
                }
            }
        }
    }

    Ok(())
}
