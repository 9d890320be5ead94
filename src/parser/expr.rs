use crate::{
    ast::{
        ast::Expr,
        expressions::{BinaryOp, ExprKind, UnaryOp},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Span,
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr<()>, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: parser.current_token().value.clone(),
                },
                parser.get_position(),
            ))
        }
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    while parser.current_binding_power() > bp {
        let token_kind = parser.current_token_kind();
        let led = match parser.get_led_lookup().get(&token_kind) {
            Some(led) => *led,
            None => {
                return Err(Error::new(
                    ErrorImpl::UnexpectedToken {
                        token: parser.current_token().value.clone(),
                    },
                    parser.get_position(),
                ))
            }
        };

        let token_bp = parser.current_binding_power();
        left = led(parser, left, token_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr<()>, Error> {
    let token = parser.current_token().clone();
    let kind = match token.kind {
        TokenKind::Number => match token.value.parse::<i64>() {
            Ok(value) => ExprKind::Number(value),
            Err(_) => {
                return Err(Error::new(
                    ErrorImpl::NumberParseError {
                        token: token.value.clone(),
                    },
                    token.span.start.clone(),
                ))
            }
        },
        TokenKind::Identifier => ExprKind::Id {
            name: token.value.clone(),
            global: false,
        },
        TokenKind::True => ExprKind::True,
        TokenKind::False => ExprKind::False,
        TokenKind::None => ExprKind::None,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: token.value.clone(),
                },
                token.span.start.clone(),
            ))
        }
    };

    parser.advance();
    Ok(Expr::new(kind, token.span))
}

pub fn parse_binary_expr(
    parser: &mut Parser,
    left: Expr<()>,
    bp: BindingPower,
) -> Result<Expr<()>, Error> {
    let operator_token = parser.advance().clone();
    let op = BinaryOp::from_token(operator_token.kind).ok_or_else(|| {
        Error::new(
            ErrorImpl::UnexpectedToken {
                token: operator_token.value.clone(),
            },
            operator_token.span.start.clone(),
        )
    })?;

    let right = parse_expr(parser, bp)?;
    let span = Span {
        start: left.span.start.clone(),
        end: right.span.end.clone(),
    };

    Ok(Expr::new(
        ExprKind::Binary {
            op,
            lhs: Box::new(left),
            rhs: Box::new(right),
        },
        span,
    ))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr<()>, Error> {
    let operator_token = parser.advance().clone();
    let (op, bp) = match operator_token.kind {
        TokenKind::Not => (UnaryOp::Not, BindingPower::Not),
        _ => (UnaryOp::Neg, BindingPower::Unary),
    };

    let rhs = parse_expr(parser, bp)?;
    let end = rhs.span.end.clone();

    Ok(Expr::new(
        ExprKind::Unary {
            op,
            operand: Box::new(rhs),
        },
        Span {
            start: operator_token.span.start,
            end,
        },
    ))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr<()>, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

pub fn parse_call_expr(
    parser: &mut Parser,
    left: Expr<()>,
    _bp: BindingPower,
) -> Result<Expr<()>, Error> {
    let open = parser.advance().clone();

    let mut args = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        args.push(parse_expr(parser, BindingPower::Default)?);

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else {
            break;
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    let span = Span {
        start: left.span.start.clone(),
        end: parser.previous_end(),
    };

    let kind = match left.kind {
        ExprKind::Id { name, .. } => ExprKind::Call { name, args },
        ExprKind::Field { object, field } => ExprKind::MethodCall {
            object,
            method: field,
            args,
        },
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: open.value,
                    message: String::from("only functions and methods can be called"),
                },
                open.span.start,
            ))
        }
    };

    Ok(Expr::new(kind, span))
}

pub fn parse_member_expr(
    parser: &mut Parser,
    left: Expr<()>,
    _bp: BindingPower,
) -> Result<Expr<()>, Error> {
    parser.advance();

    let error = parser.unexpected("expected a field or method name after `.`");
    let member = parser.expect_error(TokenKind::Identifier, Some(error))?;

    let span = Span {
        start: left.span.start.clone(),
        end: member.span.end,
    };

    Ok(Expr::new(
        ExprKind::Field {
            object: Box::new(left),
            field: member.value,
        },
        span,
    ))
}
