use crate::{
    ast::{
        expressions::{BinaryOp, Expr, ExprKind, InterpolationPart, UnaryOp},
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::{lexer::unescape, tokens::TokenKind},
    Span,
};

use super::{
    lookups::BindingPower,
    parser::{parse_expression_source, Parser},
    stmt::{parse_block, parse_params},
    types::parse_type,
};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: parser.current_token().value.clone(),
            },
            parser.current_token().span.clone(),
        ));
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let next_bp = parser
            .get_bp_lookup()
            .get(&token_kind)
            .copied()
            .unwrap_or(BindingPower::Default);

        if next_bp <= bp {
            break;
        }

        let Some(led) = parser.get_led_lookup().get(&token_kind).copied() else {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: parser.current_token().value.clone(),
                },
                parser.current_token().span.clone(),
            ));
        };

        left = led(parser, left, next_bp)?;
    }

    Ok(left)
}

fn make_expr(parser: &mut Parser, kind: ExprKind, span: Span) -> Expr {
    Expr {
        id: parser.advance_id(),
        kind,
        span,
    }
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.advance().clone();

    let kind = match token.kind {
        TokenKind::Int => match token.value.parse() {
            Ok(value) => ExprKind::Int(value),
            Err(_) => {
                return Err(Error::new(
                    ErrorImpl::NumberParseError { token: token.value },
                    token.span,
                ))
            }
        },
        TokenKind::Float => match token.value.parse() {
            Ok(value) => ExprKind::Float(value),
            Err(_) => {
                return Err(Error::new(
                    ErrorImpl::NumberParseError { token: token.value },
                    token.span,
                ))
            }
        },
        TokenKind::String => ExprKind::Str(token.value.clone()),
        TokenKind::True => ExprKind::Bool(true),
        TokenKind::False => ExprKind::Bool(false),
        TokenKind::None => ExprKind::NoneLit,
        TokenKind::This => ExprKind::This,
        TokenKind::Identifier => ExprKind::Ident(token.value.clone()),
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: token.value },
                token.span,
            ))
        }
    };

    Ok(make_expr(parser, kind, token.span))
}

/// `$"text {expr} text"`. Each hole is parsed as a full expression with spans
/// pointing back into the literal.
pub fn parse_interpolated_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.expect(TokenKind::InterpolatedString)?;
    let raw = token.value.as_str();
    // Body begins after `$"`.
    let body_offset = token.span.start.0 + 2;

    let mut parts = vec![];
    let mut text = String::new();
    let mut chars = raw.char_indices();

    while let Some((i, ch)) = chars.next() {
        match ch {
            '\\' => {
                text.push(ch);
                if let Some((_, escaped)) = chars.next() {
                    text.push(escaped);
                }
            }
            '{' => {
                if !text.is_empty() {
                    parts.push(InterpolationPart::Text(unescape(&text)));
                    text.clear();
                }

                let hole_start = i + 1;
                let hole_end = chars.by_ref().find(|(_, c)| *c == '}').map(|(j, _)| j);
                let Some(hole_end) = hole_end else {
                    return Err(Error::new(
                        ErrorImpl::UnexpectedTokenDetailed {
                            token: token.value.clone(),
                            message: String::from("unterminated `{` in interpolated string"),
                        },
                        token.span.clone(),
                    ));
                };

                let hole = parse_expression_source(
                    &raw[hole_start..hole_end],
                    parser.get_file(),
                    body_offset + hole_start as u32,
                )?;
                parts.push(InterpolationPart::Hole(hole));
            }
            _ => text.push(ch),
        }
    }

    if !text.is_empty() {
        parts.push(InterpolationPart::Text(unescape(&text)));
    }

    Ok(make_expr(parser, ExprKind::Interpolated(parts), token.span))
}

pub fn parse_some_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start.clone();
    parser.expect(TokenKind::OpenParen)?;
    let inner = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    let span = parser.span_from(start);
    Ok(make_expr(parser, ExprKind::Some(Box::new(inner)), span))
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Dash => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::Equals => BinaryOp::Eq,
        TokenKind::NotEquals => BinaryOp::NotEq,
        TokenKind::Less => BinaryOp::Less,
        TokenKind::LessEquals => BinaryOp::LessEq,
        TokenKind::Greater => BinaryOp::Greater,
        TokenKind::GreaterEquals => BinaryOp::GreaterEq,
        TokenKind::And => BinaryOp::And,
        TokenKind::Or => BinaryOp::Or,
        _ => return None,
    })
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let Some(op) = binary_op(operator_token.kind) else {
        return Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: operator_token.value,
            },
            operator_token.span,
        ));
    };

    let right = parse_expr(parser, bp)?;

    let span = Span {
        start: left.span.start.clone(),
        end: right.span.end.clone(),
    };
    Ok(make_expr(
        parser,
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    ))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let op = if operator_token.kind == TokenKind::Not {
        UnaryOp::Not
    } else {
        UnaryOp::Negate
    };

    let rhs = parse_expr(parser, BindingPower::Unary)?;

    let span = Span {
        start: operator_token.span.start.clone(),
        end: rhs.span.end.clone(),
    };
    Ok(make_expr(
        parser,
        ExprKind::Unary {
            op,
            operand: Box::new(rhs),
        },
        span,
    ))
}

pub fn parse_assignment_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    // Right associative: `a = b = c` assigns `b = c` to `a`.
    let rhs = parse_expr(parser, BindingPower::Comma)?;

    let span = Span {
        start: left.span.start.clone(),
        end: rhs.span.end.clone(),
    };
    Ok(make_expr(
        parser,
        ExprKind::Assign {
            target: Box::new(left),
            value: Box::new(rhs),
        },
        span,
    ))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

/// Parses a comma separated expression list up to and including `close`.
pub fn parse_arguments(parser: &mut Parser, close: TokenKind) -> Result<Vec<Expr>, Error> {
    let mut args = vec![];

    while parser.current_token_kind() != close {
        args.push(parse_expr(parser, BindingPower::Comma)?);

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else {
            break;
        }
    }

    parser.expect(close)?;
    Ok(args)
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    let args = parse_arguments(parser, TokenKind::CloseParen)?;

    let span = parser.span_from(left.span.start.clone());
    Ok(make_expr(
        parser,
        ExprKind::Call {
            callee: Box::new(left),
            args,
        },
        span,
    ))
}

pub fn parse_index_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    let index = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseBracket)?;

    let span = parser.span_from(left.span.start.clone());
    Ok(make_expr(
        parser,
        ExprKind::Index {
            object: Box::new(left),
            index: Box::new(index),
        },
        span,
    ))
}

pub fn parse_member_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    let error = parser.unexpected("expected member name after `.`");
    let member = parser.expect_error(TokenKind::Identifier, Some(error))?;

    let span = Span {
        start: left.span.start.clone(),
        end: member.span.end.clone(),
    };
    Ok(make_expr(
        parser,
        ExprKind::Member {
            object: Box::new(left),
            member: member.value,
            member_span: member.span,
        },
        span,
    ))
}

/// `new Point(1, 2)`
pub fn parse_new_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start_pos = parser.advance().span.start.clone();

    let error = parser.unexpected("expected class name after `new`");
    let class = parser.expect_error(TokenKind::Identifier, Some(error))?;

    parser.expect(TokenKind::OpenParen)?;
    let args = parse_arguments(parser, TokenKind::CloseParen)?;

    let span = parser.span_from(start_pos);
    Ok(make_expr(
        parser,
        ExprKind::New {
            class: class.value,
            class_span: class.span,
            args,
        },
        span,
    ))
}

/// `[1, 2, 3]`
pub fn parse_array_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start_pos = parser.advance().span.start.clone();
    let elements = parse_arguments(parser, TokenKind::CloseBracket)?;

    let span = parser.span_from(start_pos);
    Ok(make_expr(parser, ExprKind::Array(elements), span))
}

/// `fn(x: int) -> int { return x * 2; }`
pub fn parse_lambda_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start_pos = parser.advance().span.start.clone();
    let params = parse_params(parser)?;

    let return_type = if parser.current_token_kind() == TokenKind::Arrow {
        parser.advance();
        parse_type(parser, BindingPower::Default)?
    } else {
        Type::Void
    };

    let body = parse_block(parser)?;

    let span = parser.span_from(start_pos);
    Ok(make_expr(
        parser,
        ExprKind::Lambda {
            params,
            return_type,
            body,
        },
        span,
    ))
}
