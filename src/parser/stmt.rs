use crate::{
    ast::{
        ast::{ClassDecl, FieldDecl, FnDecl, Param, Program, Using},
        statements::{Block, MatchArm, Pattern, Stmt},
        types::Type,
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
    Position,
};

use super::{parser::Parser, types::parse_type};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    if let Some(handler) = parser.get_stmt_lookup().get(&parser.current_token_kind()).copied() {
        return handler(parser);
    }

    let expr = parse_expr(parser, BindingPower::Default)?;

    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::Expr(expr))
}

/// Parses one top-level item into `program`: a `using` directive, a
/// function or a class.
///
/// Top-level functions and classes are public unless marked `priv`.
pub fn parse_top_level(parser: &mut Parser, program: &mut Program) -> Result<(), Error> {
    if parser.current_token_kind() == TokenKind::Using {
        program.usings.push(parse_using(parser)?);
        return Ok(());
    }

    let start = parser.get_position();
    let is_public = parse_visibility(parser).unwrap_or(true);

    match parser.current_token_kind() {
        TokenKind::Fn => {
            let function = parse_fn_decl(parser, start, is_public, false)?;
            program.functions.push(function);
        }
        TokenKind::Class => {
            let class = parse_class_decl(parser, start, is_public)?;
            program.classes.push(class);
        }
        _ => return Err(parser.unexpected("expected `using`, `fn` or `class` at top level")),
    }

    Ok(())
}

/// Consumes an optional `pub` / `priv` marker.
fn parse_visibility(parser: &mut Parser) -> Option<bool> {
    match parser.current_token_kind() {
        TokenKind::Pub => {
            parser.advance();
            Some(true)
        }
        TokenKind::Priv => {
            parser.advance();
            Some(false)
        }
        _ => None,
    }
}

/// `using Std.IO;`
pub fn parse_using(parser: &mut Parser) -> Result<Using, Error> {
    let start = parser.advance().span.start.clone();

    let error = parser.unexpected("expected module path after `using`");
    let mut path = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    while parser.current_token_kind() == TokenKind::Dot {
        parser.advance();
        let error = parser.unexpected("expected module path segment");
        path.push('.');
        path.push_str(&parser.expect_error(TokenKind::Identifier, Some(error))?.value);
    }

    parser.expect(TokenKind::Semicolon)?;

    Ok(Using {
        path,
        span: parser.span_from(start),
    })
}

/// `(a: int, b: float)`
pub fn parse_params(parser: &mut Parser) -> Result<Vec<Param>, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut parameters = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseParen {
        let error = parser.unexpected("expected parameter name");
        let name = parser.expect_error(TokenKind::Identifier, Some(error))?;
        parser.expect(TokenKind::Colon)?;
        let ty = parse_type(parser, BindingPower::Default)?;

        parameters.push(Param {
            name: name.value,
            ty,
            span: parser.span_from(name.span.start),
        });

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else {
            break;
        }
    }

    parser.expect(TokenKind::CloseParen)?;
    Ok(parameters)
}

pub fn parse_fn_decl(
    parser: &mut Parser,
    start: Position,
    is_public: bool,
    is_static: bool,
) -> Result<FnDecl, Error> {
    parser.expect(TokenKind::Fn)?;

    let error = parser.unexpected("expected function name");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?;

    let params = parse_params(parser)?;

    let return_type = if parser.current_token_kind() == TokenKind::Arrow {
        parser.advance();
        parse_type(parser, BindingPower::Default)?
    } else {
        Type::Void
    };

    let body = parse_block(parser)?;

    Ok(FnDecl {
        name: name.value,
        params,
        return_type,
        body,
        is_public,
        is_static,
        name_span: name.span,
        span: parser.span_from(start),
    })
}

/// Class members are private unless marked `pub`.
pub fn parse_class_decl(parser: &mut Parser, start: Position, is_public: bool) -> Result<ClassDecl, Error> {
    parser.expect(TokenKind::Class)?;

    let error = parser.unexpected("expected class name");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?;

    parser.expect(TokenKind::OpenCurly)?;

    let mut fields = Vec::new();
    let mut methods = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseCurly {
        let member_start = parser.get_position();
        let member_public = parse_visibility(parser).unwrap_or(false);
        let is_static = if parser.current_token_kind() == TokenKind::Static {
            parser.advance();
            true
        } else {
            false
        };

        match parser.current_token_kind() {
            TokenKind::Fn => {
                methods.push(parse_fn_decl(parser, member_start, member_public, is_static)?);
            }
            TokenKind::Identifier => {
                fields.push(parse_field_decl(parser, member_start, member_public, is_static)?);
            }
            _ => return Err(parser.unexpected("expected field or method declaration")),
        }
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(ClassDecl {
        name: name.value,
        fields,
        methods,
        is_public,
        name_span: name.span,
        span: parser.span_from(start),
    })
}

/// `name: type [= initializer];`
fn parse_field_decl(
    parser: &mut Parser,
    start: Position,
    is_public: bool,
    is_static: bool,
) -> Result<FieldDecl, Error> {
    let name = parser.expect(TokenKind::Identifier)?.value;
    parser.expect(TokenKind::Colon)?;
    let ty = parse_type(parser, BindingPower::Default)?;

    let initializer = if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    parser.expect(TokenKind::Semicolon)?;

    Ok(FieldDecl {
        name,
        ty,
        initializer,
        is_public,
        is_static,
        span: parser.span_from(start),
    })
}

pub fn parse_block(parser: &mut Parser) -> Result<Block, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?.span.start;

    let mut statements = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseCurly {
        if !parser.has_tokens() {
            return Err(parser.unexpected("expected `}` before end of file"));
        }
        statements.push(parse_stmt(parser)?);
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(Block {
        stmts: statements,
        span: parser.span_from(start),
    })
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    Ok(Stmt::Block(parse_block(parser)?))
}

pub fn parse_let_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let mutable = if parser.current_token_kind() == TokenKind::Mut {
        parser.advance();
        true
    } else {
        false
    };

    let error = parser.unexpected("expected identifier during variable declaration");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?;

    let ty = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        Some(parse_type(parser, BindingPower::Default)?)
    } else {
        None
    };

    let error = parser.unexpected("expected `=` and an initial value");
    parser.expect_error(TokenKind::Assignment, Some(error))?;
    let value = parse_expr(parser, BindingPower::Default)?;

    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::Let {
        name: name.value,
        mutable,
        ty,
        value,
        name_span: name.span,
        span: parser.span_from(start),
    })
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let value = if parser.current_token_kind() != TokenKind::Semicolon {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::Return {
        value,
        span: parser.span_from(start),
    })
}

/// `if (cond) { } else if (cond) { } else { }`. The parentheses are an
/// ordinary grouping expression.
pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let then_branch = parse_block(parser)?;

    let else_branch = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        if parser.current_token_kind() == TokenKind::If {
            Some(Box::new(parse_if_stmt(parser)?))
        } else {
            Some(Box::new(Stmt::Block(parse_block(parser)?)))
        }
    } else {
        None
    };

    Ok(Stmt::If {
        condition,
        then_branch,
        else_branch,
        span: parser.span_from(start),
    })
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;

    Ok(Stmt::While {
        condition,
        body,
        span: parser.span_from(start),
    })
}

/// `for (item in items) { }`
pub fn parse_for_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let parenthesised = parser.current_token_kind() == TokenKind::OpenParen;
    if parenthesised {
        parser.advance();
    }

    let error = parser.unexpected("expected loop variable");
    let variable = parser.expect_error(TokenKind::Identifier, Some(error))?;
    parser.expect(TokenKind::In)?;
    let iterable = parse_expr(parser, BindingPower::Default)?;

    if parenthesised {
        parser.expect(TokenKind::CloseParen)?;
    }

    let body = parse_block(parser)?;

    Ok(Stmt::For {
        variable: variable.value,
        variable_span: variable.span,
        iterable,
        body,
        span: parser.span_from(start),
    })
}

/// ```text
/// match value {
///     Some(x) => { ... },
///     None => println("none"),
/// }
/// ```
pub fn parse_match_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let scrutinee = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::OpenCurly)?;

    let mut arms = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseCurly {
        let arm_start = parser.get_position();
        let pattern = parse_pattern(parser)?;
        parser.expect(TokenKind::FatArrow)?;

        let body = if parser.current_token_kind() == TokenKind::OpenCurly {
            parse_block(parser)?
        } else {
            let expr = parse_expr(parser, BindingPower::Default)?;
            if parser.current_token_kind() == TokenKind::Semicolon {
                parser.advance();
            }
            Block {
                span: expr.span.clone(),
                stmts: vec![Stmt::Expr(expr)],
            }
        };

        arms.push(MatchArm {
            pattern,
            body,
            span: parser.span_from(arm_start),
        });

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        }
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(Stmt::Match {
        scrutinee,
        arms,
        span: parser.span_from(start),
    })
}

fn parse_pattern(parser: &mut Parser) -> Result<Pattern, Error> {
    match parser.current_token_kind() {
        TokenKind::Some => {
            parser.advance();
            parser.expect(TokenKind::OpenParen)?;
            let binding = parser.expect(TokenKind::Identifier)?;
            parser.expect(TokenKind::CloseParen)?;
            Ok(Pattern::Some {
                binding: binding.value,
                span: binding.span,
            })
        }
        TokenKind::None => {
            parser.advance();
            Ok(Pattern::None)
        }
        TokenKind::Identifier if parser.current_token().value == "_" => {
            parser.advance();
            Ok(Pattern::Wildcard)
        }
        _ => Err(parser.unexpected("expected `Some(..)`, `None` or `_` pattern")),
    }
}

