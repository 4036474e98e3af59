//! Type parsing implementation.
//!
//! This module handles parsing of type annotations. It supports:
//!
//! - Primitive types (`int`, `float`, `string`, `bool`, `void`)
//! - Class names
//! - Generic wrappers (`Option<T>`, `Array<T>`)
//! - Array suffixes (`T[]`)
//! - Function types (`fn(int, int) -> int`)
//!
//! Similar to expression parsing, it uses NUD/LED handlers with
//! binding powers for parsing compound type expressions.

use std::collections::HashMap;

use crate::{
    ast::types::Type,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{lookups::BindingPower, parser::Parser};

/// Type alias for type null denotation handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<Type, Error>;

/// Type alias for type left denotation handler functions.
pub type TypeLEDHandler = fn(&mut Parser, Type, BindingPower) -> Result<Type, Error>;

/// Type alias for type NUD lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

/// Type alias for type LED lookup table.
pub type TypeLEDLookup = HashMap<TokenKind, TypeLEDHandler>;

/// Type alias for type binding power lookup table.
pub type TypeBPLookup = HashMap<TokenKind, BindingPower>;

/// Initializes the type parsing lookup tables.
///
/// Registers NUD and LED handlers for parsing type expressions.
///
/// # Arguments
///
/// * `parser` - Mutable reference to the parser to initialize
pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::IntType, parse_primitive_type);
    parser.type_nud(TokenKind::FloatType, parse_primitive_type);
    parser.type_nud(TokenKind::StringType, parse_primitive_type);
    parser.type_nud(TokenKind::BoolType, parse_primitive_type);
    parser.type_nud(TokenKind::VoidType, parse_primitive_type);
    parser.type_nud(TokenKind::Identifier, parse_symbol_type);
    parser.type_nud(TokenKind::Fn, parse_function_type);
    parser.type_led(TokenKind::OpenBracket, BindingPower::Call, parse_array_type);
}

pub fn parse_primitive_type(parser: &mut Parser) -> Result<Type, Error> {
    let token = parser.advance().clone();
    Ok(match token.kind {
        TokenKind::IntType => Type::Int,
        TokenKind::FloatType => Type::Float,
        TokenKind::StringType => Type::String,
        TokenKind::BoolType => Type::Bool,
        TokenKind::VoidType => Type::Void,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: token.value },
                token.span,
            ))
        }
    })
}

/// A class name, or one of the generic wrappers `Option<T>` / `Array<T>`.
pub fn parse_symbol_type(parser: &mut Parser) -> Result<Type, Error> {
    let token = parser.expect(TokenKind::Identifier)?;

    let wrapper: Option<fn(Type) -> Type> = match token.value.as_str() {
        "Option" => Some(Type::option),
        "Array" => Some(Type::array),
        _ => None,
    };

    match wrapper {
        Some(wrap) if parser.current_token_kind() == TokenKind::Less => {
            parser.advance();
            let inner = parse_type(parser, BindingPower::Default)?;
            parser.expect(TokenKind::Greater)?;
            Ok(wrap(inner))
        }
        _ => Ok(Type::Class { name: token.value }),
    }
}

/// `fn(int, string) -> bool`
pub fn parse_function_type(parser: &mut Parser) -> Result<Type, Error> {
    parser.expect(TokenKind::Fn)?;
    parser.expect(TokenKind::OpenParen)?;

    let mut params = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        params.push(parse_type(parser, BindingPower::Default)?);

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else {
            break;
        }
    }
    parser.expect(TokenKind::CloseParen)?;

    let ret = if parser.current_token_kind() == TokenKind::Arrow {
        parser.advance();
        parse_type(parser, BindingPower::Default)?
    } else {
        Type::Void
    };

    Ok(Type::Function {
        params,
        ret: Box::new(ret),
    })
}

pub fn parse_array_type(
    parser: &mut Parser,
    left: Type,
    _bp: BindingPower,
) -> Result<Type, Error> {
    parser.expect(TokenKind::OpenBracket)?;
    parser.expect(TokenKind::CloseBracket)?;

    Ok(Type::array(left))
}

pub fn parse_type(parser: &mut Parser, bp: BindingPower) -> Result<Type, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_type_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.unexpected("expected a type"));
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let next_bp = parser
            .get_type_bp_lookup()
            .get(&token_kind)
            .copied()
            .unwrap_or(BindingPower::Default);

        if next_bp <= bp {
            break;
        }

        let Some(led) = parser.get_type_led_lookup().get(&token_kind).copied() else {
            return Err(parser.unexpected("unexpected token in type"));
        };

        left = led(parser, left, next_bp)?;
    }

    Ok(left)
}
