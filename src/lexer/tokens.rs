use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("fn", TokenKind::Fn);
        map.insert("let", TokenKind::Let);
        map.insert("mut", TokenKind::Mut);
        map.insert("return", TokenKind::Return);
        map.insert("if", TokenKind::If);
        map.insert("else", TokenKind::Else);
        map.insert("while", TokenKind::While);
        map.insert("for", TokenKind::For);
        map.insert("in", TokenKind::In);
        map.insert("match", TokenKind::Match);
        map.insert("class", TokenKind::Class);
        map.insert("new", TokenKind::New);
        map.insert("this", TokenKind::This);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map.insert("None", TokenKind::None);
        map.insert("Some", TokenKind::Some);
        map.insert("using", TokenKind::Using);
        map.insert("pub", TokenKind::Pub);
        map.insert("priv", TokenKind::Priv);
        map.insert("static", TokenKind::Static);
        map.insert("int", TokenKind::IntType);
        map.insert("float", TokenKind::FloatType);
        map.insert("string", TokenKind::StringType);
        map.insert("bool", TokenKind::BoolType);
        map.insert("void", TokenKind::VoidType);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Int,
    Float,
    String,
    InterpolatedString,
    Identifier,

    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment, // =
    Equals,     // ==
    Not,        // !
    NotEquals,  // !=

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Or,
    And,

    Dot,
    Semicolon,
    Colon,
    Comma,
    Arrow,    // ->
    FatArrow, // =>

    Plus,
    Dash,
    Slash,
    Star,
    Percent,

    // Reserved
    Fn,
    Let,
    Mut,
    Return,
    If,
    Else,
    While,
    For,
    In,
    Match,
    Class,
    New,
    This,
    True,
    False,
    None,
    Some,
    Using,
    Pub,
    Priv,
    Static,

    // Primitive type names
    IntType,
    FloatType,
    StringType,
    BoolType,
    VoidType,
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
    pub fn is_one_of_many(&self, tokens: &[TokenKind]) -> bool {
        tokens.contains(&self.kind)
    }

    /// Whether this token names a type in annotation position.
    pub fn is_primitive_type(&self) -> bool {
        self.is_one_of_many(&[
            TokenKind::IntType,
            TokenKind::FloatType,
            TokenKind::StringType,
            TokenKind::BoolType,
            TokenKind::VoidType,
        ])
    }
}
