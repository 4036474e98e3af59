//! Lexical analysis module for the front-end.
//!
//! This module contains the lexer (tokenizer) that converts Magolor source
//! into a stream of tokens for parsing. It handles:
//!
//! - Tokenization of source code using anchored regex patterns
//! - Recognition of keywords, identifiers, literals, and operators
//! - Plain and interpolated (`$"..."`) string literals
//! - Token span tracking for error reporting
//! - Comments and whitespace handling

pub mod lexer;
pub mod tokens;
