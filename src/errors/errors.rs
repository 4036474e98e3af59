use std::fmt::Display;

use thiserror::Error;

use crate::{Position, Span};

/// A diagnostic produced anywhere in the front-end, carrying the source span
/// it refers to.
#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    span: Span,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, span: Span) -> Self {
        Error {
            internal_error: error_impl,
            span,
        }
    }

    pub fn get_span(&self) -> &Span {
        &self.span
    }

    pub fn get_position(&self) -> &Position {
        &self.span.start
    }

    pub fn get_internal(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::ModuleNotFound { .. } => "ModuleNotFound",
            ErrorImpl::ModuleConflict { .. } => "ModuleConflict",
            ErrorImpl::UndefinedIdentifier { .. } => "UndefinedIdentifier",
            ErrorImpl::UndefinedClass { .. } => "UndefinedClass",
            ErrorImpl::VisibilityViolation { .. } => "VisibilityViolation",
            ErrorImpl::TypeMismatch { .. } => "TypeMismatch",
            ErrorImpl::ArityMismatch { .. } => "ArityMismatch",
            ErrorImpl::UnknownMember { .. } => "UnknownMember",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::ModuleNotFound { path } => ErrorTip::Suggestion(format!(
                "Cannot find module `{}`, check the `using` path and the package's src/ layout",
                path
            )),
            ErrorImpl::ModuleConflict {
                path,
                existing,
                incoming,
            } => ErrorTip::Suggestion(format!(
                "Module `{}` is provided by both `{}` and `{}`",
                path, existing, incoming
            )),
            ErrorImpl::UndefinedIdentifier { name } => {
                ErrorTip::Suggestion(format!("`{}` is not declared in this scope", name))
            }
            ErrorImpl::UndefinedClass { name } => {
                ErrorTip::Suggestion(format!("No class named `{}` in any loaded module", name))
            }
            ErrorImpl::VisibilityViolation { name, module } => ErrorTip::Suggestion(format!(
                "`{}` is private to `{}`, mark it `pub` to use it here",
                name, module
            )),
            ErrorImpl::TypeMismatch { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::ArityMismatch {
                name,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "`{}` expects {} arguments, received {}",
                name, expected, received
            )),
            ErrorImpl::UnknownMember { type_, member } => {
                ErrorTip::Suggestion(format!("Type `{}` has no member `{}`", type_, member))
            }
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.internal_error)
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("cannot find module: {path}")]
    ModuleNotFound { path: String },
    #[error("module {path:?} registered by both {existing:?} and {incoming:?}")]
    ModuleConflict {
        path: String,
        existing: String,
        incoming: String,
    },
    #[error("undefined identifier: {name}")]
    UndefinedIdentifier { name: String },
    #[error("undefined class: {name}")]
    UndefinedClass { name: String },
    #[error("{name:?} is private to module {module:?}")]
    VisibilityViolation { name: String, module: String },
    #[error("types do not match: expected {expected:?}, received {received:?}")]
    TypeMismatch { expected: String, received: String },
    #[error("wrong number of arguments to {name:?}: expected {expected}, received {received}")]
    ArityMismatch {
        name: String,
        expected: usize,
        received: usize,
    },
    #[error("type {type_:?} has no member {member:?}")]
    UnknownMember { type_: String, member: String },
}
