//! Unit tests for error handling.
//!
//! This module contains tests for error names, tips and messages.

use crate::errors::errors::{Error, ErrorImpl, ErrorTip};
use crate::{Position, Span};
use std::rc::Rc;

fn span_at(offset: u32) -> Span {
    let file = Rc::new("test.mg".to_string());
    Span {
        start: Position(offset, Rc::clone(&file)),
        end: Position(offset + 1, file),
    }
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        span_at(10),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
}

#[test]
fn test_error_position() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "identifier".to_string(),
        },
        span_at(42),
    );

    assert_eq!(error.get_position().0, 42);
    assert_eq!(error.get_span().end.0, 43);
    assert_eq!(error.get_span().file(), "test.mg");
}

#[test]
fn test_module_not_found_message_cites_path() {
    let error = Error::new(
        ErrorImpl::ModuleNotFound {
            path: "nonexistent.module".to_string(),
        },
        span_at(0),
    );

    assert_eq!(error.get_error_name(), "ModuleNotFound");
    assert_eq!(error.to_string(), "cannot find module: nonexistent.module");
}

#[test]
fn test_module_conflict_names_both_packages() {
    let error = Error::new(
        ErrorImpl::ModuleConflict {
            path: "json".to_string(),
            existing: "serde_mg".to_string(),
            incoming: "fastjson".to_string(),
        },
        span_at(0),
    );

    assert_eq!(error.get_error_name(), "ModuleConflict");
    let tip = error.get_tip().to_string();
    assert!(tip.contains("serde_mg"));
    assert!(tip.contains("fastjson"));
}

#[test]
fn test_type_mismatch_error() {
    let error = Error::new(
        ErrorImpl::TypeMismatch {
            expected: "int".to_string(),
            received: "string".to_string(),
        },
        span_at(0),
    );

    assert_eq!(error.get_error_name(), "TypeMismatch");
    assert_eq!(
        error.get_tip().to_string(),
        "Expected type `int`, received `string`"
    );
}

#[test]
fn test_arity_mismatch_error() {
    let error = Error::new(
        ErrorImpl::ArityMismatch {
            name: "volume".to_string(),
            expected: 3,
            received: 2,
        },
        span_at(0),
    );

    assert_eq!(error.get_error_name(), "ArityMismatch");
    assert!(matches!(
        error.get_internal(),
        ErrorImpl::ArityMismatch {
            expected: 3,
            received: 2,
            ..
        }
    ));
}

#[test]
fn test_resolution_error_names() {
    let cases = [
        (
            ErrorImpl::UndefinedIdentifier {
                name: "foo".to_string(),
            },
            "UndefinedIdentifier",
        ),
        (
            ErrorImpl::UndefinedClass {
                name: "Point".to_string(),
            },
            "UndefinedClass",
        ),
        (
            ErrorImpl::VisibilityViolation {
                name: "helper".to_string(),
                module: "utils".to_string(),
            },
            "VisibilityViolation",
        ),
        (
            ErrorImpl::UnknownMember {
                type_: "Point".to_string(),
                member: "z".to_string(),
            },
            "UnknownMember",
        ),
    ];

    for (error_impl, name) in cases {
        assert_eq!(Error::new(error_impl, span_at(0)).get_error_name(), name);
    }
}

#[test]
fn test_error_tip_none() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        span_at(0),
    );

    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_tip_suggestion() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "}".to_string(),
        },
        span_at(0),
    );

    match error.get_tip() {
        ErrorTip::Suggestion(_) => (),
        _ => panic!("Expected suggestion tip"),
    }
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}
