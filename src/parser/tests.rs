//! Unit tests for the parser module.
//!
//! This module contains tests for parsing Magolor constructs including:
//! - `using` directives
//! - Function and class declarations with visibility
//! - Expressions and operator precedence
//! - Control flow statements and `match`
//! - Type annotations

use std::rc::Rc;

use crate::ast::ast::Program;
use crate::ast::expressions::{BinaryOp, ExprKind, InterpolationPart};
use crate::ast::statements::{Pattern, Stmt};
use crate::ast::types::Type;
use crate::errors::errors::Error;
use crate::lexer::lexer::tokenize;

use super::parser::parse;

fn parse_source(source: &str) -> Result<Program, Error> {
    let tokens = tokenize(source.to_string(), Some("test.mg".to_string())).unwrap();
    parse(tokens, Rc::new("test.mg".to_string()))
}

fn body_of(source: &str) -> Vec<Stmt> {
    let program = parse_source(source).unwrap();
    program.functions[0].body.stmts.clone()
}

#[test]
fn test_parse_using_directives() {
    let program = parse_source("using Std.IO;\nusing math.basic;").unwrap();

    assert_eq!(program.usings.len(), 2);
    assert_eq!(program.usings[0].path, "Std.IO");
    assert_eq!(program.usings[1].path, "math.basic");
    assert_eq!(program.usings[1].span.start.0, 14);
}

#[test]
fn test_parse_function_declaration() {
    let program = parse_source("fn add(a: int, b: int) -> int { return a + b; }").unwrap();

    let function = &program.functions[0];
    assert_eq!(function.name, "add");
    assert_eq!(function.params.len(), 2);
    assert_eq!(function.params[1].ty, Type::Int);
    assert_eq!(function.return_type, Type::Int);
    assert!(function.is_public);
    assert!(matches!(function.body.stmts[0], Stmt::Return { value: Some(_), .. }));
}

#[test]
fn test_parse_function_defaults_to_void() {
    let program = parse_source("priv fn helper() {}").unwrap();

    assert_eq!(program.functions[0].return_type, Type::Void);
    assert!(!program.functions[0].is_public);
}

#[test]
fn test_parse_class_declaration() {
    let source = "class Point {\n    pub x: int;\n    y: int;\n    pub static origin: int = 0;\n    pub fn len() -> float { return 0.0; }\n    static fn make() -> Point { return new Point(); }\n}";
    let program = parse_source(source).unwrap();

    let class = &program.classes[0];
    assert_eq!(class.name, "Point");
    assert!(class.is_public);
    assert_eq!(class.fields.len(), 3);
    assert!(class.fields[0].is_public);
    assert!(!class.fields[1].is_public);
    assert!(class.fields[2].is_static);
    assert!(class.fields[2].initializer.is_some());
    assert_eq!(class.methods.len(), 2);
    assert!(class.methods[0].is_public);
    assert!(!class.methods[1].is_public);
    assert!(class.methods[1].is_static);
}

#[test]
fn test_parse_private_class() {
    let program = parse_source("priv class Secret {}").unwrap();
    assert!(!program.classes[0].is_public);
}

#[test]
fn test_parse_let_statement() {
    let stmts = body_of("fn main() { let mut x: float = 42; }");

    match &stmts[0] {
        Stmt::Let { name, mutable, ty, value, .. } => {
            assert_eq!(name, "x");
            assert!(*mutable);
            assert_eq!(ty.as_ref(), Some(&Type::Float));
            assert!(matches!(value.kind, ExprKind::Int(42)));
        }
        other => panic!("expected let, found {:?}", other),
    }
}

#[test]
fn test_parse_operator_precedence() {
    let stmts = body_of("fn main() { let x = 1 + 2 * 3; }");

    let Stmt::Let { value, .. } = &stmts[0] else { panic!("expected let") };
    match &value.kind {
        ExprKind::Binary { op, right, .. } => {
            assert_eq!(*op, BinaryOp::Add);
            assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
        }
        other => panic!("expected binary, found {:?}", other),
    }
}

#[test]
fn test_parse_unary_binds_tighter_than_binary() {
    let stmts = body_of("fn main() { let x = -a + b; }");

    let Stmt::Let { value, .. } = &stmts[0] else { panic!("expected let") };
    match &value.kind {
        ExprKind::Binary { op, left, .. } => {
            assert_eq!(*op, BinaryOp::Add);
            assert!(matches!(left.kind, ExprKind::Unary { .. }));
        }
        other => panic!("expected binary, found {:?}", other),
    }
}

#[test]
fn test_parse_logical_precedence() {
    let stmts = body_of("fn main() { let x = a || b && c; }");

    let Stmt::Let { value, .. } = &stmts[0] else { panic!("expected let") };
    assert!(matches!(value.kind, ExprKind::Binary { op: BinaryOp::Or, .. }));
}

#[test]
fn test_parse_call_member_and_index() {
    let stmts = body_of("fn main() { Std.IO.println(items[0].name); }");

    let Stmt::Expr(expr) = &stmts[0] else { panic!("expected expression statement") };
    let ExprKind::Call { callee, args } = &expr.kind else { panic!("expected call") };
    assert!(matches!(&callee.kind, ExprKind::Member { member, .. } if member == "println"));
    assert!(matches!(&args[0].kind, ExprKind::Member { object, .. } if matches!(object.kind, ExprKind::Index { .. })));
}

#[test]
fn test_parse_if_else_chain() {
    let stmts = body_of("fn main() { if (x > 0) { a(); } else if (x < 0) { b(); } else { c(); } }");

    match &stmts[0] {
        Stmt::If { else_branch: Some(else_branch), .. } => {
            assert!(matches!(**else_branch, Stmt::If { else_branch: Some(_), .. }));
        }
        other => panic!("expected if, found {:?}", other),
    }
}

#[test]
fn test_parse_while_and_for() {
    let stmts = body_of("fn main() { while (i < 10) { i = i + 1; } for (item in items) { print(item); } }");

    assert!(matches!(stmts[0], Stmt::While { .. }));
    assert!(matches!(&stmts[1], Stmt::For { variable, .. } if variable == "item"));
}

#[test]
fn test_parse_match_statement() {
    let source = "fn main() { match value { Some(v) => { print(v); }, None => print(\"none\"), } }";
    let stmts = body_of(source);

    match &stmts[0] {
        Stmt::Match { arms, .. } => {
            assert_eq!(arms.len(), 2);
            assert!(matches!(&arms[0].pattern, Pattern::Some { binding, .. } if binding == "v"));
            assert!(matches!(arms[1].pattern, Pattern::None));
            assert_eq!(arms[1].body.stmts.len(), 1);
        }
        other => panic!("expected match, found {:?}", other),
    }
}

#[test]
fn test_parse_new_array_some_and_lambda() {
    let source = "fn main() { let p = new Point(1, 2); let xs = [1, 2, 3]; let o = Some(1); let f = fn(x: int) -> int { return x; }; }";
    let stmts = body_of(source);

    let values: Vec<&ExprKind> = stmts
        .iter()
        .map(|s| match s {
            Stmt::Let { value, .. } => &value.kind,
            _ => panic!("expected let"),
        })
        .collect();

    assert!(matches!(values[0], ExprKind::New { class, args, .. } if class == "Point" && args.len() == 2));
    assert!(matches!(values[1], ExprKind::Array(elements) if elements.len() == 3));
    assert!(matches!(values[2], ExprKind::Some(_)));
    assert!(matches!(values[3], ExprKind::Lambda { params, return_type: Type::Int, .. } if params.len() == 1));
}

#[test]
fn test_parse_interpolated_string_holes() {
    let source = "fn main() { let s = $\"Hi {user.name}, {count} left\"; }";
    let stmts = body_of(source);

    let Stmt::Let { value, .. } = &stmts[0] else { panic!("expected let") };
    let ExprKind::Interpolated(parts) = &value.kind else { panic!("expected interpolation") };

    assert_eq!(parts.len(), 5);
    assert!(matches!(&parts[0], InterpolationPart::Text(text) if text == "Hi "));
    match &parts[1] {
        InterpolationPart::Hole(expr) => {
            assert!(matches!(&expr.kind, ExprKind::Member { member, .. } if member == "name"));
            // `user` starts right after `{` inside the literal.
            assert_eq!(&source[expr.span.start.0 as usize..expr.span.end.0 as usize], "user.name");
        }
        other => panic!("expected hole, found {:?}", other),
    }
    assert!(matches!(&parts[3], InterpolationPart::Hole(_)));
    assert!(matches!(&parts[4], InterpolationPart::Text(text) if text == " left"));
}

#[test]
fn test_parse_type_annotations() {
    let source = "fn f(a: int[], b: Option<string>, c: fn(int, int) -> bool, d: Array<Point>) {}";
    let program = parse_source(source).unwrap();
    let params = &program.functions[0].params;

    assert_eq!(params[0].ty, Type::array(Type::Int));
    assert_eq!(params[1].ty, Type::option(Type::String));
    assert_eq!(
        params[2].ty,
        Type::Function {
            params: vec![Type::Int, Type::Int],
            ret: Box::new(Type::Bool)
        }
    );
    assert_eq!(params[3].ty, Type::array(Type::class("Point")));
}

#[test]
fn test_expression_ids_are_unique() {
    let stmts = body_of("fn main() { let x = a + b; }");

    let Stmt::Let { value, .. } = &stmts[0] else { panic!("expected let") };
    let ExprKind::Binary { left, right, .. } = &value.kind else { panic!("expected binary") };
    assert_ne!(left.id, right.id);
    assert_ne!(left.id, value.id);
}

#[test]
fn test_parse_missing_semicolon_fails() {
    let result = parse_source("fn main() { let x = 1 }");
    assert_eq!(result.err().unwrap().get_error_name(), "UnexpectedToken");
}

#[test]
fn test_parse_statement_at_top_level_fails() {
    let result = parse_source("let x = 1;");
    assert_eq!(result.err().unwrap().get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_parse_unclosed_block_fails() {
    assert!(parse_source("fn main() { let x = 1;").is_err());
}
