//! Unit tests for the type checker.

use std::rc::Rc;

use crate::ast::ast::NodeId;
use crate::ast::statements::Stmt;
use crate::ast::types::Type;
use crate::lexer::lexer::tokenize;
use crate::module::module::{Module, PackageOrigin};
use crate::module::registry::ModuleRegistry;
use crate::parser::parser::parse;
use crate::resolver::imports::resolve_and_record;
use crate::resolver::names::resolve_names;

use super::type_checker::{check_module, common_type, is_assignable, TypeCheckResult};

fn load(modules: &[(&str, &str)]) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();

    for (path, source) in modules {
        let file = format!("{}.mg", path);
        let tokens = tokenize(source.to_string(), Some(file.clone())).unwrap();
        let program = parse(tokens, Rc::new(file.clone())).unwrap();
        registry
            .register(Module::new(path, PackageOrigin::Root(String::from("app")), program, Rc::new(file)))
            .unwrap();
    }
    for (path, _) in modules {
        let _ = resolve_and_record(&mut registry, path);
    }

    registry
}

fn check(registry: &ModuleRegistry, path: &str) -> TypeCheckResult {
    let resolution = resolve_names(registry, path);
    check_module(registry, &resolution)
}

fn check_source(source: &str) -> TypeCheckResult {
    let registry = load(&[("main", source)]);
    check(&registry, "main")
}

fn error_names(result: &TypeCheckResult) -> Vec<&str> {
    result.errors.iter().map(|e| e.get_error_name()).collect()
}

/// Node id of the initializer of the `index`-th statement of function `name`,
/// which must be a `let`.
fn let_value(registry: &ModuleRegistry, module: &str, name: &str, index: usize) -> NodeId {
    let module = registry.find(module).unwrap();
    let id = module.program.find_function(name).unwrap();
    match &module.program.function(id).body.stmts[index] {
        Stmt::Let { value, .. } => value.id,
        other => panic!("expected let, found {:?}", other),
    }
}

#[test]
fn test_common_type_rules() {
    assert_eq!(common_type(&Type::Int, &Type::Int), Some(Type::Int));
    assert_eq!(common_type(&Type::Int, &Type::Float), Some(Type::Float));
    assert_eq!(common_type(&Type::Float, &Type::Int), Some(Type::Float));
    assert_eq!(common_type(&Type::Int, &Type::Bool), None);
    assert_eq!(common_type(&Type::Unknown, &Type::Bool), Some(Type::Bool));
}

#[test]
fn test_assignability_rules() {
    assert!(is_assignable(&Type::Int, &Type::Float));
    assert!(!is_assignable(&Type::Float, &Type::Int));
    assert!(is_assignable(&Type::option(Type::Unknown), &Type::option(Type::String)));
    assert!(!is_assignable(&Type::class("A"), &Type::class("B")));
    assert!(is_assignable(&Type::array(Type::Int), &Type::array(Type::Float)));
}

#[test]
fn test_int_plus_float_is_float() {
    let registry = load(&[("main", "fn main() { let x = 1 + 2.5; }")]);
    let result = check(&registry, "main");

    assert!(result.errors.is_empty());
    let node = let_value(&registry, "main", "main", 0);
    assert_eq!(result.type_of(node), Some(&Type::Float));
}

#[test]
fn test_int_plus_bool_is_mismatch() {
    let result = check_source("fn main() { let x = 1 + true; }");

    assert_eq!(error_names(&result), vec!["TypeMismatch"]);
    assert_eq!(
        result.errors[0].get_tip().to_string(),
        "Expected type `int`, received `bool`"
    );
}

#[test]
fn test_string_concatenation() {
    let registry = load(&[("main", "fn main() { let s = \"a\" + \"b\"; let t = \"a\" - \"b\"; }")]);
    let result = check(&registry, "main");

    assert_eq!(error_names(&result), vec!["TypeMismatch"]);
    assert_eq!(result.type_of(let_value(&registry, "main", "main", 0)), Some(&Type::String));
}

#[test]
fn test_comparison_and_logic_yield_bool() {
    let registry = load(&[("main", "fn main() { let a = 1 < 2.0; let b = a && !false; }")]);
    let result = check(&registry, "main");

    assert!(result.errors.is_empty());
    assert_eq!(result.type_of(let_value(&registry, "main", "main", 0)), Some(&Type::Bool));
    assert_eq!(result.type_of(let_value(&registry, "main", "main", 1)), Some(&Type::Bool));
}

#[test]
fn test_let_annotation_widens_but_never_narrows() {
    let result = check_source("fn main() { let a: float = 1; let b: int = 2.5; }");
    assert_eq!(error_names(&result), vec!["TypeMismatch"]);
}

#[test]
fn test_arity_mismatch_continues_checking() {
    let source = "fn add3(a: int, b: int, c: int) -> int { return a + b + c; }\nfn main() { let x = add3(1, 2); let y: bool = 3; }";
    let result = check_source(source);

    assert_eq!(error_names(&result), vec!["ArityMismatch", "TypeMismatch"]);
    assert_eq!(
        result.errors[0].to_string(),
        "wrong number of arguments to \"add3\": expected 3, received 2"
    );
}

#[test]
fn test_argument_type_mismatch() {
    let result = check_source("fn f(s: string) {}\nfn main() { f(1); f(\"ok\"); }");
    assert_eq!(error_names(&result), vec!["TypeMismatch"]);
}

#[test]
fn test_call_returns_declared_type() {
    let registry = load(&[(
        "main",
        "fn half(x: float) -> float { return x / 2.0; }\nfn main() { let h = half(3); }",
    )]);
    let result = check(&registry, "main");

    assert!(result.errors.is_empty());
    assert_eq!(result.type_of(let_value(&registry, "main", "main", 0)), Some(&Type::Float));
}

#[test]
fn test_return_type_checked() {
    let result = check_source("fn f() -> int { return \"no\"; }\nfn g() { return; }");
    assert_eq!(error_names(&result), vec!["TypeMismatch"]);
}

#[test]
fn test_lambda_restores_enclosing_return_type() {
    let source = "fn f() -> int { let g = fn(s: string) -> string { return s; }; return 1; }";
    assert!(check_source(source).errors.is_empty());
}

#[test]
fn test_conditions_must_be_bool() {
    let result = check_source("fn main() { if (1) {} while (\"x\") {} if (true) {} }");
    assert_eq!(error_names(&result), vec!["TypeMismatch", "TypeMismatch"]);
}

#[test]
fn test_for_requires_array_and_binds_element() {
    let registry = load(&[(
        "main",
        "fn main() { for (x in [1, 2, 3]) { let y: int = x; } for (c in 5) {} }",
    )]);
    let result = check(&registry, "main");
    assert_eq!(error_names(&result), vec!["TypeMismatch"]);
}

#[test]
fn test_match_patterns_require_option() {
    let ok = check_source(
        "fn main() { let o = Some(1); match o { Some(v) => { let w: int = v; }, None => {} } }",
    );
    assert!(ok.errors.is_empty());

    let bad = check_source("fn main() { match 1 { Some(v) => {}, None => {} } }");
    assert_eq!(error_names(&bad), vec!["TypeMismatch", "TypeMismatch"]);
}

#[test]
fn test_none_assignable_to_any_option() {
    assert!(check_source("fn f() -> Option<string> { return None; }").errors.is_empty());
}

#[test]
fn test_undefined_class() {
    let result = check_source("fn main() { let p = new Ghost(); }\nfn f(g: Ghost) {}");
    assert_eq!(error_names(&result), vec!["UndefinedClass", "UndefinedClass"]);
}

#[test]
fn test_class_members_and_visibility() {
    let registry = load(&[
        (
            "shapes",
            "class Point {\n    pub x: int;\n    y: int;\n    pub fn sum() -> int { return this.x + this.y; }\n    pub static fn origin() -> Point { return new Point(); }\n}",
        ),
        (
            "main",
            "using shapes;\nfn main() {\n    let p = Point.origin();\n    let a = p.x;\n    let b = p.y;\n    let c = p.sum();\n    let d = p.z;\n}",
        ),
    ]);

    assert!(check(&registry, "shapes").errors.is_empty());

    let result = check(&registry, "main");
    assert_eq!(error_names(&result), vec!["VisibilityViolation", "UnknownMember"]);
    assert_eq!(result.type_of(let_value(&registry, "main", "main", 0)), Some(&Type::class("Point")));
    assert_eq!(result.type_of(let_value(&registry, "main", "main", 3)), Some(&Type::Int));
}

#[test]
fn test_instance_member_through_class_name_is_unknown() {
    let result = check_source("class Counter {\n    pub count: int;\n}\nfn main() { let c = Counter.count; }");
    assert_eq!(error_names(&result), vec!["UnknownMember"]);
}

#[test]
fn test_private_class_cannot_be_constructed_elsewhere() {
    let registry = load(&[
        ("lib", "priv class Secret {}\nfn make() { let s = new Secret(); }"),
        ("main", "using lib;\nfn main() { let s = new Secret(); }"),
    ]);

    assert!(check(&registry, "lib").errors.is_empty());
    assert_eq!(error_names(&check(&registry, "main")), vec!["VisibilityViolation"]);
}

#[test]
fn test_builtin_members_of_values() {
    let registry = load(&[(
        "main",
        "fn main() { let xs = [1, 2]; let n = xs.length(); let o = xs.pop(); let v = o.unwrapOr(0); let bad = n.length(); }",
    )]);
    let result = check(&registry, "main");

    assert_eq!(error_names(&result), vec!["UnknownMember"]);
    assert_eq!(result.type_of(let_value(&registry, "main", "main", 1)), Some(&Type::Int));
    assert_eq!(result.type_of(let_value(&registry, "main", "main", 2)), Some(&Type::option(Type::Int)));
    assert_eq!(result.type_of(let_value(&registry, "main", "main", 3)), Some(&Type::Int));
}

#[test]
fn test_intrinsics_and_namespaces_are_permissive() {
    let registry = load(&[(
        "main",
        "using Std.Math;\nfn main() { let line = readLine(); println(line, 1); let r = sqrt(2.0); Std.IO.println(\"x\"); }",
    )]);
    let result = check(&registry, "main");

    assert!(result.errors.is_empty());
    assert_eq!(result.type_of(let_value(&registry, "main", "main", 0)), Some(&Type::String));
    assert_eq!(result.type_of(let_value(&registry, "main", "main", 2)), Some(&Type::Unknown));
}

#[test]
fn test_undefined_identifiers_not_reported_twice() {
    let result = check_source("fn main() { let x = missing + 1; missing(); }");
    assert!(result.errors.is_empty());
}

#[test]
fn test_array_elements_share_a_type() {
    let registry = load(&[("main", "fn main() { let a = [1, 2.5]; let b = [1, true]; }")]);
    let result = check(&registry, "main");

    assert_eq!(error_names(&result), vec!["TypeMismatch"]);
    assert_eq!(result.type_of(let_value(&registry, "main", "main", 0)), Some(&Type::array(Type::Float)));
}

#[test]
fn test_same_typed_operands_compare() {
    let registry = load(&[(
        "main",
        "fn main() { let a = true < false; let b = Some(1) >= Some(2); let c = 1 < \"x\"; }",
    )]);
    let result = check(&registry, "main");

    assert_eq!(error_names(&result), vec!["TypeMismatch"]);
    assert_eq!(result.type_of(let_value(&registry, "main", "main", 0)), Some(&Type::Bool));
    assert_eq!(result.type_of(let_value(&registry, "main", "main", 1)), Some(&Type::Bool));
}

#[test]
fn test_calls_through_module_alias_are_checked() {
    let registry = load(&[
        (
            "util.text",
            "fn shout(s: string) -> string { return s; }\npriv fn hidden() {}",
        ),
        (
            "main",
            "using util.text;\nfn main() {\n    text.whatever();\n    text.shout(1, 2, 3);\n    let n: int = text.shout(\"a\");\n    let ok: string = text.shout(\"b\");\n    text.hidden();\n}",
        ),
    ]);
    let result = check(&registry, "main");

    assert_eq!(
        error_names(&result),
        vec![
            "UnknownMember",
            "ArityMismatch",
            "TypeMismatch",
            "TypeMismatch",
            "VisibilityViolation"
        ]
    );
    assert_eq!(
        result.errors[1].to_string(),
        "wrong number of arguments to \"shout\": expected 1, received 3"
    );
    assert_eq!(result.type_of(let_value(&registry, "main", "main", 3)), Some(&Type::String));
}

#[test]
fn test_static_member_through_module_alias() {
    let registry = load(&[
        (
            "shapes",
            "class Point {\n    pub x: int;\n    pub static fn origin() -> Point { return new Point(); }\n}",
        ),
        ("main", "using shapes;\nfn main() { let p = shapes.Point.origin(); let q = shapes.Point.x; }"),
    ]);
    let result = check(&registry, "main");

    assert_eq!(error_names(&result), vec!["UnknownMember"]);
    assert_eq!(result.type_of(let_value(&registry, "main", "main", 0)), Some(&Type::class("Point")));
}

#[test]
fn test_failed_import_keeps_checking_resolved_calls() {
    let registry = load(&[
        ("math", "fn add(a: int, b: int) -> int { return a + b; }"),
        (
            "main",
            "using math;\nusing missing;\nfn main() { let x = add(1); let g = new Ghost(); }",
        ),
    ]);

    assert_eq!(error_names(&check(&registry, "main")), vec!["ArityMismatch"]);
}
