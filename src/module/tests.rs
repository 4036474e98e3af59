//! Unit tests for the module layer.
//!
//! Covers path derivation, import candidate ordering, registry merging and
//! conflicts, and class lookup across modules.

use std::rc::Rc;

use crate::ast::ast::Program;
use crate::lexer::lexer::tokenize;
use crate::parser::parser::parse;

use super::builtins::{builtin_members, is_builtin_module, is_intrinsic};
use super::module::{DeclRef, Module, PackageOrigin, SymbolKind};
use super::path_resolver::{import_candidates, module_path_for_file, resolve_import};
use super::registry::ModuleRegistry;

fn root() -> PackageOrigin {
    PackageOrigin::Root(String::from("app"))
}

fn module_from(path: &str, file: &str, source: &str, package: PackageOrigin) -> Module {
    let tokens = tokenize(source.to_string(), Some(file.to_string())).unwrap();
    let program = parse(tokens, Rc::new(file.to_string())).unwrap();
    Module::new(path, package, program, Rc::new(file.to_string()))
}

fn empty_module(path: &str, package: PackageOrigin) -> Module {
    Module::new(path, package, Program::default(), Rc::new(format!("{}.mg", path)))
}

#[test]
fn test_module_path_for_root_files() {
    assert_eq!(module_path_for_file("src/math/basic.mg", &root()), "math.basic");
    assert_eq!(module_path_for_file("math/basic.mg", &root()), "math.basic");
    assert_eq!(module_path_for_file("./src/main.mg", &root()), "main");
    assert_eq!(module_path_for_file("src\\util\\strings.mg", &root()), "util.strings");
}

#[test]
fn test_module_path_for_dependency_files() {
    let dependency = PackageOrigin::Dependency(String::from("mathlib"));

    assert_eq!(
        module_path_for_file(".magolor/packages/mathlib/src/vector.mg", &dependency),
        "mathlib.vector"
    );
    assert_eq!(
        module_path_for_file(".magolor/packages/mathlib/src/lib.mg", &dependency),
        "mathlib"
    );
}

#[test]
fn test_import_candidates_walk_ancestors() {
    assert_eq!(
        import_candidates("b", "a.x.y"),
        vec!["b", "a.x.y.b", "a.x.b", "a.b"]
    );
}

#[test]
fn test_import_candidates_builtin_is_only_itself() {
    assert_eq!(import_candidates("Std.IO", "a.x"), vec!["Std.IO"]);
}

#[test]
fn test_resolve_import_prefers_ancestor_relative() {
    let mut registry = ModuleRegistry::new();
    registry.register(empty_module("a.b", root())).unwrap();
    registry.register(empty_module("a.x", root())).unwrap();

    assert_eq!(resolve_import(&registry, "b", "a.x"), Some(String::from("a.b")));
    assert_eq!(resolve_import(&registry, "c", "a.x"), None);
}

#[test]
fn test_resolve_import_absolute_wins() {
    let mut registry = ModuleRegistry::new();
    registry.register(empty_module("b", root())).unwrap();
    registry.register(empty_module("a.b", root())).unwrap();

    assert_eq!(resolve_import(&registry, "b", "a.x"), Some(String::from("b")));
}

#[test]
fn test_resolve_import_falls_back_to_dependencies() {
    let mut registry = ModuleRegistry::new();
    registry
        .register(empty_module(
            "mathlib.vector",
            PackageOrigin::Dependency(String::from("mathlib")),
        ))
        .unwrap();

    assert_eq!(
        resolve_import(&registry, "vector", "main"),
        Some(String::from("mathlib.vector"))
    );
}

#[test]
fn test_resolve_builtin_bypasses_candidates() {
    let registry = ModuleRegistry::new();

    assert_eq!(resolve_import(&registry, "Std.Math", "a.b"), Some(String::from("Std.Math")));
    assert_eq!(
        resolve_import(&registry, "Std.Network.HTTP", "main"),
        Some(String::from("Std.Network.HTTP"))
    );
    assert_eq!(resolve_import(&registry, "Std.Missing", "main"), None);
}

#[test]
fn test_registry_is_seeded_with_builtins() {
    let mut registry = ModuleRegistry::new();
    assert!(registry.contains("Std"));
    assert!(registry.contains("Std.IO"));
    assert!(registry.find("Std.IO").unwrap().is_builtin());
    assert_eq!(registry.source_modules().count(), 0);

    registry.register(empty_module("main", root())).unwrap();
    assert_eq!(registry.source_modules().count(), 1);

    registry.clear();
    assert!(registry.contains("Std.Math"));
    assert!(!registry.contains("main"));
}

#[test]
fn test_register_merges_same_package() {
    let mut registry = ModuleRegistry::new();
    registry
        .register(module_from(
            "math",
            "math_a.mg",
            "using Std.IO;\nfn add(a: int, b: int) -> int { return a + b; }",
            root(),
        ))
        .unwrap();
    registry
        .register(module_from(
            "math",
            "math_b.mg",
            "using Std.IO;\nusing Std.Math;\nfn sub(a: int, b: int) -> int { return a - b; }\nclass Vec {}",
            root(),
        ))
        .unwrap();

    let module = registry.find("math").unwrap();
    let usings: Vec<&str> = module.program.usings.iter().map(|u| u.path.as_str()).collect();
    assert_eq!(usings, vec!["Std.IO", "Std.Math"]);
    assert_eq!(module.program.functions.len(), 2);
    assert_eq!(module.program.classes.len(), 1);
    assert_eq!(module.files.len(), 2);

    let names: Vec<&str> = module.symbols().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["add", "sub", "Vec"]);
}

#[test]
fn test_register_conflict_keeps_first() {
    let mut registry = ModuleRegistry::new();
    registry
        .register(module_from("util", "src/util.mg", "fn a() {}", root()))
        .unwrap();

    let error = registry
        .register(module_from(
            "util",
            ".magolor/packages/util/src/lib.mg",
            "fn b() {}",
            PackageOrigin::Dependency(String::from("util")),
        ))
        .unwrap_err();

    assert_eq!(error.get_error_name(), "ModuleConflict");
    let module = registry.find("util").unwrap();
    assert_eq!(module.program.functions[0].name, "a");
    assert_eq!(module.program.functions.len(), 1);
}

#[test]
fn test_register_builtin_path_conflicts() {
    let mut registry = ModuleRegistry::new();
    let result = registry.register(empty_module("Std.IO", root()));
    assert_eq!(result.unwrap_err().get_error_name(), "ModuleConflict");
}

#[test]
fn test_symbols_carry_visibility_and_handles() {
    let module = module_from(
        "shapes",
        "shapes.mg",
        "fn area() -> int { return 1; }\npriv fn helper() {}\npriv class Hidden {}",
        root(),
    );

    let helper = module.symbol("helper").unwrap();
    assert!(!helper.is_public);
    assert_eq!(helper.kind, SymbolKind::Function);
    assert!(matches!(helper.decl, DeclRef::Function(id) if id.0 == 1));

    let hidden = module.symbol("Hidden").unwrap();
    assert_eq!(hidden.kind, SymbolKind::Class);
    assert!(!hidden.is_public);

    let public: Vec<&str> = module.public_symbols().map(|s| s.name.as_str()).collect();
    assert_eq!(public, vec!["area"]);
}

#[test]
fn test_builtin_module_symbols() {
    let registry = ModuleRegistry::new();
    let math = registry.find("Std.Math").unwrap();

    assert_eq!(math.symbol("sqrt").unwrap().kind, SymbolKind::Function);
    assert_eq!(math.symbol("PI").unwrap().kind, SymbolKind::Variable);
    assert_eq!(math.short_name(), "Math");
}

#[test]
fn test_builtin_tables() {
    assert!(is_builtin_module("Std"));
    assert!(is_builtin_module("Std.Network.Routing"));
    assert!(!is_builtin_module("Std.Nothing"));
    assert!(builtin_members("Std.IO").unwrap().contains(&"readLine"));
    assert!(is_intrinsic("println"));
    assert!(!is_intrinsic("sqrt"));
}

#[test]
fn test_find_class_prefers_current_module() {
    let mut registry = ModuleRegistry::new();
    registry
        .register(module_from("a", "a.mg", "class Point {}", root()))
        .unwrap();
    registry
        .register(module_from("b", "b.mg", "class Point {}\nclass Line {}", root()))
        .unwrap();

    let (module, _) = registry.find_class("Point", "b").unwrap();
    assert_eq!(module.path, "b");

    let (module, _) = registry.find_class("Point", "c").unwrap();
    assert_eq!(module.path, "a");

    assert!(registry.find_class("Circle", "a").is_none());
}

#[test]
fn test_dependency_packages_sorted() {
    let mut registry = ModuleRegistry::new();
    for (path, package) in [("zed.a", "zed"), ("alpha.b", "alpha"), ("zed.c", "zed")] {
        registry
            .register(empty_module(path, PackageOrigin::Dependency(package.to_string())))
            .unwrap();
    }

    assert_eq!(registry.dependency_packages(), vec!["alpha", "zed"]);
}
