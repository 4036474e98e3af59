//! Unit tests for editor queries.

use crate::driver::driver::{CheckReport, Compilation};
use crate::module::module::{PackageOrigin, SymbolKind};
use crate::resolver::names::Binding;

use super::query::{completions, definition_at, references_to, symbols};

const MATH: &str = "fn add(a: int, b: int) -> int { return a + b; }\npriv fn helper() {}\nclass Vec {}";

fn compile(files: &[(&str, &str)]) -> (Compilation, CheckReport) {
    let mut compilation = Compilation::new();
    for (file, text) in files {
        compilation.add_source(file, text, PackageOrigin::Root(String::from("app")));
    }
    let report = compilation.check();
    (compilation, report)
}

fn offset_of(source: &str, needle: &str) -> u32 {
    source.find(needle).unwrap() as u32
}

#[test]
fn test_symbols_lists_source_declarations() {
    let (compilation, _) = compile(&[("math.mg", MATH), ("main.mg", "fn main() {}")]);

    let listed: Vec<(&str, SymbolKind, &str, bool)> = symbols(compilation.registry())
        .into_iter()
        .map(|s| (s.name.as_str(), s.kind, s.module.as_str(), s.is_public))
        .collect();

    assert_eq!(
        listed,
        vec![
            ("main", SymbolKind::Function, "main", true),
            ("add", SymbolKind::Function, "math", true),
            ("helper", SymbolKind::Function, "math", false),
            ("Vec", SymbolKind::Class, "math", true),
        ]
    );
}

#[test]
fn test_definition_of_imported_function() {
    let main = "using math;\nfn main() { let x = add(1, 2); }";
    let (compilation, report) = compile(&[("math.mg", MATH), ("main.mg", main)]);

    let resolution = &report.module("main").unwrap().resolution;
    let definition =
        definition_at(compilation.registry(), resolution, "main.mg", offset_of(main, "add") + 1).unwrap();

    assert_eq!(definition.name, "add");
    assert_eq!(definition.kind, SymbolKind::Function);
    assert_eq!(definition.module, "math");
    assert_eq!(definition.span.file(), "math.mg");
    assert_eq!(definition.span.start.0, offset_of(MATH, "add"));
}

#[test]
fn test_definition_of_local() {
    let main = "fn main() { let v = 1; let w = v; }";
    let (compilation, report) = compile(&[("main.mg", main)]);

    let resolution = &report.module("main").unwrap().resolution;
    let definition =
        definition_at(compilation.registry(), resolution, "main.mg", main.rfind('v').unwrap() as u32).unwrap();

    assert_eq!(definition.kind, SymbolKind::Variable);
    assert_eq!(definition.module, "main");
    assert_eq!(definition.span.start.0, 16);
}

#[test]
fn test_definition_of_class_field() {
    let source = "class Circle {\n    r: float;\n    pub fn area() -> float { return r; }\n}";
    let (compilation, report) = compile(&[("shapes.mg", source)]);

    let resolution = &report.module("shapes").unwrap().resolution;
    let offset = source.rfind("r;").unwrap() as u32;
    let definition = definition_at(compilation.registry(), resolution, "shapes.mg", offset).unwrap();

    assert_eq!(definition.kind, SymbolKind::Variable);
    assert_eq!(definition.span.start.0, offset_of(source, "r: float"));
}

#[test]
fn test_no_definition_for_intrinsics_or_whitespace() {
    let main = "fn main() {  println(\"x\"); }";
    let (compilation, report) = compile(&[("main.mg", main)]);

    let resolution = &report.module("main").unwrap().resolution;
    assert!(definition_at(compilation.registry(), resolution, "main.mg", offset_of(main, "println")).is_none());
    assert!(definition_at(compilation.registry(), resolution, "main.mg", 12).is_none());
}

#[test]
fn test_references_to_local() {
    let main = "fn main() { let v = 1; let a = v + v; let b = a; }";
    let (_, report) = compile(&[("main.mg", main)]);

    let resolution = &report.module("main").unwrap().resolution;
    let target = resolution
        .references
        .iter()
        .find(|r| r.name == "v")
        .map(|r| r.binding.clone())
        .unwrap();

    let found = references_to(resolution, &target);
    assert_eq!(found.len(), 2);
    assert!(found[0].span.start.0 < found[1].span.start.0);
    assert!(found.iter().all(|r| r.name == "v"));
}

#[test]
fn test_completions_respect_visibility() {
    let (compilation, _) = compile(&[("math.mg", MATH), ("main.mg", "using math;\nfn main() {}")]);

    let names = |prefix: &str| -> Vec<String> {
        completions(compilation.registry(), "main", prefix)
            .into_iter()
            .map(|c| c.name)
            .collect()
    };

    assert_eq!(names("a"), vec!["add"]);
    assert!(names("he").is_empty());
    assert_eq!(names("ma"), vec!["main", "math"]);

    let all = completions(compilation.registry(), "main", "");
    assert!(all.iter().any(|c| c.name == "println" && matches!(c.binding, Binding::Intrinsic { .. })));
    assert!(all.iter().any(|c| c.name == "Std"));
    assert!(all.iter().any(|c| c.name == "Vec" && matches!(c.binding, Binding::Class { .. })));
}

#[test]
fn test_completions_for_unknown_module_are_empty() {
    let (compilation, _) = compile(&[("main.mg", "fn main() {}")]);
    assert!(completions(compilation.registry(), "nowhere", "").is_empty());
}
