//! Mapping source files and `using` directives to canonical module paths.
//!
//! Everything here is a pure function of its inputs except
//! [`resolve_import`], which only reads the registry.

use tracing::trace;

use super::{builtins::is_builtin_module, module::PackageOrigin, registry::ModuleRegistry};

/// Canonical dotted path for a source file.
///
/// The package's source root is stripped (`src/`, or
/// `.magolor/packages/<pkg>/src/` for dependencies), then the `.mg`
/// extension, and separators become dots. A dependency's `lib.mg` is the
/// package itself and its other files are prefixed with the package name.
///
/// # Arguments
///
/// * `file` - The file path as given, relative to the project root
/// * `package` - Which package the file belongs to
///
/// # Returns
///
/// * `String` - e.g. `math.basic` for `src/math/basic.mg`
pub fn module_path_for_file(file: &str, package: &PackageOrigin) -> String {
    let mut path = file.replace('\\', "/");
    while let Some(stripped) = path.strip_prefix("./") {
        path = stripped.to_string();
    }

    if let PackageOrigin::Dependency(name) = package {
        let prefix = format!(".magolor/packages/{}/src/", name);
        if let Some(stripped) = path.strip_prefix(&prefix) {
            path = stripped.to_string();
        }
    }

    if let Some(stripped) = path.strip_prefix("src/") {
        path = stripped.to_string();
    }

    if let Some(stripped) = path.strip_suffix(".mg") {
        path = stripped.to_string();
    }

    let dotted = path.replace('/', ".");

    match package {
        PackageOrigin::Dependency(name) if dotted == "lib" => name.clone(),
        PackageOrigin::Dependency(name) => format!("{}.{}", name, dotted),
        PackageOrigin::Root(name) if dotted == "lib" => name.clone(),
        _ => dotted,
    }
}

/// Paths to try, in order, for `using import;` inside module `importer`.
///
/// For importer `p1.p2.p3` and import `I` this is `I`, `p1.p2.p3.I`,
/// `p1.p2.I`, `p1.I`. A built-in namespace is only ever itself.
pub fn import_candidates(import: &str, importer: &str) -> Vec<String> {
    if is_builtin_module(import) {
        return vec![import.to_string()];
    }

    let mut candidates = vec![import.to_string()];
    let segments: Vec<&str> = importer.split('.').filter(|s| !s.is_empty()).collect();

    for end in (1..=segments.len()).rev() {
        let candidate = format!("{}.{}", segments[..end].join("."), import);
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }

    candidates
}

/// Finds the registered module a `using` refers to.
///
/// Tries [`import_candidates`] in order, then `<dependency>.import` for each
/// dependency package present in the registry, sorted by name. Built-in
/// namespaces resolve even when nothing is registered for them.
pub fn resolve_import(registry: &ModuleRegistry, import: &str, importer: &str) -> Option<String> {
    if is_builtin_module(import) {
        return Some(import.to_string());
    }

    let dependency_candidates = registry
        .dependency_packages()
        .into_iter()
        .map(|package| format!("{}.{}", package, import));

    import_candidates(import, importer)
        .into_iter()
        .chain(dependency_candidates)
        .inspect(|candidate| trace!(%candidate, "trying import candidate"))
        .find(|candidate| registry.contains(candidate))
}
