use tracing::{debug, instrument};

use crate::{
    errors::errors::{Error, ErrorImpl},
    module::{path_resolver::resolve_import, registry::ModuleRegistry},
};

/// Resolves every `using` directive of the module at `module_path`.
///
/// Directives are resolved in source order and the first one that matches
/// no registered module stops resolution for this module.
///
/// # Arguments
///
/// * `registry` - The registry holding every loaded module
/// * `module_path` - Canonical path of the importing module
///
/// # Returns
///
/// * `Result<Vec<String>, Error>` - Resolved paths in directive order, or a
///   `ModuleNotFound` citing the path as written in the directive
#[instrument(skip(registry))]
pub fn resolve_imports(registry: &ModuleRegistry, module_path: &str) -> Result<Vec<String>, Error> {
    match resolve_prefix(registry, module_path) {
        (resolved, None) => Ok(resolved),
        (_, Some((_, error))) => Err(error),
    }
}

/// Resolves directives in order until one fails. Returns what resolved
/// before the failure, and the failing path with its error.
fn resolve_prefix(registry: &ModuleRegistry, module_path: &str) -> (Vec<String>, Option<(String, Error)>) {
    let Some(module) = registry.find(module_path) else {
        return (vec![], None);
    };

    let mut resolved = vec![];
    for using in &module.program.usings {
        match resolve_import(registry, &using.path, module_path) {
            Some(path) => {
                debug!(import = %using.path, resolved = %path, "resolved import");
                resolved.push(path);
            }
            None => {
                let error = Error::new(
                    ErrorImpl::ModuleNotFound {
                        path: using.path.clone(),
                    },
                    using.span.clone(),
                );
                return (resolved, Some((using.path.clone(), error)));
            }
        }
    }

    (resolved, None)
}

/// Resolves imports for `module_path` and records the outcome on the module.
///
/// On failure the directives resolved before the failing one stay recorded,
/// so their symbols remain visible to later phases.
pub fn resolve_and_record(registry: &mut ModuleRegistry, module_path: &str) -> Result<(), Error> {
    match resolve_prefix(registry, module_path) {
        (resolved, None) => {
            registry.set_resolved_imports(module_path, resolved);
            Ok(())
        }
        (resolved, Some((failed, error))) => {
            registry.mark_import_failed(module_path, resolved, &failed);
            Err(error)
        }
    }
}
