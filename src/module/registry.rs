use std::collections::BTreeMap;

use tracing::{debug, instrument, warn};

use crate::{
    ast::ast::{ClassDecl, ClassId},
    errors::errors::{Error, ErrorImpl},
    Span,
};

use super::{
    builtins::{builtin_module_paths, is_builtin_module},
    module::{Module, PackageOrigin, Symbol},
};

/// Catalogue of every module in a compilation, keyed by canonical path.
///
/// Iteration is always in path order, so every later phase visits modules
/// deterministically.
#[derive(Debug)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, Module>,
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleRegistry {
    /// Creates a registry holding only the built-in namespaces.
    pub fn new() -> Self {
        let mut registry = ModuleRegistry {
            modules: BTreeMap::new(),
        };
        registry.seed_builtins();
        registry
    }

    /// Drops every registered module and re-seeds the built-ins.
    pub fn clear(&mut self) {
        self.modules.clear();
        self.seed_builtins();
    }

    fn seed_builtins(&mut self) {
        for path in builtin_module_paths() {
            self.modules.insert(path.to_string(), Module::builtin(path));
        }
    }

    /// Adds a module to the registry.
    ///
    /// A module whose path is already taken by the same package is merged
    /// into the existing entry. When the path belongs to another package the
    /// existing entry is kept and a `ModuleConflict` is returned.
    ///
    /// # Arguments
    ///
    /// * `module` - The freshly parsed module
    ///
    /// # Returns
    ///
    /// * `Result<(), Error>` - `ModuleConflict` when two packages claim one path
    #[instrument(skip_all, fields(path = %module.path, package = %module.package))]
    pub fn register(&mut self, module: Module) -> Result<(), Error> {
        match self.modules.get_mut(&module.path) {
            Some(existing) if existing.package == module.package => {
                debug!("merging into existing module");
                existing.merge(module);
                Ok(())
            }
            Some(existing) => {
                warn!(existing = %existing.package, "module path already taken");
                let span = module
                    .files
                    .first()
                    .map(|file| Span::file_start(file.clone()))
                    .unwrap_or_else(Span::null);

                Err(Error::new(
                    ErrorImpl::ModuleConflict {
                        path: module.path.clone(),
                        existing: existing.package.to_string(),
                        incoming: module.package.to_string(),
                    },
                    span,
                ))
            }
            None => {
                debug!(symbols = module.symbols().len(), "registered module");
                self.modules.insert(module.path.clone(), module);
                Ok(())
            }
        }
    }

    pub fn find(&self, path: &str) -> Option<&Module> {
        self.modules.get(path)
    }

    pub fn find_mut(&mut self, path: &str) -> Option<&mut Module> {
        self.modules.get_mut(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.modules.contains_key(path)
    }

    pub fn is_builtin(&self, path: &str) -> bool {
        is_builtin_module(path)
    }

    /// All modules, built-ins included, in path order.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    /// Modules that came from source files, in path order.
    pub fn source_modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values().filter(|m| !m.is_builtin())
    }

    pub fn module_paths(&self) -> Vec<String> {
        self.modules.keys().cloned().collect()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.modules.values().flat_map(|m| m.symbols().iter())
    }

    /// Names of every dependency package with at least one module, sorted.
    pub fn dependency_packages(&self) -> Vec<String> {
        let mut packages: Vec<String> = self
            .modules
            .values()
            .filter_map(|m| match &m.package {
                PackageOrigin::Dependency(name) => Some(name.clone()),
                _ => None,
            })
            .collect();
        packages.sort();
        packages.dedup();
        packages
    }

    pub fn set_resolved_imports(&mut self, path: &str, imports: Vec<String>) {
        if let Some(module) = self.modules.get_mut(path) {
            module.resolved_imports = imports;
            module.failed_import = None;
        }
    }

    /// Records a failed import resolution. `resolved` holds the directives
    /// that did resolve before `failed`.
    pub fn mark_import_failed(&mut self, path: &str, resolved: Vec<String>, failed: &str) {
        if let Some(module) = self.modules.get_mut(path) {
            module.resolved_imports = resolved;
            module.failed_import = Some(failed.to_string());
        }
    }

    /// Looks a class up by name as seen from module `from`.
    ///
    /// The module itself is searched first, then its resolved imports in
    /// order, then every other module in path order.
    pub fn find_class(&self, name: &str, from: &str) -> Option<(&Module, ClassId)> {
        let mut order: Vec<&str> = vec![from];
        if let Some(module) = self.find(from) {
            order.extend(module.resolved_imports.iter().map(String::as_str));
        }
        order.extend(
            self.modules
                .keys()
                .map(String::as_str)
                .filter(|path| *path != from),
        );

        order.into_iter().find_map(|path| {
            let module = self.find(path)?;
            let id = module.program.find_class(name)?;
            Some((module, id))
        })
    }

    pub fn class_decl(&self, name: &str, from: &str) -> Option<(&Module, &ClassDecl)> {
        self.find_class(name, from)
            .map(|(module, id)| (module, module.program.class(id)))
    }
}
