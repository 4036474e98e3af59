use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::{
    errors::errors::Error,
    lexer::lexer::tokenize,
    module::{
        module::{Module, PackageOrigin},
        path_resolver::module_path_for_file,
        registry::ModuleRegistry,
    },
    parser::parser::parse,
    render_error,
    resolver::{
        imports::resolve_and_record,
        names::{resolve_names, NameResolution},
    },
    type_checker::type_checker::{check_module, TypeCheckResult},
};

use super::project::{collect_sources, ProjectConfig};

/// Failures outside the source language itself.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid project manifest {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Diagnostics and analysis results for one module.
#[derive(Debug)]
pub struct ModuleReport {
    pub module: String,
    /// Load, import, name and type errors, in that order.
    pub diagnostics: Vec<Error>,
    pub resolution: NameResolution,
    pub types: TypeCheckResult,
}

/// Outcome of [`Compilation::check`], one entry per module in path order.
#[derive(Debug, Default)]
pub struct CheckReport {
    pub modules: Vec<ModuleReport>,
}

impl CheckReport {
    pub fn has_errors(&self) -> bool {
        self.modules.iter().any(|m| !m.diagnostics.is_empty())
    }

    pub fn error_count(&self) -> usize {
        self.modules.iter().map(|m| m.diagnostics.len()).sum()
    }

    pub fn module(&self, path: &str) -> Option<&ModuleReport> {
        self.modules.iter().find(|m| m.module == path)
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Error> {
        self.modules.iter().flat_map(|m| m.diagnostics.iter())
    }
}

/// A set of source files checked together against one registry.
#[derive(Debug, Default)]
pub struct Compilation {
    registry: ModuleRegistry,
    /// Source text by file name, for rendering diagnostics.
    sources: HashMap<String, String>,
    /// Lex, parse and registration failures by module path.
    load_errors: BTreeMap<String, Vec<Error>>,
}

impl Compilation {
    pub fn new() -> Self {
        Compilation::default()
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn source(&self, file: &str) -> Option<&str> {
        self.sources.get(file).map(String::as_str)
    }

    /// Adds one file, deriving its module path from the file name.
    ///
    /// # Returns
    ///
    /// * `String` - The canonical module path the file was registered under
    pub fn add_source(&mut self, file: &str, text: &str, package: PackageOrigin) -> String {
        let module_path = module_path_for_file(file, &package);
        self.add_source_as(&module_path, file, text, package);
        module_path
    }

    /// Lexes, parses and registers `text` as (part of) module `module_path`.
    ///
    /// Failures are kept and reported by the next [`Compilation::check`]
    /// under `module_path`, even if no module of that path got registered.
    #[instrument(skip(self, text, package))]
    pub fn add_source_as(&mut self, module_path: &str, file: &str, text: &str, package: PackageOrigin) {
        self.sources.insert(file.to_string(), text.to_string());

        let file_name = Rc::new(file.to_string());
        let program = tokenize(text.to_string(), Some(file.to_string()))
            .and_then(|tokens| parse(tokens, Rc::clone(&file_name)));

        let result = program.and_then(|program| {
            self.registry
                .register(Module::new(module_path, package, program, file_name))
        });

        if let Err(error) = result {
            warn!(error = %error, "failed to load source");
            self.load_errors
                .entry(module_path.to_string())
                .or_default()
                .push(error);
        }
    }

    /// Reads a file from disk and adds it under the name `display`.
    pub fn add_file(
        &mut self,
        path: &Path,
        display: &str,
        module_path: &str,
        package: PackageOrigin,
    ) -> Result<(), DriverError> {
        let text = fs::read_to_string(path).map_err(|source| DriverError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.add_source_as(module_path, display, &text, package);
        Ok(())
    }

    /// Loads every source of the project rooted at `root`.
    ///
    /// # Returns
    ///
    /// * `Result<ProjectConfig, DriverError>` - The parsed manifest
    #[instrument(skip(self))]
    pub fn load_project(&mut self, root: &Path) -> Result<ProjectConfig, DriverError> {
        let config = ProjectConfig::load(root)?;

        for source in collect_sources(root, &config)? {
            self.add_file(&source.path, &source.display, &source.module_path, source.package)?;
        }

        info!(modules = self.registry.source_modules().count(), "project loaded");
        Ok(config)
    }

    /// Runs import resolution, name resolution and type checking over every
    /// loaded module.
    ///
    /// Imports of all modules are resolved before any names, so a module's
    /// diagnostics do not depend on load order.
    #[instrument(skip(self))]
    pub fn check(&mut self) -> CheckReport {
        let paths: Vec<String> = self
            .registry
            .source_modules()
            .map(|m| m.path.clone())
            .collect();

        let mut import_errors: HashMap<String, Error> = HashMap::new();
        for path in &paths {
            if let Err(error) = resolve_and_record(&mut self.registry, path) {
                import_errors.insert(path.clone(), error);
            }
        }

        let all_paths: BTreeSet<&String> = paths.iter().chain(self.load_errors.keys()).collect();

        let mut report = CheckReport::default();
        for path in all_paths {
            let mut diagnostics = self.load_errors.get(path).cloned().unwrap_or_default();
            diagnostics.extend(import_errors.remove(path));

            let resolution = resolve_names(&self.registry, path);
            let types = check_module(&self.registry, &resolution);
            diagnostics.extend(resolution.errors.iter().cloned());
            diagnostics.extend(types.errors.iter().cloned());

            debug!(module = %path, errors = diagnostics.len(), "checked module");
            report.modules.push(ModuleReport {
                module: path.clone(),
                diagnostics,
                resolution,
                types,
            });
        }

        info!(errors = report.error_count(), "check finished");
        report
    }

    /// Renders a diagnostic against the source of the file it points into.
    pub fn render(&self, error: &Error) -> String {
        let source = self.source(error.get_span().file()).unwrap_or("");
        render_error(error, source)
    }
}
