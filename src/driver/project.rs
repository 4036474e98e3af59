use std::{
    collections::BTreeMap,
    fs,
    path::{Component, Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::module::{module::PackageOrigin, path_resolver::module_path_for_file};

use super::driver::DriverError;

/// Directory, relative to the project root, that dependencies are unpacked
/// into. Each package keeps its sources under `<name>/src`.
pub const PACKAGES_DIR: &str = ".magolor/packages";

pub const SOURCE_EXTENSION: &str = "mg";

/// Contents of `project.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProjectConfig {
    pub project: ProjectSection,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProjectSection {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_source_dirs")]
    pub source_dirs: Vec<String>,
}

fn default_version() -> String {
    String::from("0.1.0")
}

fn default_source_dirs() -> Vec<String> {
    vec![String::from("src")]
}

impl ProjectConfig {
    pub const FILE_NAME: &'static str = "project.toml";

    /// Reads and parses `project.toml` from `root`.
    ///
    /// # Arguments
    ///
    /// * `root` - The project root directory
    ///
    /// # Returns
    ///
    /// * `Result<ProjectConfig, DriverError>` - The manifest, or the I/O or
    ///   TOML error that prevented reading it
    #[instrument]
    pub fn load(root: &Path) -> Result<Self, DriverError> {
        let path = root.join(Self::FILE_NAME);
        let text = fs::read_to_string(&path).map_err(|source| DriverError::Io {
            path: path.clone(),
            source,
        })?;

        let config = Self::parse(&text).map_err(|source| DriverError::Config { path, source })?;
        debug!(name = %config.project.name, deps = config.dependencies.len(), "loaded project");

        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn root_package(&self) -> PackageOrigin {
        PackageOrigin::Root(self.project.name.clone())
    }
}

/// A source file found during project discovery.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// Where to read the file from.
    pub path: PathBuf,
    /// The path shown in diagnostics, relative to the project root.
    pub display: String,
    pub module_path: String,
    pub package: PackageOrigin,
}

/// Lists every `.mg` file of the root package and of each declared
/// dependency.
///
/// Root files come from the configured source directories, dependency files
/// from `.magolor/packages/<name>/src`. A dependency that was never unpacked
/// is skipped with a warning. The result is sorted by display path.
#[instrument(skip(config))]
pub fn collect_sources(root: &Path, config: &ProjectConfig) -> Result<Vec<SourceFile>, DriverError> {
    let mut sources = vec![];

    let package = config.root_package();
    for dir in &config.project.source_dirs {
        let source_root = root.join(dir);
        if !source_root.is_dir() {
            warn!(dir = %dir, "source directory does not exist");
            continue;
        }
        collect_package(root, &source_root, &package, &mut sources)?;
    }

    for name in config.dependencies.keys() {
        let source_root = root.join(PACKAGES_DIR).join(name).join("src");
        if !source_root.is_dir() {
            warn!(dependency = %name, "dependency is not installed");
            continue;
        }
        collect_package(root, &source_root, &PackageOrigin::Dependency(name.clone()), &mut sources)?;
    }

    sources.sort_by(|a, b| a.display.cmp(&b.display));
    debug!(files = sources.len(), "collected sources");

    Ok(sources)
}

fn collect_package(
    root: &Path,
    source_root: &Path,
    package: &PackageOrigin,
    sources: &mut Vec<SourceFile>,
) -> Result<(), DriverError> {
    for path in walk(source_root)? {
        let within_package = relative_display(source_root, &path);
        sources.push(SourceFile {
            display: relative_display(root, &path),
            module_path: module_path_for_file(&within_package, package),
            package: package.clone(),
            path,
        });
    }

    Ok(())
}

/// Every source file under `dir`, recursively.
fn walk(dir: &Path) -> Result<Vec<PathBuf>, DriverError> {
    let io_error = |source: std::io::Error| DriverError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = vec![];
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();

        if path.is_dir() {
            files.extend(walk(&path)?);
        } else if path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
            files.push(path);
        }
    }

    Ok(files)
}

/// Module path for a file named on the command line.
///
/// The file is taken relative to `cwd` when it lies under it, and everything
/// up to its last `src` directory is dropped, so `/work/app/src/math/basic.mg`
/// and `src/math/basic.mg` both give `math.basic`.
pub fn loose_module_path(path: &Path, cwd: &Path, package: &PackageOrigin) -> String {
    let relative = path.strip_prefix(cwd).unwrap_or(path);
    let segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let start = segments.iter().rposition(|s| s == "src").map_or(0, |i| i + 1);
    module_path_for_file(&segments[start..].join("/"), package)
}

/// `path` relative to `base`, with forward slashes.
fn relative_display(base: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
