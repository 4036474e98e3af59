//! Batch compilation driver.
//!
//! Owns the module registry and runs the front-end pipeline over a set of
//! source files: lex and parse every file, register the modules, then resolve
//! imports, resolve names and type-check each module in path order. Project
//! discovery through `project.toml` lives in [`project`].

pub mod driver;
pub mod project;
