//! Modules and the registry that owns them.
//!
//! A module is one logical compilation unit keyed by its canonical dotted
//! path. Several files can contribute to the same module. This module
//! contains:
//!
//! - The [`module::Module`] record and the symbols derived from it
//! - The fixed set of built-in `Std` namespaces
//! - The [`registry::ModuleRegistry`] catalogue with its merge rules
//! - Pure path functions mapping files and `using` directives to module paths

pub mod builtins;
pub mod module;
pub mod path_resolver;
pub mod registry;

#[cfg(test)]
mod tests;
