//! Read-only editor queries over a checked compilation.
//!
//! Nothing here mutates the registry; every answer is derived from the
//! registered modules and the per-module [`NameResolution`] produced by the
//! name resolver.
//!
//! [`NameResolution`]: crate::resolver::names::NameResolution

pub mod query;

#[cfg(test)]
mod tests;
