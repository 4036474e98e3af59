//! Error types and error handling for the front-end.
//!
//! This module defines the diagnostics produced while loading, resolving and
//! checking Magolor modules. It includes:
//!
//! - Error structures with source span information
//! - Variants for lexing, parsing, module and name resolution, and typing
//! - Tips shown alongside rendered diagnostics

pub mod errors;

#[cfg(test)]
mod tests;
