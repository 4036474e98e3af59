//! Import and name resolution.
//!
//! Runs after every module has been registered:
//!
//! - [`imports`] maps each `using` directive to a registered module path
//! - [`names`] binds every identifier in a module to its declaration
//! - [`scope`] is the lexical scope stack both the name resolver and the
//!   type checker walk with

pub mod imports;
pub mod names;
pub mod scope;
