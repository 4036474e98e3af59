//! Type checking.
//!
//! This module assigns a static type to every expression of a resolved
//! module and validates its use:
//!
//! - Operands, with `int` widening to `float`
//! - Call arity and argument types
//! - Class member existence and visibility
//! - Conditions, loops, `match` patterns and returns
//!
//! It walks the same scope structure as name resolution and relies on it to
//! know what each identifier refers to. Errors accumulate instead of
//! stopping the walk.

pub mod type_checker;

#[cfg(test)]
mod tests;
