/// AST (Abstract Syntax Tree) module
/// Contains the enum-based syntax tree produced by the parser
///
/// Submodules:
/// - ast: Programs, top-level declarations and arena handles
/// - expressions: Expression nodes and operators
/// - statements: Statement nodes, blocks and match arms
/// - types: The Magolor type language
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
