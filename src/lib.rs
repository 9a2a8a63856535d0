//! Toolchain for the Monkey expression language: lexer, Pratt parser,
//! AST-splicing macros, a tree-walking evaluator, and a bytecode compiler
//! with a stack virtual machine that agrees with the evaluator on every
//! program both can run.

pub mod compile;
pub mod eval;
pub mod syntax;
pub mod vm;
