//! Source text → token stream → AST

pub mod ast;
pub mod lex;
pub mod parse;
