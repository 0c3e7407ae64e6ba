//! The core interpreter: tokens, lexer, AST, Pratt parser, runtime objects,
//! environments and the tree-walking evaluator.

pub mod ast;
pub mod env;
pub mod eval;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod token;
