//! A small interpreter for the Monkey language.
//!
//! Source text flows through [`engine::lexer`] into the Pratt parser in
//! [`engine::parser`], and the resulting AST is reduced to runtime objects by
//! the tree-walking evaluator in [`engine::eval`].

pub mod cli;
pub mod engine;
pub mod logging;
pub mod repl;

use crate::engine::env::Environment;
use crate::engine::eval::eval_program;
use crate::engine::object::Object;
use crate::engine::parser::{ParseError, Parser};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("{} parse error(s)", .0.len())]
    Parse(Vec<ParseError>),
}

/// Parses and evaluates `source` against a caller-owned environment, so
/// bindings survive between calls (one REPL line after another).
///
/// Evaluation failures are values: they come back as `Some(Object::Error)`.
/// `Ok(None)` means there is nothing to show, because the program was empty
/// or ended with a `let` that succeeded.
#[instrument(skip(source, env), fields(source_len = source.len()))]
pub fn evaluate_source(
    source: &str,
    env: Rc<RefCell<Environment>>,
) -> Result<Option<Rc<Object>>, SourceError> {
    let mut parser = Parser::from_source(source);
    let program = parser.parse_program();
    if !parser.errors().is_empty() {
        debug!(count = parser.errors().len(), "Parse failed, skipping evaluation");
        return Err(SourceError::Parse(parser.errors().to_vec()));
    }

    match eval_program(&program, env) {
        Ok(value) => Ok(value),
        Err(error) => Ok(Some(Rc::new(Object::Error(error.to_string())))),
    }
}
