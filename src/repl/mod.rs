//! Interactive read-eval-print loop.

pub mod highlighter;
mod history;

use crate::engine::env::Environment;
use crate::engine::parser::ParseError;
use crate::{SourceError, evaluate_source};
use anyhow::Context;
use highlighter::ReplHelper;
use owo_colors::OwoColorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use std::cell::RefCell;
use std::io::{self, Write};
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{info, warn};

const PROMPT: &str = ">> ";

pub const MONKEY_FACE: &str = r#"            __,__
   .--.  .-"     "-.  .--.
  / .. \/  .-. .-.  \/ .. \
 | |  '|  /   Y   \  |'  | |
 | \   \  \ 0 | 0 /  /   / |
  \ '- ,\.-"""""""-./, -' /
   ''-' /_   ^ ^   _\ '-''
       |  \._   _./  |
       \   \ '~' /   /
        '._ '-=-' _.'
           '-----'
"#;

/// Renders parser diagnostics under the banner, one tab-indented line each.
pub fn format_parse_errors(errors: &[ParseError]) -> String {
    let mut report = String::from(MONKEY_FACE);
    report.push_str("Woops! We ran into some monkey business here!\n");
    report.push_str(" parser errors:\n");
    for error in errors {
        report.push_str(&format!("\t{}\n", error));
    }
    report
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineControl {
    Continue,
    Exit,
}

/// Evaluates one REPL line, writing results to `out` and diagnostics to `err`.
fn process_line(
    line: &str,
    env: &Rc<RefCell<Environment>>,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<LineControl> {
    let input = line.trim();
    if input.is_empty() {
        return Ok(LineControl::Continue);
    }
    if input == ".exit" {
        info!("Exiting REPL session via user command.");
        return Ok(LineControl::Exit);
    }

    match evaluate_source(input, Rc::clone(env)) {
        Ok(Some(result)) if result.is_error() => writeln!(out, "{}", result.inspect().red())?,
        Ok(Some(result)) => writeln!(out, "{}", result.inspect())?,
        Ok(None) => {}
        Err(SourceError::Parse(errors)) => write!(err, "{}", format_parse_errors(&errors))?,
    }
    Ok(LineControl::Continue)
}

#[tracing::instrument(skip(env))]
pub fn start_repl(
    env: Rc<RefCell<Environment>>,
    history_override: Option<PathBuf>,
) -> anyhow::Result<()> {
    info!("Starting REPL session with rustyline");
    let mut rl = Editor::<ReplHelper, DefaultHistory>::new()
        .context("Failed to initialise the line editor")?;
    rl.set_helper(Some(ReplHelper::new()));

    let history_path = history::resolve_history_path(history_override);
    match &history_path {
        Some(path) => history::load_history_from_path(&mut rl, path),
        None => warn!("Could not determine history file path. History will not be saved."),
    }

    println!("Hello! This is the Monkey programming language!");
    println!("Feel free to type in commands (.exit or Ctrl-D to leave)");

    let stdout = io::stdout();
    let stderr = io::stderr();
    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(err) = rl.add_history_entry(line.as_str()) {
                        warn!("Failed to add line to history: {}", err);
                    }
                }
                let control = process_line(&line, &env, &mut stdout.lock(), &mut stderr.lock())
                    .context("Failed to write REPL output")?;
                if control == LineControl::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                info!("REPL interrupted (Ctrl-C), clearing line.");
            }
            Err(ReadlineError::Eof) => {
                info!("REPL EOF detected (Ctrl-D).");
                break;
            }
            Err(err) => {
                return Err(err).context("Failed to read REPL input");
            }
        }
    }

    if let Some(path) = &history_path {
        history::save_history_to_path(&mut rl, path);
    }
    Ok(())
}
