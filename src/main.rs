use anyhow::{Context, Result, bail};
use clap::Parser;
use monkey::cli::{Cli, Commands, RunArgs};
use monkey::engine::env::Environment;
use monkey::engine::object::Object;
use monkey::repl::{format_parse_errors, start_repl};
use monkey::{SourceError, evaluate_source, logging};
use std::fs;
use tracing::{debug, info};

fn run(args: RunArgs) -> Result<()> {
    let source = match (args.expr, args.file) {
        (Some(expr), _) => expr,
        (None, Some(path)) => fs::read_to_string(&path)
            .with_context(|| format!("Failed to read source file {}", path.display()))?,
        (None, None) => bail!("Either --expr or a FILE is required"),
    };
    debug!(bytes = source.len(), "Evaluating program");

    match evaluate_source(&source, Environment::new()) {
        Ok(Some(result)) => {
            if let Object::Error(message) = result.as_ref() {
                bail!("{}", message);
            }
            println!("{}", result.inspect());
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(SourceError::Parse(errors)) => {
            eprint!("{}", format_parse_errors(&errors));
            bail!("{}", SourceError::Parse(errors));
        }
    }
}

fn main() -> Result<()> {
    logging::init_logging();

    let cli = Cli::parse();
    info!(?cli, "Parsed CLI arguments");

    match cli.command {
        Some(Commands::Run(args)) => run(args),
        Some(Commands::Repl) | None => start_repl(Environment::new(), cli.history_file),
    }
}
