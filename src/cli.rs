use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// An interpreter for the Monkey programming language.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(name = "monkey", bin_name = "monkey")]
pub struct Cli {
    /// Starts the REPL when omitted.
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Where the REPL keeps line history. Defaults to the platform data directory.
    #[clap(long, value_name = "PATH", env = "MONKEY_HISTORY", global = true)]
    pub history_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluates Monkey code from a string or a source file.
    Run(RunArgs),
    /// Starts an interactive session.
    Repl,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Monkey source to evaluate.
    #[clap(short, long, value_name = "CODE", conflicts_with = "file")]
    pub expr: Option<String>,

    /// Path to a Monkey source file.
    #[clap(
        value_name = "FILE",
        conflicts_with = "expr",
        required_unless_present = "expr"
    )]
    pub file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_repl() {
        let cli = Cli::try_parse_from(["monkey"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn run_with_expr() {
        let cli = Cli::try_parse_from(["monkey", "run", "--expr", "1 + 2"]).unwrap();
        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.expr.as_deref(), Some("1 + 2"));
                assert!(args.file.is_none());
            }
            other => panic!("Expected run command, got {:?}", other),
        }
    }

    #[test]
    fn run_with_file() {
        let cli = Cli::try_parse_from(["monkey", "run", "prog.mk"]).unwrap();
        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.file, Some(PathBuf::from("prog.mk")));
            }
            other => panic!("Expected run command, got {:?}", other),
        }
    }

    #[test]
    fn run_requires_expr_or_file() {
        assert!(Cli::try_parse_from(["monkey", "run"]).is_err());
        assert!(Cli::try_parse_from(["monkey", "run", "-e", "1", "prog.mk"]).is_err());
    }

    #[test]
    fn repl_history_flag() {
        let cli =
            Cli::try_parse_from(["monkey", "repl", "--history-file", "/tmp/h.txt"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Repl)));
        assert_eq!(cli.history_file, Some(PathBuf::from("/tmp/h.txt")));
    }

    #[test]
    fn history_flag_without_subcommand() {
        let cli = Cli::try_parse_from(["monkey", "--history-file", "/tmp/h.txt"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.history_file, Some(PathBuf::from("/tmp/h.txt")));
    }
}
