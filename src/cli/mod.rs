//! CLI module for the exemplar harness
//!
//! ## Commands
//!
//! - `run` - Collect and run every example (pytest-style output)
//! - `list` - Collect only; optionally load each example and report its status
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::version::EXEMPLAR_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Run every example script and report which ones broke
#[derive(Parser, Debug)]
#[command(name = "exemplar")]
#[command(version = EXEMPLAR_VERSION)]
#[command(about = "Regression harness for example scripts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Where the examples live and which categories to visit.
#[derive(Args, Debug, Clone, Default)]
pub struct SuiteArgs {
    /// Harness config file (default: ./exemplar.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Examples Root, overriding the configured or resolved one
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Category to visit; repeat to visit several (default: from config)
    #[arg(long = "category", value_name = "NAME")]
    pub categories: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable, pytest-style
    #[default]
    Console,
    /// One JSON object per line on stdout
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Collect and run every example
    Run {
        #[command(flatten)]
        suite: SuiteArgs,
        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
        /// Stop on first failure
        #[arg(short = 'x', long = "exitfirst")]
        stop_on_fail: bool,
        /// Filter examples by keyword expression
        #[arg(short = 'k', value_name = "EXPR")]
        filter: Option<String>,
        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
        format: OutputFormat,
    },

    /// List discovered examples without running them
    List {
        #[command(flatten)]
        suite: SuiteArgs,
        /// Load each example and report whether it imports
        #[arg(long)]
        load: bool,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Run {
            suite,
            verbose,
            stop_on_fail,
            filter,
            format,
        } => commands::run_examples(&suite, verbose, stop_on_fail, filter, format),
        Command::List { suite, load } => commands::list_examples(&suite, load),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_run_defaults() {
        let cli = Cli::try_parse_from(["exemplar", "run"]).unwrap();
        if let Command::Run {
            suite,
            verbose,
            stop_on_fail,
            filter,
            format,
        } = cli.command
        {
            assert!(suite.config.is_none());
            assert!(suite.root.is_none());
            assert!(suite.categories.is_empty());
            assert!(!verbose);
            assert!(!stop_on_fail);
            assert!(filter.is_none());
            assert_eq!(format, OutputFormat::Console);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_parse_run_flags() {
        let cli = Cli::try_parse_from(["exemplar", "run", "-v", "-x", "-k", "hello", "--format", "json"]).unwrap();
        if let Command::Run {
            verbose,
            stop_on_fail,
            filter,
            format,
            ..
        } = cli.command
        {
            assert!(verbose);
            assert!(stop_on_fail);
            assert_eq!(filter.as_deref(), Some("hello"));
            assert_eq!(format, OutputFormat::Json);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_parse_repeated_categories() {
        let cli = Cli::try_parse_from([
            "exemplar",
            "run",
            "--root",
            "demo",
            "--category",
            "1_basics",
            "--category",
            "3_advanced",
        ])
        .unwrap();
        if let Command::Run { suite, .. } = cli.command {
            assert_eq!(suite.root, Some(PathBuf::from("demo")));
            assert_eq!(suite.categories, vec!["1_basics", "3_advanced"]);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_parse_list_load() {
        let cli = Cli::try_parse_from(["exemplar", "list", "--config", "exemplar.toml", "--load"]).unwrap();
        if let Command::List { suite, load } = cli.command {
            assert!(load);
            assert_eq!(suite.config, Some(PathBuf::from("exemplar.toml")));
        } else {
            panic!("Expected List command");
        }
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["exemplar", "run", "--format", "tap"]).is_err());
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["exemplar"]).is_err());
    }
}
