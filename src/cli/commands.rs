//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::io;

use exemplar_core::{CaseId, SKIP_REASON};

use crate::config::HarnessConfig;
use crate::discovery::{ExamplesRoot, list_category_files};
use crate::gate::SkipGate;
use crate::loader::ScriptRuntime;
use crate::report::{ConsoleReporter, JsonReporter};
use crate::suite::{CATEGORY_CASE_NAME, CaseState, RunOptions, Suite};

use super::{CliError, CliResult, ExitCode, OutputFormat, SuiteArgs};

// ============================================================================
// Harness preparation (shared between run and list)
// ============================================================================

/// Configuration with CLI overrides applied, plus the resolved Examples Root.
struct PreparedHarness {
    config: HarnessConfig,
    root: ExamplesRoot,
}

fn prepare(args: &SuiteArgs) -> CliResult<PreparedHarness> {
    let mut config =
        HarnessConfig::load(args.config.as_deref()).map_err(|e| CliError::failure(format!("Error: {e}")))?;

    if let Some(root) = &args.root {
        config.examples.root = Some(root.clone());
    }
    if !args.categories.is_empty() {
        config.examples.categories = args.categories.clone();
        config.validate().map_err(|e| CliError::failure(format!("Error: {e}")))?;
    }

    let root = ExamplesRoot::from_config(&config.examples);
    tracing::debug!(root = %root.path().display(), categories = ?config.examples.categories, "prepared harness");
    Ok(PreparedHarness { config, root })
}

/// Interpreter runtime whose load probe looks for the configured entry point.
fn script_runtime(config: &HarnessConfig) -> ScriptRuntime {
    ScriptRuntime::new(config.runtime.clone()).with_entry_point(config.examples.entry_point.as_str())
}

fn exit_code(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

// ============================================================================
// run
// ============================================================================

/// Collect and run every configured example.
pub fn run_examples(
    args: &SuiteArgs,
    verbose: bool,
    stop_on_fail: bool,
    filter: Option<String>,
    format: OutputFormat,
) -> CliResult<ExitCode> {
    let PreparedHarness { config, root } = prepare(args)?;

    let gate = SkipGate::from_env(&config.examples.skip_env, &root);
    let runtime = script_runtime(&config);
    let suite = Suite::collect(&config.examples, &root, gate, &runtime);

    let options = RunOptions { filter, stop_on_fail };
    let summary = match format {
        OutputFormat::Console => suite.run(&options, &mut ConsoleReporter::new(verbose)),
        OutputFormat::Json => suite.run(&options, &mut JsonReporter::new(io::stdout().lock())),
    };

    Ok(exit_code(summary.is_success()))
}

// ============================================================================
// list
// ============================================================================

/// Lines to print for `list`, and whether every category and (when loading) every example was healthy.
#[derive(Debug, Default)]
struct Listing {
    lines: Vec<String>,
    ok: bool,
}

/// List configured examples; with `load`, also import each one and report its status.
pub fn list_examples(args: &SuiteArgs, load: bool) -> CliResult<ExitCode> {
    let prepared = prepare(args)?;
    let listing = if load {
        loaded_listing(&prepared)
    } else {
        file_listing(&prepared)
    };

    for line in &listing.lines {
        println!("{line}");
    }
    Ok(exit_code(listing.ok))
}

fn file_listing(prepared: &PreparedHarness) -> Listing {
    let PreparedHarness { config, root } = prepared;
    let mut listing = Listing {
        lines: Vec::new(),
        ok: true,
    };

    if !root.exists() {
        listing
            .lines
            .push(format!("examples root '{}' not found ({SKIP_REASON})", root.path().display()));
        return listing;
    }

    for category in &config.examples.categories {
        match list_category_files(root, category, &config.examples.extension) {
            Ok(files) => listing
                .lines
                .extend(files.into_iter().map(|file| CaseId::new(category.as_str(), file).to_string())),
            Err(e) => {
                listing.lines.push(format!("{category}::{CATEGORY_CASE_NAME} error: {e}"));
                listing.ok = false;
            }
        }
    }
    listing
}

fn loaded_listing(prepared: &PreparedHarness) -> Listing {
    let PreparedHarness { config, root } = prepared;
    let gate = SkipGate::from_env(&config.examples.skip_env, root);
    let runtime = script_runtime(config);
    let suite = Suite::collect(&config.examples, root, gate, &runtime);

    let mut listing = Listing {
        lines: Vec::new(),
        ok: true,
    };
    if let Some(reason) = suite.skip_reason() {
        listing.lines.push(format!("all examples skipped ({reason})"));
    }

    for case in suite.cases() {
        let status = match case.state() {
            CaseState::Ready(entry) => match &entry.module {
                Ok(module) => format!("loaded as {}", module.qualified_name()),
                Err(e) => {
                    listing.ok = false;
                    let first_line = e.to_string().lines().next().unwrap_or_default().to_string();
                    format!("import failed: {first_line}")
                }
            },
            CaseState::Skipped(reason) => format!("skipped ({reason})"),
            CaseState::Uncollectable(e) => {
                listing.ok = false;
                format!("error: {e}")
            }
        };
        listing.lines.push(format!("{} {status}", case.id()));
    }
    listing
}
