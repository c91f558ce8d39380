//! Suite runner
//!
//! Collection happens once, up front, for every configured category; execution then walks the collected cases
//! sequentially, in collection order. Each case's outcome is independent: a failing example never prevents
//! the next one from running (unless `stop_on_fail` is requested).
//!
//! ## Skipped suites
//!
//! When the [`SkipGate`] is closed nothing is loaded. Categories that can still be listed contribute one
//! skipped case per file; when the Examples Root itself is missing there is nothing to list, so the suite
//! reports zero cases and the skip reason.

use std::time::{Duration, Instant};

use exemplar_core::{CaseId, CaseStatus, FailureKind};
use miette::Diagnostic;
use thiserror::Error;

use crate::config::ExamplesConfig;
use crate::discovery::{DiscoveryError, ExampleEntry, ExamplesRoot, collect_category, list_category_files};
use crate::execution::{ExampleFailure, ExecutionAdapter};
use crate::gate::SkipGate;
use crate::loader::ModuleLoader;
use crate::report::TestReporter;

/// File-name slot used for the single case reported when a whole category cannot be listed.
pub const CATEGORY_CASE_NAME: &str = "<category>";

/// What a case failed with.
#[derive(Debug, Error, Diagnostic)]
pub enum CaseFailure {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Example(#[from] ExampleFailure),

    #[error(transparent)]
    #[diagnostic(
        code(exemplar::collection),
        help("the category directory exists in the configuration but could not be enumerated")
    )]
    Collection(#[from] DiscoveryError),
}

impl CaseFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            CaseFailure::Example(failure) => failure.kind(),
            CaseFailure::Collection(_) => FailureKind::Collection,
        }
    }
}

/// Result of running a single case.
#[derive(Debug)]
pub enum CaseOutcome {
    Passed(Duration),
    Failed(Duration, CaseFailure),
    Skipped(String),
}

impl CaseOutcome {
    pub fn status(&self) -> CaseStatus {
        match self {
            CaseOutcome::Passed(_) => CaseStatus::Passed,
            CaseOutcome::Failed(..) => CaseStatus::Failed,
            CaseOutcome::Skipped(_) => CaseStatus::Skipped,
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            CaseOutcome::Passed(d) | CaseOutcome::Failed(d, _) => *d,
            CaseOutcome::Skipped(_) => Duration::ZERO,
        }
    }

    pub fn failure(&self) -> Option<&CaseFailure> {
        match self {
            CaseOutcome::Failed(_, failure) => Some(failure),
            _ => None,
        }
    }
}

/// How a case looked at the end of collection.
#[derive(Debug)]
pub enum CaseState {
    /// Discovered and load attempted; the entry holds the module or its load error.
    Ready(ExampleEntry),
    /// Discovered while the suite is skipped; never loaded.
    Skipped(&'static str),
    /// The category could not be listed.
    Uncollectable(DiscoveryError),
}

/// One collected case.
#[derive(Debug)]
pub struct Case {
    id: CaseId,
    state: CaseState,
}

impl Case {
    pub fn id(&self) -> &CaseId {
        &self.id
    }

    pub fn state(&self) -> &CaseState {
        &self.state
    }
}

/// Run-time selection options.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Keep only cases whose id contains this keyword.
    pub filter: Option<String>,
    /// Stop after the first failed case.
    pub stop_on_fail: bool,
}

/// Summary of a suite run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TestSummary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub deselected: usize,
    pub duration: Duration,
}

impl TestSummary {
    /// Skipped and deselected cases never fail a run.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    fn record(&mut self, status: CaseStatus) {
        match status {
            CaseStatus::Passed => self.passed += 1,
            CaseStatus::Failed => self.failed += 1,
            CaseStatus::Skipped => self.skipped += 1,
        }
    }
}

/// A collected, not yet executed, suite.
#[derive(Debug)]
pub struct Suite {
    cases: Vec<Case>,
    skip_reason: Option<&'static str>,
    adapter: ExecutionAdapter,
}

impl Suite {
    /// Collect every configured category.
    ///
    /// ## Parameters
    /// - `config`: categories, extension and entry point name.
    /// - `root`: the resolved Examples Root.
    /// - `gate`: the skip decision, evaluated once by the caller.
    /// - `loader`: used for every example unless the gate is closed.
    #[tracing::instrument(skip_all, fields(root = %root.path().display()))]
    pub fn collect(config: &ExamplesConfig, root: &ExamplesRoot, gate: SkipGate, loader: &dyn ModuleLoader) -> Self {
        let mut cases = Vec::new();

        for category in &config.categories {
            match gate.reason() {
                Some(reason) => {
                    if !root.category_dir(category).is_dir() {
                        continue;
                    }
                    match list_category_files(root, category, &config.extension) {
                        Ok(files) => cases.extend(files.into_iter().map(|file_name| Case {
                            id: CaseId::new(category.as_str(), file_name),
                            state: CaseState::Skipped(reason),
                        })),
                        Err(e) => tracing::debug!("not listing skipped category: {}", e),
                    }
                }
                None => match collect_category(loader, root, category, &config.extension) {
                    Ok(entries) => cases.extend(entries.into_iter().map(|entry| Case {
                        id: CaseId::new(category.as_str(), entry.file_name.as_str()),
                        state: CaseState::Ready(entry),
                    })),
                    Err(e) => {
                        tracing::warn!("{}", e);
                        cases.push(Case {
                            id: CaseId::new(category.as_str(), CATEGORY_CASE_NAME),
                            state: CaseState::Uncollectable(e),
                        });
                    }
                },
            }
        }

        tracing::debug!(count = cases.len(), skipped = gate.is_skipped(), "collection complete");
        Self {
            cases,
            skip_reason: gate.reason(),
            adapter: ExecutionAdapter::new(config.entry_point.as_str()),
        }
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// `Some(reason)` when the whole suite is skipped.
    pub fn skip_reason(&self) -> Option<&'static str> {
        self.skip_reason
    }

    /// Execute the collected cases.
    ///
    /// Cases run one at a time in collection order; a case that hangs hangs the run. The suite is consumed
    /// since each loaded module moves into its own outcome.
    pub fn run(self, options: &RunOptions, reporter: &mut dyn TestReporter) -> TestSummary {
        let start = Instant::now();
        let mut summary = TestSummary::default();

        let (selected, deselected): (Vec<Case>, Vec<Case>) = self
            .cases
            .into_iter()
            .partition(|case| options.filter.as_deref().is_none_or(|keyword| case.id.matches(keyword)));
        summary.deselected = deselected.len();

        if let Some(reason) = self.skip_reason {
            reporter.on_suite_skipped(reason);
        }
        reporter.on_collection_complete(selected.len(), summary.deselected);

        for Case { id, state } in selected {
            reporter.on_case_start(&id);
            let outcome = run_case(&self.adapter, state);
            summary.record(outcome.status());
            reporter.on_case_complete(&id, &outcome);

            if options.stop_on_fail && outcome.status() == CaseStatus::Failed {
                tracing::debug!(case = %id, "stopping after first failure");
                break;
            }
        }

        summary.duration = start.elapsed();
        reporter.on_run_complete(&summary);
        summary
    }
}

fn run_case(adapter: &ExecutionAdapter, state: CaseState) -> CaseOutcome {
    match state {
        CaseState::Skipped(reason) => CaseOutcome::Skipped(reason.to_string()),
        CaseState::Uncollectable(e) => CaseOutcome::Failed(Duration::ZERO, e.into()),
        CaseState::Ready(entry) => {
            let start = Instant::now();
            let result = adapter.run(entry);
            let elapsed = start.elapsed();
            match result {
                Ok(()) => CaseOutcome::Passed(elapsed),
                Err(failure) => CaseOutcome::Failed(elapsed, failure.into()),
            }
        }
    }
}
