//! Test reporters
//!
//! The [`Suite`](crate::suite::Suite) drives a [`TestReporter`] and never prints anything itself, so output
//! formats are swappable:
//! - [`ConsoleReporter`]: pytest-style human output; failures rendered as miette diagnostics.
//! - [`JsonReporter`]: one JSON object per line, for CI tooling.

use std::io::{self, IsTerminal, Write};

use exemplar_core::CaseId;
use miette::{GraphicalReportHandler, GraphicalTheme};
use serde::Serialize;

use crate::suite::{CaseFailure, CaseOutcome, TestSummary};

// ============================================================================
// Test Reporter Trait
// ============================================================================

/// Trait for reporting suite execution.
///
/// Implement this trait to customize the output format.
pub trait TestReporter {
    /// Called once, before collection is reported, when the whole suite is skipped
    fn on_suite_skipped(&mut self, _reason: &str) {}

    /// Called when collection and selection are complete
    fn on_collection_complete(&mut self, selected: usize, deselected: usize);

    /// Called when a case begins
    fn on_case_start(&mut self, case: &CaseId);

    /// Called when a case completes
    fn on_case_complete(&mut self, case: &CaseId, outcome: &CaseOutcome);

    /// Called when all selected cases have completed
    fn on_run_complete(&mut self, summary: &TestSummary);
}

// ============================================================================
// Console
// ============================================================================

const GREEN: &str = "32";
const RED: &str = "31";
const YELLOW: &str = "33";
const BOLD: &str = "1";
const BOLD_RED: &str = "1;31";

/// Default console reporter (pytest-style)
pub struct ConsoleReporter<W: Write = io::Stderr> {
    out: W,
    verbose: bool,
    color: bool,
    failures: Vec<(CaseId, String)>,
}

impl ConsoleReporter {
    /// Report to stderr, colored when stderr is a terminal.
    pub fn new(verbose: bool) -> Self {
        let color = io::stderr().is_terminal();
        Self::with_writer(io::stderr(), verbose, color)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn with_writer(out: W, verbose: bool, color: bool) -> Self {
        Self {
            out,
            verbose,
            color,
            failures: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{style}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    // Console output is best effort; a closed stderr must not abort the run.
    fn emit(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }

    fn render_failure(&self, failure: &CaseFailure) -> String {
        let theme = if self.color {
            GraphicalTheme::unicode()
        } else {
            GraphicalTheme::unicode_nocolor()
        };
        let mut rendered = String::new();
        match GraphicalReportHandler::new_themed(theme).render_report(&mut rendered, failure) {
            Ok(()) => rendered,
            Err(_) => failure.to_string(),
        }
    }
}

impl<W: Write> TestReporter for ConsoleReporter<W> {
    fn on_suite_skipped(&mut self, reason: &str) {
        let line = format!("{} ({reason})\n", self.paint(YELLOW, "SKIPPED all examples"));
        self.emit(&line);
    }

    fn on_collection_complete(&mut self, selected: usize, deselected: usize) {
        let mut text = format!(
            "{}\n",
            self.paint(BOLD, "=================== example session starts ===================")
        );
        text.push_str(&format!("collected {} item(s)", selected + deselected));
        if deselected > 0 {
            text.push_str(&format!(" / {deselected} deselected"));
        }
        text.push_str("\n\n");
        self.emit(&text);
    }

    fn on_case_start(&mut self, case: &CaseId) {
        if self.verbose {
            self.emit(&format!("{case} "));
        }
    }

    fn on_case_complete(&mut self, case: &CaseId, outcome: &CaseOutcome) {
        let status = match outcome {
            CaseOutcome::Passed(d) if self.verbose => {
                format!("{} ({}ms)", self.paint(GREEN, "PASSED"), d.as_millis())
            }
            CaseOutcome::Passed(_) => self.paint(GREEN, "."),
            CaseOutcome::Failed(d, _) if self.verbose => {
                format!("{} ({}ms)", self.paint(RED, "FAILED"), d.as_millis())
            }
            CaseOutcome::Failed(..) => self.paint(RED, "F"),
            CaseOutcome::Skipped(reason) if self.verbose => {
                format!("{} ({reason})", self.paint(YELLOW, "SKIPPED"))
            }
            CaseOutcome::Skipped(_) => self.paint(YELLOW, "s"),
        };

        if self.verbose {
            self.emit(&format!("{status}\n"));
        } else {
            self.emit(&status);
        }

        if let CaseOutcome::Failed(_, failure) = outcome {
            let rendered = self.render_failure(failure);
            self.failures.push((case.clone(), rendered));
        }
    }

    fn on_run_complete(&mut self, summary: &TestSummary) {
        let mut text = String::new();
        if !self.verbose && summary.total() > 0 {
            text.push('\n');
        }

        if !self.failures.is_empty() {
            text.push('\n');
            text.push_str(&self.paint(BOLD_RED, "=================== FAILURES ==================="));
            text.push('\n');
            for (case, rendered) in &self.failures {
                text.push('\n');
                text.push_str(&self.paint(BOLD, &format!("___________ {case} ___________")));
                text.push_str("\n\n");
                text.push_str(rendered);
                if !rendered.ends_with('\n') {
                    text.push('\n');
                }
            }
        }

        let mut parts = Vec::new();
        if summary.passed > 0 {
            parts.push(self.paint(GREEN, &format!("{} passed", summary.passed)));
        }
        if summary.failed > 0 {
            parts.push(self.paint(RED, &format!("{} failed", summary.failed)));
        }
        if summary.skipped > 0 {
            parts.push(self.paint(YELLOW, &format!("{} skipped", summary.skipped)));
        }
        if summary.deselected > 0 {
            parts.push(format!("{} deselected", summary.deselected));
        }
        if parts.is_empty() {
            parts.push("no examples ran".to_string());
        }

        text.push('\n');
        text.push_str(&format!(
            "====== {} in {:.2}s ======\n",
            parts.join(", "),
            summary.duration.as_secs_f64()
        ));
        self.emit(&text);
    }
}

// ============================================================================
// JSON lines
// ============================================================================

#[derive(Serialize)]
struct CaseRecord<'a> {
    case: String,
    category: &'a str,
    file: &'a str,
    status: &'static str,
    duration_ms: u64,
    kind: Option<&'static str>,
    message: Option<String>,
}

#[derive(Serialize)]
struct SkippedRecord<'a> {
    skipped: &'a str,
}

#[derive(Serialize)]
struct SummaryRecord {
    summary: SummaryBody,
}

#[derive(Serialize)]
struct SummaryBody {
    passed: usize,
    failed: usize,
    skipped: usize,
    deselected: usize,
    duration_ms: u64,
    success: bool,
}

/// Writes one JSON object per case, then one summary object. A skipped suite is announced first with a
/// `{"skipped": reason}` object.
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_record<T: Serialize>(&mut self, record: &T) {
        let written = serde_json::to_writer(&mut self.out, record)
            .map_err(io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"));
        if let Err(e) = written {
            tracing::warn!("failed to write JSON report line: {}", e);
        }
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl<W: Write> TestReporter for JsonReporter<W> {
    fn on_suite_skipped(&mut self, reason: &str) {
        self.write_record(&SkippedRecord { skipped: reason });
    }

    fn on_collection_complete(&mut self, _selected: usize, _deselected: usize) {}

    fn on_case_start(&mut self, _case: &CaseId) {}

    fn on_case_complete(&mut self, case: &CaseId, outcome: &CaseOutcome) {
        let (kind, message) = match outcome {
            CaseOutcome::Passed(_) => (None, None),
            CaseOutcome::Failed(_, failure) => (Some(failure.kind().as_str()), Some(failure.to_string())),
            CaseOutcome::Skipped(reason) => (None, Some(reason.clone())),
        };
        let record = CaseRecord {
            case: case.to_string(),
            category: &case.category,
            file: &case.file_name,
            status: outcome.status().as_str(),
            duration_ms: millis(outcome.duration()),
            kind,
            message,
        };
        self.write_record(&record);
    }

    fn on_run_complete(&mut self, summary: &TestSummary) {
        let record = SummaryRecord {
            summary: SummaryBody {
                passed: summary.passed,
                failed: summary.failed,
                skipped: summary.skipped,
                deselected: summary.deselected,
                duration_ms: millis(summary.duration),
                success: summary.is_success(),
            },
        };
        self.write_record(&record);
        let _ = self.out.flush();
    }
}
