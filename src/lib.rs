#![forbid(unsafe_code)]
//! Example-script regression harness
//!
//! exemplar discovers every example script under `examples/<category>/*.<ext>`, loads each one as a module,
//! asserts it exposes a zero-argument `main`, and calls it. Each script is its own case: a script that fails to
//! import, lacks `main`, or fails while running is reported on its own without stopping the others.
//!
//! ## Pipeline
//!
//! 1. [`gate`]: decide once whether the whole suite is skipped.
//! 2. [`discovery`]: resolve the Examples Root, enumerate categories, load every file via a [`loader`].
//! 3. [`execution`]: assert and invoke each entry point.
//! 4. [`suite`] + [`report`]: drive execution and render outcomes.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Example code**: a panic inside an in-process [`loader::EntryPoint`] is not caught; it aborts the run like
//!   any other harness bug. Script runtimes report failures as exit statuses instead.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod execution;
pub mod gate;
pub mod loader;
pub mod report;
pub mod suite;
pub mod version;

pub use config::{ConfigError, ExamplesConfig, HarnessConfig, RuntimeConfig};
pub use discovery::{DiscoveryError, ExampleEntry, ExamplesRoot, collect_category, list_category_files, load_example};
pub use execution::{ExampleFailure, ExecutionAdapter};
pub use gate::{SkipCause, SkipGate};
pub use loader::{EntryPoint, EntryPointError, LoadError, LoadRequest, Module, ModuleLoader, ScriptRuntime};
pub use report::{ConsoleReporter, JsonReporter, TestReporter};
pub use suite::{Case, CaseFailure, CaseOutcome, CaseState, RunOptions, Suite, TestSummary};

pub use exemplar_core::{CaseId, CaseStatus, FailureKind};
