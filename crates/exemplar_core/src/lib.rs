//! Provide the shared, pure vocabulary of the exemplar harness.
//!
//! This crate is intentionally small and dependency-free. It holds the rules that decide *which* files count as
//! examples and *what* they are called, plus the outcome vocabulary reporters agree on.
//!
//! ## Notes
//!
//! - This is a "semantic core" crate: **no IO**, no global state, no process spawning.
//! - Filesystem walking, module loading and execution live in the `exemplar` crate.

pub mod naming;
pub mod outcome;

pub use naming::{CaseId, is_example_file, module_stem, qualified_name};
pub use outcome::{CaseStatus, FailureKind};

/// Conventional name of the zero-argument entry point every example must expose.
pub const DEFAULT_ENTRY_POINT: &str = "main";

/// Directory name the Examples Root resolves into.
pub const DEFAULT_EXAMPLES_DIR: &str = "examples";

/// Number of directory levels walked up from the harness anchor before entering [`DEFAULT_EXAMPLES_DIR`].
pub const DEFAULT_LEVELS_UP: usize = 2;

/// Recognized script extension (without the leading dot).
pub const DEFAULT_EXTENSION: &str = "py";

/// Categories enumerated by the default configuration, in run order.
pub const DEFAULT_CATEGORIES: &[&str] = &["1_basics", "2_intermediate"];

/// Environment variable whose presence (any value) skips the whole suite.
pub const DEFAULT_SKIP_ENV: &str = "EXEMPLAR_SKIP_EXAMPLES";

/// Reason attached to every case when the suite is skipped.
///
/// ## Notes
/// - One generic reason covers both triggers (explicitly disabled, examples directory absent).
pub const SKIP_REASON: &str = "no examples present or manually skipping";
