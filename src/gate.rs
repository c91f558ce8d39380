//! Suite-wide skip gate
//!
//! The gate is evaluated **once**, before collection, and applies to every category. It skips when either:
//! - the skip environment variable is present (its value is ignored, an empty value still skips), or
//! - the Examples Root does not exist on disk.
//!
//! The environment lookup is injected so the decision can be exercised without mutating the process
//! environment; [`SkipGate::from_env`] wires in the real one.

use std::ffi::OsString;
use std::fmt;

use exemplar_core::SKIP_REASON;

use crate::discovery::ExamplesRoot;

/// Which trigger caused the suite to be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipCause {
    /// The skip environment variable is set
    Disabled,
    /// The Examples Root is missing
    RootMissing,
}

impl fmt::Display for SkipCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipCause::Disabled => write!(f, "explicitly disabled"),
            SkipCause::RootMissing => write!(f, "examples directory absent"),
        }
    }
}

/// The once-per-suite skip decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SkipGate {
    cause: Option<SkipCause>,
}

impl SkipGate {
    /// A gate that never skips.
    pub fn open() -> Self {
        Self { cause: None }
    }

    /// A gate that skips for the given cause.
    pub fn closed(cause: SkipCause) -> Self {
        Self { cause: Some(cause) }
    }

    /// Evaluate the gate with an injected environment lookup.
    ///
    /// ## Parameters
    /// - `skip_env`: name of the variable whose presence disables the suite.
    /// - `root`: the resolved Examples Root.
    /// - `lookup`: returns the variable's raw value, `None` when unset.
    ///
    /// ## Notes
    /// - When both triggers hold, [`SkipCause::Disabled`] is recorded.
    pub fn evaluate<F>(skip_env: &str, root: &ExamplesRoot, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let gate = if lookup(skip_env).is_some() {
            Self::closed(SkipCause::Disabled)
        } else if !root.exists() {
            Self::closed(SkipCause::RootMissing)
        } else {
            Self::open()
        };

        match gate.cause {
            Some(cause) => tracing::info!(
                root = %root.path().display(),
                %cause,
                "skipping all examples: {}",
                SKIP_REASON
            ),
            None => tracing::debug!(root = %root.path().display(), "examples enabled"),
        }
        gate
    }

    /// Evaluate the gate against the process environment.
    pub fn from_env(skip_env: &str, root: &ExamplesRoot) -> Self {
        Self::evaluate(skip_env, root, |name| std::env::var_os(name))
    }

    pub fn is_skipped(&self) -> bool {
        self.cause.is_some()
    }

    pub fn cause(&self) -> Option<SkipCause> {
        self.cause
    }

    /// The human-readable reason attached to skipped cases, `None` when the suite runs.
    pub fn reason(&self) -> Option<&'static str> {
        self.cause.map(|_| SKIP_REASON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unset(_: &str) -> Option<OsString> {
        None
    }

    #[test]
    fn test_open_when_flag_unset_and_root_present() {
        let dir = tempfile::tempdir().unwrap();
        let root = ExamplesRoot::from_path(dir.path());
        let gate = SkipGate::evaluate("EXEMPLAR_TEST_SKIP", &root, unset);
        assert!(!gate.is_skipped());
        assert_eq!(gate.reason(), None);
    }

    #[test]
    fn test_flag_skips_even_with_root_present() {
        let dir = tempfile::tempdir().unwrap();
        let root = ExamplesRoot::from_path(dir.path());
        let gate = SkipGate::evaluate("EXEMPLAR_TEST_SKIP", &root, |name| {
            (name == "EXEMPLAR_TEST_SKIP").then(|| OsString::from("0"))
        });
        assert!(gate.is_skipped());
        assert_eq!(gate.cause(), Some(SkipCause::Disabled));
    }

    #[test]
    fn test_flag_value_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let root = ExamplesRoot::from_path(dir.path());
        let gate = SkipGate::evaluate("EXEMPLAR_TEST_SKIP", &root, |_| Some(OsString::new()));
        assert!(gate.is_skipped());
    }

    #[test]
    fn test_missing_root_skips_with_flag_unset() {
        let dir = tempfile::tempdir().unwrap();
        let root = ExamplesRoot::from_path(dir.path().join("examples"));
        let gate = SkipGate::evaluate("EXEMPLAR_TEST_SKIP", &root, unset);
        assert_eq!(gate.cause(), Some(SkipCause::RootMissing));
        assert_eq!(gate.reason(), Some(SKIP_REASON));
    }

    #[test]
    fn test_other_variables_do_not_skip() {
        let dir = tempfile::tempdir().unwrap();
        let root = ExamplesRoot::from_path(dir.path());
        let gate = SkipGate::evaluate("EXEMPLAR_TEST_SKIP", &root, |name| {
            (name == "SOMETHING_ELSE").then(|| OsString::from("1"))
        });
        assert!(!gate.is_skipped());
    }

    #[test]
    fn test_cause_display_distinguishes_triggers() {
        assert_ne!(SkipCause::Disabled.to_string(), SkipCause::RootMissing.to_string());
    }
}
