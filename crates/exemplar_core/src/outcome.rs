//! Define the outcome vocabulary shared by the runner and its reporters.

/// Classify why a case failed.
///
/// ## Notes
/// - All three kinds are reported as the same failure class; the kind only exists so a human (or a JSON
///   consumer) can tell them apart without re-running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The module could not be loaded at collection time.
    ImportFailed,
    /// The module loaded but does not expose the entry point.
    EntryPointMissing,
    /// The entry point was called and raised.
    EntryPointFailed,
    /// The category itself could not be enumerated.
    Collection,
}

impl FailureKind {
    /// Return the stable diagnostic code for this kind.
    pub fn code(self) -> &'static str {
        match self {
            FailureKind::ImportFailed => "exemplar::import_failed",
            FailureKind::EntryPointMissing => "exemplar::entry_point_missing",
            FailureKind::EntryPointFailed => "exemplar::entry_point_failed",
            FailureKind::Collection => "exemplar::collection",
        }
    }

    /// Return the short, snake_case name used in machine-readable output.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::ImportFailed => "import_failed",
            FailureKind::EntryPointMissing => "entry_point_missing",
            FailureKind::EntryPointFailed => "entry_point_failed",
            FailureKind::Collection => "collection",
        }
    }
}

/// Final status of one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseStatus {
    Passed,
    Failed,
    Skipped,
}

impl CaseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CaseStatus::Passed => "passed",
            CaseStatus::Failed => "failed",
            CaseStatus::Skipped => "skipped",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_codes_are_distinct() {
        let kinds = [
            FailureKind::ImportFailed,
            FailureKind::EntryPointMissing,
            FailureKind::EntryPointFailed,
            FailureKind::Collection,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a.code(), b.code());
                assert_ne!(a.as_str(), b.as_str());
            }
        }
    }

    #[test]
    fn test_codes_carry_kind_name() {
        assert!(FailureKind::ImportFailed.code().ends_with(FailureKind::ImportFailed.as_str()));
    }

    #[test]
    fn test_case_status_names() {
        assert_eq!(CaseStatus::Passed.as_str(), "passed");
        assert_eq!(CaseStatus::Failed.as_str(), "failed");
        assert_eq!(CaseStatus::Skipped.as_str(), "skipped");
    }
}
