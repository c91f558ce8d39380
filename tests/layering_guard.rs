//! Layering guardrails to keep the vocabulary crate free of dependencies.
//!
//! `exemplar_core` holds naming and outcome rules only; it must stay IO-free and dependency-free so any loader
//! or reporter can use it. This test scans its `Cargo.toml` and fails if `[dependencies]` lists anything.

#[test]
fn core_crate_has_no_dependencies() {
    let manifest = include_str!("../crates/exemplar_core/Cargo.toml");
    let mut in_dependencies = false;

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }

        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        assert!(
            line_no_comment.is_empty(),
            "`exemplar_core` must not have [dependencies], found `{line_no_comment}`"
        );
    }
}

#[test]
fn core_crate_does_no_io() {
    let sources = [
        include_str!("../crates/exemplar_core/src/lib.rs"),
        include_str!("../crates/exemplar_core/src/naming.rs"),
        include_str!("../crates/exemplar_core/src/outcome.rs"),
    ];
    for source in sources {
        for forbidden in ["std::fs", "std::process", "std::env", "std::io"] {
            assert!(!source.contains(forbidden), "`exemplar_core` must not use `{forbidden}`");
        }
    }
}
