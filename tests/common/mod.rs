//! Shared helpers for integration tests: on-disk example trees and a `/bin/sh` script runtime.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::process::Command;

use exemplar::RuntimeConfig;

/// Load probe: source the script, then print the entry point behind the export prefix when it is defined.
pub const SH_LOAD_PROBE: &str = r#". "$1" && if command -v "$3" >/dev/null 2>&1; then echo "$2$3"; fi"#;

/// Invoke: source the script quietly, then call the entry point by name.
pub const SH_INVOKE: &str = r#". "$1" >/dev/null && "$2""#;

/// A `main` that completes.
pub const SH_HELLO: &str = "main() {\n    echo \"hello from main\"\n}\n";

/// Fails while being sourced, the shell equivalent of an import-time error.
pub const SH_BROKEN: &str = "echo \"ImportError: no module named nothing\" >&2\nexit 1\n";

/// Loads fine but defines no `main`.
pub const SH_NOMAIN: &str = "GREETING=hello\n";

/// `main` that fails.
pub const SH_RAISES: &str = "main() {\n    echo \"RuntimeError: boom\" >&2\n    return 4\n}\n";

pub fn sh_runtime() -> RuntimeConfig {
    let args = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    RuntimeConfig {
        program: "sh".to_string(),
        load_args: args(&["-c", SH_LOAD_PROBE, "probe", "{path}", "{export_prefix}", "{entry}"]),
        invoke_args: args(&["-c", SH_INVOKE, "invoke", "{path}", "{entry}"]),
        ..RuntimeConfig::default()
    }
}

/// Write `root/category/file_name` with `body`, creating directories as needed.
pub fn write_example(root: &Path, category: &str, file_name: &str, body: &str) {
    let dir = root.join(category);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file_name), body).unwrap();
}

/// Whether `program --version` can be spawned and succeeds.
pub fn has_program(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}
