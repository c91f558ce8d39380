//! Harness configuration
//!
//! Configuration is read from a TOML file (`exemplar.toml`) and every field has a default, so an empty file
//! or no file at all yields a working harness: `python3` examples under `../../examples/{1_basics,2_intermediate}`
//! relative to the harness crate's source directory.
//!
//! ```toml
//! [examples]
//! categories = ["1_basics", "2_intermediate"]
//! extension = "py"
//!
//! [runtime]
//! program = "python3"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use exemplar_core::{
    DEFAULT_CATEGORIES, DEFAULT_ENTRY_POINT, DEFAULT_EXAMPLES_DIR, DEFAULT_EXTENSION, DEFAULT_LEVELS_UP,
    DEFAULT_SKIP_ENV,
};
use serde::Deserialize;
use thiserror::Error;

/// File name probed in the working directory when no explicit config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "exemplar.toml";

/// Config files larger than this are rejected.
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Directory the Examples Root is resolved from by default: the harness crate's own source directory.
pub const HARNESS_SOURCE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/src");

/// Prefix marking export names on the load probe's stdout.
pub const DEFAULT_EXPORT_PREFIX: &str = "exemplar-export:";

/// Python host snippet used by the default load command.
///
/// Appends the Examples Root to the import path, imports `<category>.<stem>` and prints the entry point name
/// behind the export prefix when the module resolves it to a truthy value. Only the entry point is looked up, so
/// module-level `__getattr__` is honored and other attributes are never truth-tested.
const PYTHON_LOAD_SNIPPET: &str = "\
import importlib, sys
sys.path.append(sys.argv[1])
module = importlib.import_module(sys.argv[2])
try:
    found = bool(getattr(module, sys.argv[4], None))
except Exception:
    found = False
if found:
    print(sys.argv[3] + sys.argv[4])
";

/// Python host snippet used by the default invoke command.
const PYTHON_INVOKE_SNIPPET: &str = "\
import importlib, sys
sys.path.append(sys.argv[1])
getattr(importlib.import_module(sys.argv[2]), sys.argv[3])()
";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level harness configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Where examples live and how they are recognized
    pub examples: ExamplesConfig,
    /// How examples are loaded and invoked
    pub runtime: RuntimeConfig,
}

/// Discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExamplesConfig {
    /// Explicit Examples Root; overrides anchor-relative resolution
    pub root: Option<PathBuf>,
    /// Directory the root is resolved from
    pub anchor: PathBuf,
    /// Directory levels walked up from `anchor`
    pub levels_up: usize,
    /// Directory entered after walking up
    pub dir_name: String,
    /// Categories to enumerate, in run order
    pub categories: Vec<String>,
    /// Recognized script extension, without the dot
    pub extension: String,
    /// Entry point looked up on every loaded module
    pub entry_point: String,
    /// Environment variable whose presence skips the suite
    pub skip_env: String,
}

impl Default for ExamplesConfig {
    fn default() -> Self {
        Self {
            root: None,
            anchor: PathBuf::from(HARNESS_SOURCE_DIR),
            levels_up: DEFAULT_LEVELS_UP,
            dir_name: DEFAULT_EXAMPLES_DIR.to_string(),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            extension: DEFAULT_EXTENSION.to_string(),
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            skip_env: DEFAULT_SKIP_ENV.to_string(),
        }
    }
}

/// Interpreter settings for the script runtime.
///
/// Argument templates may use `{root}`, `{category}`, `{module}`, `{path}`, `{file}`, `{entry}` and
/// `{export_prefix}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Interpreter executable
    pub program: String,
    /// Arguments for the load probe; a successful exit means the module loaded
    pub load_args: Vec<String>,
    /// Arguments for calling an entry point
    pub invoke_args: Vec<String>,
    /// Prefix marking export names on the load probe's stdout
    pub export_prefix: String,
    /// Extra environment variables for every interpreter process
    pub env: BTreeMap<String, String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            load_args: vec![
                "-c".to_string(),
                PYTHON_LOAD_SNIPPET.to_string(),
                "{root}".to_string(),
                "{module}".to_string(),
                "{export_prefix}".to_string(),
                "{entry}".to_string(),
            ],
            invoke_args: vec![
                "-c".to_string(),
                PYTHON_INVOKE_SNIPPET.to_string(),
                "{root}".to_string(),
                "{module}".to_string(),
                "{entry}".to_string(),
            ],
            export_prefix: DEFAULT_EXPORT_PREFIX.to_string(),
            env: BTreeMap::new(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration using the default resolution rules.
    ///
    /// - An explicit `path` must exist.
    /// - Without one, `./exemplar.toml` is used when present; otherwise defaults apply.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, is oversized, fails to parse, or fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !candidate.is_file() {
                    tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let metadata = fs::metadata(&resolved).map_err(|source| ConfigError::Io {
            path: resolved.clone(),
            source,
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid(format!(
                "config file '{}' exceeds size limit ({} bytes)",
                resolved.display(),
                MAX_CONFIG_FILE_SIZE
            )));
        }
        let content = fs::read_to_string(&resolved).map_err(|source| ConfigError::Io {
            path: resolved.clone(),
            source,
        })?;

        let mut config = Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: resolved.clone(),
                message,
            },
            other => other,
        })?;

        // Relative paths in a config file are relative to the file, not the working directory.
        if let Some(base) = resolved.parent() {
            config.rebase(base);
        }
        tracing::debug!(path = %resolved.display(), "loaded harness config");
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML or unknown keys, [`ConfigError::Invalid`] on values that
    /// fail validation.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            message: e.message().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration for internal consistency.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.examples.validate()?;
        self.runtime.validate()
    }

    fn rebase(&mut self, base: &Path) {
        if let Some(root) = &self.examples.root {
            if root.is_relative() {
                self.examples.root = Some(base.join(root));
            }
        }
        if self.examples.anchor.is_relative() {
            self.examples.anchor = base.join(&self.examples.anchor);
        }
    }
}

impl ExamplesConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.dir_name.trim().is_empty() {
            return Err(ConfigError::Invalid("examples.dir_name must not be empty".to_string()));
        }
        if self.extension.trim().is_empty() {
            return Err(ConfigError::Invalid("examples.extension must not be empty".to_string()));
        }
        if self.extension.starts_with('.') {
            return Err(ConfigError::Invalid(format!(
                "examples.extension must not start with '.' (got '{}')",
                self.extension
            )));
        }
        if self.entry_point.trim().is_empty() {
            return Err(ConfigError::Invalid("examples.entry_point must not be empty".to_string()));
        }
        if self.skip_env.trim().is_empty() || self.skip_env.contains('=') {
            return Err(ConfigError::Invalid(format!(
                "examples.skip_env is not a valid variable name: '{}'",
                self.skip_env
            )));
        }
        for category in &self.categories {
            if category.is_empty() || category.contains(['/', '\\']) || category == "." || category == ".." {
                return Err(ConfigError::Invalid(format!(
                    "examples.categories entry '{category}' must be a single directory name"
                )));
            }
        }
        Ok(())
    }
}

impl RuntimeConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.program.trim().is_empty() {
            return Err(ConfigError::Invalid("runtime.program must not be empty".to_string()));
        }
        if self.export_prefix.is_empty() {
            return Err(ConfigError::Invalid("runtime.export_prefix must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // Defaults
    // ========================================

    #[test]
    fn test_default_categories() {
        let config = HarnessConfig::default();
        assert_eq!(config.examples.categories, vec!["1_basics", "2_intermediate"]);
    }

    #[test]
    fn test_default_discovery_settings() {
        let config = ExamplesConfig::default();
        assert_eq!(config.levels_up, 2);
        assert_eq!(config.dir_name, "examples");
        assert_eq!(config.extension, "py");
        assert_eq!(config.entry_point, "main");
        assert!(config.root.is_none());
        assert!(config.anchor.ends_with("src"));
    }

    #[test]
    fn test_default_runtime_is_valid() {
        let runtime = RuntimeConfig::default();
        assert_eq!(runtime.program, "python3");
        assert!(runtime.load_args.iter().any(|a| a == "{module}"));
        assert_eq!(runtime.load_args.last().map(String::as_str), Some("{entry}"));
        assert!(runtime.invoke_args.iter().any(|a| a == "{entry}"));
        assert!(HarnessConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_load_probe_only_tests_the_entry_point() {
        assert!(!PYTHON_LOAD_SNIPPET.contains("dir(module)"));
        assert!(PYTHON_LOAD_SNIPPET.contains("getattr(module, sys.argv[4], None)"));
        assert!(PYTHON_LOAD_SNIPPET.contains("except Exception"));
    }

    // ========================================
    // Parsing
    // ========================================

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = HarnessConfig::from_toml_str("").unwrap();
        assert_eq!(config, HarnessConfig::default());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = HarnessConfig::from_toml_str(
            r#"
[examples]
categories = ["basics"]
extension = "sh"

[runtime]
program = "sh"
"#,
        )
        .unwrap();
        assert_eq!(config.examples.categories, vec!["basics"]);
        assert_eq!(config.examples.extension, "sh");
        assert_eq!(config.examples.entry_point, "main");
        assert_eq!(config.runtime.program, "sh");
        assert_eq!(config.runtime.export_prefix, DEFAULT_EXPORT_PREFIX);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = HarnessConfig::from_toml_str("[examples]\ncategoryz = []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    // ========================================
    // Validation
    // ========================================

    #[test]
    fn test_extension_with_dot_rejected() {
        let err = HarnessConfig::from_toml_str("[examples]\nextension = \".py\"\n").unwrap_err();
        assert!(err.to_string().contains("examples.extension"));
    }

    #[test]
    fn test_nested_category_rejected() {
        let err = HarnessConfig::from_toml_str("[examples]\ncategories = [\"a/b\"]\n").unwrap_err();
        assert!(err.to_string().contains("'a/b'"));
    }

    #[test]
    fn test_parent_category_rejected() {
        assert!(HarnessConfig::from_toml_str("[examples]\ncategories = [\"..\"]\n").is_err());
    }

    #[test]
    fn test_empty_program_rejected() {
        let err = HarnessConfig::from_toml_str("[runtime]\nprogram = \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("runtime.program"));
    }

    // ========================================
    // Loading from disk
    // ========================================

    #[test]
    fn test_load_missing_explicit_path_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = HarnessConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_rebases_relative_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exemplar.toml");
        fs::write(&path, "[examples]\nroot = \"demos\"\n").unwrap();

        let config = HarnessConfig::load(Some(&path)).unwrap();
        assert_eq!(config.examples.root, Some(dir.path().join("demos")));
    }

    #[test]
    fn test_load_parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exemplar.toml");
        fs::write(&path, "[examples\n").unwrap();

        let err = HarnessConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("exemplar.toml"));
    }
}
