//! Module loading boundary
//!
//! This module defines the trait-based stand-in for "dynamically import an example file":
//! - [`ModuleLoader`] turns a discovered file into a loaded [`Module`] or a [`LoadError`]
//! - [`Module`] exposes named [`EntryPoint`]s
//! - [`EntryPoint`] is the zero-argument callable the harness invokes
//!
//! The shipped loader is [`ScriptRuntime`], which drives an external interpreter. Other loaders (in-process
//! registries, mocks in tests) plug in through the same traits.
//!
//! Modules are shared through `Rc`: the harness is single-threaded and a loader may hand the same module out
//! more than once (see the namespace cache in [`ScriptRuntime`]).

pub mod script;

use std::error::Error;
use std::path::PathBuf;
use std::rc::Rc;

use thiserror::Error;

pub use script::{ScriptModule, ScriptRuntime};

/// Everything a loader needs to know about one discovered example file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    /// Absolute Examples Root
    pub root: PathBuf,
    /// Category directory name
    pub category: String,
    /// Literal file name, extension included
    pub file_name: String,
    /// `root/category/file_name`
    pub path: PathBuf,
    /// `<category>.<stem>`
    pub qualified_name: String,
}

/// Errors raised while loading an example module.
///
/// These never abort collection: the discovery step stores them in the example's entry and they surface as
/// that example's own failure at execution time.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("loading `{module}` exited with {}\n{stderr}", exit_label(.code))]
    Failed {
        module: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("loader output for `{module}` is not valid UTF-8")]
    Output { module: String },

    #[error("{0}")]
    Custom(String),
}

/// Errors raised by an entry point call.
///
/// The example's own output (traceback, panic message) is carried verbatim so the underlying bug stays
/// diagnosable from the report alone.
#[derive(Debug, Error)]
pub enum EntryPointError {
    #[error("could not start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("exited with {}\n{stderr}", exit_label(.code))]
    Failed {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error(transparent)]
    Custom(Box<dyn Error + Send + Sync>),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Load discovered example files as modules.
pub trait ModuleLoader {
    /// Load the module described by `request`.
    ///
    /// Implementations must report every failure (syntax errors, missing dependencies, errors raised while
    /// the module body runs) as a [`LoadError`] value rather than panicking.
    fn load(&self, request: &LoadRequest) -> Result<Rc<dyn Module>, LoadError>;
}

/// A successfully loaded example module.
pub trait Module {
    /// Fully qualified name the module was loaded under.
    fn qualified_name(&self) -> &str;

    /// Look up a truthy attribute by name, returning it as a callable entry point.
    fn entry_point(&self, name: &str) -> Option<Box<dyn EntryPoint + '_>>;
}

/// A zero-argument callable exposed by a [`Module`].
pub trait EntryPoint {
    /// Call the entry point once. No return value is expected.
    fn call(&self) -> Result<(), EntryPointError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_failed_keeps_stderr() {
        let err = LoadError::Failed {
            module: "basics.broken".into(),
            code: Some(1),
            stderr: "SyntaxError: invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("basics.broken"));
        assert!(msg.contains("status 1"));
        assert!(msg.contains("SyntaxError: invalid syntax"));
    }

    #[test]
    fn test_entry_point_error_signal_label() {
        let err = EntryPointError::Failed {
            code: None,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_entry_point_error_custom_is_transparent() {
        let err = EntryPointError::Custom("boom".into());
        assert_eq!(err.to_string(), "boom");
    }
}
