//! Execution adapter: turn one [`ExampleEntry`] into a pass/fail outcome.
//!
//! The adapter does exactly two things, in order:
//! 1. Assert the module loaded and exposes the entry point.
//! 2. Call the entry point once, with no arguments.
//!
//! Both steps fail with the same [`ExampleFailure`] type, always naming the example file. The variant (and its
//! diagnostic code) tells "failed to import" apart from "no entry point" and from "entry point raised".

use exemplar_core::FailureKind;
use miette::Diagnostic;
use thiserror::Error;

use crate::discovery::ExampleEntry;
use crate::loader::{EntryPointError, LoadError};

/// Why a single example failed.
#[derive(Debug, Error, Diagnostic)]
pub enum ExampleFailure {
    #[error("`{file}` failed to import: {source}")]
    #[diagnostic(
        code(exemplar::import_failed),
        help("the module could not be loaded; check it for syntax errors, missing dependencies, or errors raised at import time")
    )]
    ImportFailed {
        file: String,
        #[source]
        source: LoadError,
    },

    #[error("`{file}` imported but has no `{entry}` entry point")]
    #[diagnostic(
        code(exemplar::entry_point_missing),
        help("every example must define a zero-argument `{entry}`")
    )]
    EntryPointMissing { file: String, entry: String },

    #[error("`{file}`: `{entry}()` failed: {source}")]
    #[diagnostic(code(exemplar::entry_point_failed))]
    EntryPointFailed {
        file: String,
        entry: String,
        #[source]
        source: EntryPointError,
    },
}

impl ExampleFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            ExampleFailure::ImportFailed { .. } => FailureKind::ImportFailed,
            ExampleFailure::EntryPointMissing { .. } => FailureKind::EntryPointMissing,
            ExampleFailure::EntryPointFailed { .. } => FailureKind::EntryPointFailed,
        }
    }

    /// The example file the failure is attributed to.
    pub fn file(&self) -> &str {
        match self {
            ExampleFailure::ImportFailed { file, .. }
            | ExampleFailure::EntryPointMissing { file, .. }
            | ExampleFailure::EntryPointFailed { file, .. } => file,
        }
    }
}

/// Runs entries against a fixed entry point name.
#[derive(Debug, Clone)]
pub struct ExecutionAdapter {
    entry_point: String,
}

impl ExecutionAdapter {
    pub fn new(entry_point: impl Into<String>) -> Self {
        Self {
            entry_point: entry_point.into(),
        }
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Assert and invoke one example.
    ///
    /// ## Errors
    ///
    /// - [`ExampleFailure::ImportFailed`] when the module is absent; the load error is moved into the failure.
    /// - [`ExampleFailure::EntryPointMissing`] when the module has no such entry point; nothing is called.
    /// - [`ExampleFailure::EntryPointFailed`] when the call returns an error; the error is carried unchanged.
    #[tracing::instrument(skip_all, fields(file = %entry.file_name))]
    pub fn run(&self, entry: ExampleEntry) -> Result<(), ExampleFailure> {
        let ExampleEntry { file_name, module } = entry;

        let module = module.map_err(|source| ExampleFailure::ImportFailed {
            file: file_name.clone(),
            source,
        })?;

        let Some(entry_point) = module.entry_point(&self.entry_point) else {
            return Err(ExampleFailure::EntryPointMissing {
                file: file_name,
                entry: self.entry_point.clone(),
            });
        };

        entry_point.call().map_err(|source| ExampleFailure::EntryPointFailed {
            file: file_name,
            entry: self.entry_point.clone(),
            source,
        })
    }
}
