//! Script runtime: load and invoke examples through an external interpreter.
//!
//! ## Protocol
//!
//! - **Load**: run `program load_args…` with `{entry}` bound to the runtime's entry point name. A successful
//!   exit means the module loaded; every stdout line that starts with the export prefix names a truthy
//!   attribute of the module. Other stdout lines are the example's own output and are ignored.
//! - **Invoke**: run `program invoke_args…` with `{entry}` bound to the entry point name. A successful exit
//!   means the call completed; otherwise the captured output is returned verbatim.
//!
//! ## Module namespace
//!
//! Successful loads are cached by qualified name for the lifetime of the runtime, mirroring an interpreter's
//! import cache: loading the same name twice hands back the first module and does **not** re-run its body.
//! Examples with load-time side effects are therefore not idempotent across repeated loads. Failed loads are
//! not cached.

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::rc::Rc;

use super::{EntryPoint, EntryPointError, LoadError, LoadRequest, Module, ModuleLoader};
use crate::config::RuntimeConfig;
use exemplar_core::DEFAULT_ENTRY_POINT;

/// Loader that drives an interpreter process per load and per call.
pub struct ScriptRuntime {
    config: Rc<RuntimeConfig>,
    entry_point: String,
    namespace: RefCell<HashMap<String, Rc<ScriptModule>>>,
}

impl ScriptRuntime {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config: Rc::new(config),
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            namespace: RefCell::new(HashMap::new()),
        }
    }

    /// Set the entry point name the load probe checks for.
    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = entry_point.into();
        self
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Number of modules currently held in the namespace cache.
    pub fn cached_modules(&self) -> usize {
        self.namespace.borrow().len()
    }

    fn load_uncached(&self, request: &LoadRequest) -> Result<ScriptModule, LoadError> {
        let bindings = Bindings::for_request(request, &self.config.export_prefix);
        let args = bindings.expand_all(&self.config.load_args, &self.entry_point);

        tracing::debug!(module = %request.qualified_name, program = %self.config.program, "loading example");
        let output = spawn(&self.config, &args).map_err(|source| LoadError::Spawn {
            program: self.config.program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(LoadError::Failed {
                module: request.qualified_name.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|_| LoadError::Output {
            module: request.qualified_name.clone(),
        })?;
        let exports = parse_exports(&stdout, &self.config.export_prefix);

        Ok(ScriptModule {
            qualified_name: request.qualified_name.clone(),
            bindings,
            exports,
            config: Rc::clone(&self.config),
        })
    }
}

impl ModuleLoader for ScriptRuntime {
    fn load(&self, request: &LoadRequest) -> Result<Rc<dyn Module>, LoadError> {
        if let Some(cached) = self.namespace.borrow().get(&request.qualified_name) {
            tracing::debug!(module = %request.qualified_name, "module already loaded, reusing");
            return Ok(Rc::clone(cached) as Rc<dyn Module>);
        }

        let module = Rc::new(self.load_uncached(request)?);
        self.namespace
            .borrow_mut()
            .insert(request.qualified_name.clone(), Rc::clone(&module));
        Ok(module)
    }
}

/// A module loaded by [`ScriptRuntime`].
#[derive(Debug)]
pub struct ScriptModule {
    qualified_name: String,
    bindings: Bindings,
    exports: BTreeSet<String>,
    config: Rc<RuntimeConfig>,
}

impl ScriptModule {
    /// Attribute names reported by the load probe.
    pub fn exports(&self) -> &BTreeSet<String> {
        &self.exports
    }

    /// Path of the script this module was loaded from.
    pub fn path(&self) -> &Path {
        &self.bindings.path
    }
}

impl Module for ScriptModule {
    fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    fn entry_point(&self, name: &str) -> Option<Box<dyn EntryPoint + '_>> {
        if !self.exports.contains(name) {
            return None;
        }
        Some(Box::new(ScriptEntryPoint {
            module: self,
            name: name.to_string(),
        }))
    }
}

struct ScriptEntryPoint<'a> {
    module: &'a ScriptModule,
    name: String,
}

impl EntryPoint for ScriptEntryPoint<'_> {
    fn call(&self) -> Result<(), EntryPointError> {
        let config = &self.module.config;
        let args = self.module.bindings.expand_all(&config.invoke_args, &self.name);

        tracing::debug!(module = %self.module.qualified_name, entry = %self.name, "invoking entry point");
        let output = spawn(config, &args).map_err(|source| EntryPointError::Spawn {
            program: config.program.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(EntryPointError::Failed {
                code: output.status.code(),
                stdout,
                stderr,
            });
        }

        if !stdout.is_empty() {
            tracing::trace!(module = %self.module.qualified_name, "{}", stdout.trim_end());
        }
        Ok(())
    }
}

/// Placeholder values bound for one example.
#[derive(Debug, Clone)]
struct Bindings {
    root: PathBuf,
    category: String,
    module: String,
    path: PathBuf,
    file: String,
    export_prefix: String,
}

impl Bindings {
    fn for_request(request: &LoadRequest, export_prefix: &str) -> Self {
        Self {
            root: request.root.clone(),
            category: request.category.clone(),
            module: request.qualified_name.clone(),
            path: request.path.clone(),
            file: request.file_name.clone(),
            export_prefix: export_prefix.to_string(),
        }
    }

    fn value<'a>(&'a self, placeholder: &str, entry: &'a str) -> Option<Cow<'a, str>> {
        let value = match placeholder {
            "root" => self.root.to_string_lossy(),
            "category" => Cow::Borrowed(self.category.as_str()),
            "module" => Cow::Borrowed(self.module.as_str()),
            "path" => self.path.to_string_lossy(),
            "file" => Cow::Borrowed(self.file.as_str()),
            "export_prefix" => Cow::Borrowed(self.export_prefix.as_str()),
            "entry" => Cow::Borrowed(entry),
            _ => return None,
        };
        Some(value)
    }

    /// Substitute placeholders in one left-to-right pass; substituted text is never rescanned and unknown
    /// `{names}` are kept literally.
    fn expand(&self, template: &str, entry: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open..];
            let substituted = tail
                .find('}')
                .and_then(|close| self.value(&tail[1..close], entry).map(|value| (value, close)));
            match substituted {
                Some((value, close)) => {
                    out.push_str(&value);
                    rest = &tail[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = &tail[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }

    fn expand_all(&self, templates: &[String], entry: &str) -> Vec<String> {
        templates.iter().map(|t| self.expand(t, entry)).collect()
    }
}

fn spawn(config: &RuntimeConfig, args: &[String]) -> std::io::Result<Output> {
    Command::new(&config.program)
        .args(args)
        .envs(&config.env)
        .stdin(Stdio::null())
        .output()
}

fn parse_exports(stdout: &str, prefix: &str) -> BTreeSet<String> {
    stdout
        .lines()
        .filter_map(|line| line.trim_end().strip_prefix(prefix))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
