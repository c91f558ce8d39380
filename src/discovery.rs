//! Example discovery
//!
//! Locates the Examples Root, enumerates example files per category, and loads each file through a
//! [`ModuleLoader`]. Collection never hard-fails on a bad example: a load error becomes the `Err` half of that
//! example's [`ExampleEntry`] and is reported later, as that example's own failure.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use exemplar_core::{is_example_file, qualified_name};
use thiserror::Error;

use crate::config::ExamplesConfig;
use crate::loader::{LoadError, LoadRequest, Module, ModuleLoader};

/// Errors raised while enumerating a category.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("cannot list category '{category}' in '{}': {source}", root.display())]
    Category {
        category: String,
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The absolute directory holding one sub-directory per category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamplesRoot {
    path: PathBuf,
}

impl ExamplesRoot {
    /// Resolve the root relative to the harness's own location.
    ///
    /// Walks `levels_up` directories up from `anchor_dir`, then enters `dir_name`. The result is absolute and
    /// lexically normalized; the filesystem is not touched, so repeated calls yield the same path.
    ///
    /// ## Notes
    /// - An absolute `anchor_dir` makes the result independent of the working directory. A relative one is
    ///   made absolute against the working directory at call time.
    pub fn resolve(anchor_dir: &Path, levels_up: usize, dir_name: &str) -> Self {
        let mut path = absolute(anchor_dir);
        for _ in 0..levels_up {
            path.push("..");
        }
        path.push(dir_name);
        Self {
            path: normalize(&path),
        }
    }

    /// Use an explicit directory as the root.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: normalize(&absolute(path.as_ref())),
        }
    }

    /// The explicit `root` when configured, otherwise resolved from the anchor.
    pub fn from_config(config: &ExamplesConfig) -> Self {
        match &config.root {
            Some(root) => Self::from_path(root),
            None => Self::resolve(&config.anchor, config.levels_up, &config.dir_name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the root physically exists as a directory.
    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    pub fn category_dir(&self, category: &str) -> PathBuf {
        self.path.join(category)
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Resolve `.` and `..` components without following symlinks.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// One discovered example: its literal file name and the loaded module, or why it failed to load.
pub struct ExampleEntry {
    pub file_name: String,
    pub module: Result<Rc<dyn Module>, LoadError>,
}

impl ExampleEntry {
    pub fn is_loaded(&self) -> bool {
        self.module.is_ok()
    }
}

impl std::fmt::Debug for ExampleEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let module = match &self.module {
            Ok(module) => format!("Ok({})", module.qualified_name()),
            Err(e) => format!("Err({e})"),
        };
        f.debug_struct("ExampleEntry")
            .field("file_name", &self.file_name)
            .field("module", &module)
            .finish()
    }
}

/// List example file names in `root/category`.
///
/// Only regular files (or symlinks to regular files) ending in `.<extension>` qualify. The order is the
/// directory listing order, which is not guaranteed to be sorted. The listing is an eager snapshot.
///
/// ## Errors
///
/// Returns [`DiscoveryError::Category`] when the category directory cannot be read.
pub fn list_category_files(
    root: &ExamplesRoot,
    category: &str,
    extension: &str,
) -> Result<Vec<String>, DiscoveryError> {
    let dir = root.category_dir(category);
    let to_error = |source| DiscoveryError::Category {
        category: category.to_string(),
        root: root.path().to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(&dir).map_err(to_error)? {
        let entry = entry.map_err(to_error)?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!(path = %entry.path().display(), "skipping example with non UTF-8 name");
            continue;
        };
        if !is_example_file(&name, extension) {
            continue;
        }
        // `metadata` follows symlinks, `file_type` would not.
        if !fs::metadata(entry.path()).is_ok_and(|m| m.is_file()) {
            continue;
        }
        files.push(name);
    }
    Ok(files)
}

/// Load a single example through `loader`.
///
/// Never panics and never aborts collection: every failure is returned as a [`LoadError`] value.
pub fn load_example(
    loader: &dyn ModuleLoader,
    root: &ExamplesRoot,
    category: &str,
    file_name: &str,
    extension: &str,
) -> Result<Rc<dyn Module>, LoadError> {
    let request = LoadRequest {
        root: root.path().to_path_buf(),
        category: category.to_string(),
        file_name: file_name.to_string(),
        path: root.category_dir(category).join(file_name),
        qualified_name: qualified_name(category, file_name, extension),
    };

    let result = loader.load(&request);
    if let Err(e) = &result {
        tracing::warn!(module = %request.qualified_name, file = file_name, "failed to load example: {}", e);
    }
    result
}

/// Collect one [`ExampleEntry`] per qualifying file in a category.
///
/// ## Errors
///
/// Returns [`DiscoveryError`] only when the category itself cannot be listed; individual load failures are
/// kept inside the entries.
#[tracing::instrument(skip_all, fields(category = category))]
pub fn collect_category(
    loader: &dyn ModuleLoader,
    root: &ExamplesRoot,
    category: &str,
    extension: &str,
) -> Result<Vec<ExampleEntry>, DiscoveryError> {
    let files = list_category_files(root, category, extension)?;
    tracing::debug!(count = files.len(), "discovered example files");

    Ok(files
        .into_iter()
        .map(|file_name| {
            let module = load_example(loader, root, category, &file_name, extension);
            ExampleEntry { file_name, module }
        })
        .collect())
}
