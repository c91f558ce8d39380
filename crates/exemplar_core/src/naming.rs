//! Define how example files are recognized and named.
//!
//! ## Notes
//! - A file qualifies when its name ends with `.<extension>`; the comparison is exact (case-sensitive). A file
//!   named exactly `.<extension>` qualifies too, with an empty stem.
//! - The display name of an example is always the literal file name, extension included.
//! - The qualified module name is `<category>.<stem>`; only the *trailing* extension is removed, so
//!   `setup.py.py` has stem `setup.py`.

use std::fmt;

/// Check whether a file name carries the recognized script extension.
///
/// ## Parameters
/// - `file_name`: bare file name as listed on disk.
/// - `extension`: extension without the leading dot (for example `py`).
///
/// ## Returns
/// - `bool`: `true` when the name ends with `.<extension>`, including the bare `.<extension>`.
///
/// ## Examples
/// ```rust
/// use exemplar_core::is_example_file;
///
/// assert!(is_example_file("hello.py", "py"));
/// assert!(!is_example_file("hello.pyc", "py"));
/// assert!(is_example_file(".py", "py"));
/// ```
pub fn is_example_file(file_name: &str, extension: &str) -> bool {
    module_stem(file_name, extension).is_some()
}

/// Strip the trailing `.<extension>` from a file name.
///
/// ## Returns
/// - `Some(stem)` when the name ends with the extension, `None` otherwise.
pub fn module_stem<'a>(file_name: &'a str, extension: &str) -> Option<&'a str> {
    file_name.strip_suffix(extension)?.strip_suffix('.')
}

/// Derive the fully qualified module name for an example file.
///
/// ## Parameters
/// - `category`: directory name of the category.
/// - `file_name`: file name including extension.
/// - `extension`: recognized extension without the leading dot.
///
/// ## Returns
/// - `String`: `<category>.<stem>`; when the file does not carry the extension, the whole file name is used as
///   the stem.
///
/// ## Examples
/// ```rust
/// use exemplar_core::qualified_name;
///
/// assert_eq!(qualified_name("1_basics", "hello.py", "py"), "1_basics.hello");
/// ```
pub fn qualified_name(category: &str, file_name: &str, extension: &str) -> String {
    let stem = module_stem(file_name, extension).unwrap_or(file_name);
    format!("{category}.{stem}")
}

/// Identify one reportable case: a file within a category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaseId {
    pub category: String,
    pub file_name: String,
}

impl CaseId {
    pub fn new(category: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            file_name: file_name.into(),
        }
    }

    /// Check whether a keyword expression selects this case (substring match on the display id).
    pub fn matches(&self, keyword: &str) -> bool {
        self.to_string().contains(keyword)
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.category, self.file_name)
    }
}
