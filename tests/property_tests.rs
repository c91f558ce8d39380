//! Property-based tests for discovery
//!
//! Generates random category contents and checks that collection yields exactly one entry per qualifying file,
//! whether or not that file loads.

use std::collections::BTreeSet;
use std::fs;
use std::rc::Rc;

use exemplar::{EntryPoint, ExamplesRoot, LoadError, LoadRequest, Module, ModuleLoader, collect_category};
use proptest::prelude::*;

/// Fails every file whose stem starts with `x`.
struct PickyLoader;

struct Loaded;

impl Module for Loaded {
    fn qualified_name(&self) -> &str {
        "loaded"
    }

    fn entry_point(&self, _name: &str) -> Option<Box<dyn EntryPoint + '_>> {
        None
    }
}

impl ModuleLoader for PickyLoader {
    fn load(&self, request: &LoadRequest) -> Result<Rc<dyn Module>, LoadError> {
        if request.file_name.starts_with('x') {
            Err(LoadError::Custom("refused".to_string()))
        } else {
            Ok(Rc::new(Loaded))
        }
    }
}

fn file_name_strategy() -> impl Strategy<Value = String> {
    ("[a-z][a-z0-9_]{0,7}", prop::sample::select(vec!["py", "pyc", "txt", "py.bak"]))
        .prop_map(|(stem, ext)| format!("{stem}.{ext}"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Property: one entry per `*.py` file, independent of load success
    #[test]
    fn one_entry_per_qualifying_file(names in prop::collection::btree_set(file_name_strategy(), 0..12)) {
        let dir = tempfile::tempdir().unwrap();
        let category = dir.path().join("1_basics");
        fs::create_dir(&category).unwrap();
        for name in &names {
            fs::write(category.join(name), "").unwrap();
        }

        let root = ExamplesRoot::from_path(dir.path());
        let entries = collect_category(&PickyLoader, &root, "1_basics", "py").unwrap();

        let expected: BTreeSet<&String> = names.iter().filter(|n| n.ends_with(".py")).collect();
        let found: BTreeSet<&String> = entries.iter().map(|e| &e.file_name).collect();
        prop_assert_eq!(entries.len(), expected.len());
        prop_assert_eq!(found, expected);

        for entry in &entries {
            prop_assert_eq!(entry.is_loaded(), !entry.file_name.starts_with('x'));
        }
    }

    /// Property: the resolved root only depends on its inputs
    #[test]
    fn resolve_is_deterministic(parts in prop::collection::vec("[a-z]{1,6}", 2..6), levels in 0usize..3) {
        let anchor = std::path::PathBuf::from("/").join(parts.join("/"));
        let a = ExamplesRoot::resolve(&anchor, levels, "examples");
        let b = ExamplesRoot::resolve(&anchor, levels, "examples");
        prop_assert_eq!(a.path(), b.path());
        prop_assert!(a.path().ends_with("examples"));
        prop_assert!(a.path().is_absolute());
    }
}
