// Test utility module for nodemeta integration tests
#![allow(dead_code)]

use nodemeta::{Callable, Definition, SourceScanner};
use std::path::Path;
use std::sync::Arc;

/// Scan a snippet as if it were `src/lib.rs` of crate `demo`
pub fn scan_snippet(code: &str) -> Vec<Definition> {
    SourceScanner::new("demo")
        .scan(Path::new("src/lib.rs"), code)
        .expect("snippet should parse")
}

/// Find a scanned definition by name
pub fn definition<'a>(defs: &'a [Definition], name: &str) -> &'a Definition {
    defs.iter()
        .find(|d| d.name() == name)
        .unwrap_or_else(|| panic!("no definition named `{name}`"))
}

/// Find a scanned callable by qualified name
pub fn callable(defs: &[Definition], qualname: &str) -> Arc<Callable> {
    defs.iter()
        .filter_map(Definition::as_callable)
        .find(|c| c.qualname() == Some(qualname))
        .cloned()
        .unwrap_or_else(|| panic!("no callable `{qualname}`"))
}
