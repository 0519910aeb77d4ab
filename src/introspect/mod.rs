//! Ahead-of-time introspection of Rust callables.
//!
//! Source files are parsed with `syn`; every `fn` item, associated function
//! and foreign function becomes a [`Callable`] carrying its signature, source
//! text and documentation. Nothing is compiled or executed.
//!
//! ```rust,ignore
//! use nodemeta::introspect::{SourceIntrospector, SourceScanner, Introspector};
//!
//! let defs = SourceScanner::new("geometry").scan(Path::new("src/lib.rs"), &content)?;
//! for def in &defs {
//!     if let Some(callable) = def.as_callable() {
//!         let meta = SourceIntrospector::new().introspect(callable, "Ada", "ada@example.com")?;
//!     }
//! }
//! ```

pub mod callable;
pub mod docs;
pub mod introspector;
pub mod scanner;

pub use callable::{Callable, CallableKind};
pub use docs::{clean_doc, docstring};
pub use introspector::{introspect, Introspector, SourceIntrospector};
pub use scanner::{module_path_for, Definition, ItemKind, SourceScanner};
