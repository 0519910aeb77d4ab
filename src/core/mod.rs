//! Core data model shared by every stage of the metadata pipeline.

pub mod hashing;
pub mod parsing;
pub mod types;

pub use hashing::source_code_hash;
pub use types::{Annotation, Inputs, Metadata, Origin, Outputs, TypeRef};
