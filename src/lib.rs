// Export modules for library usage
pub mod annotation;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod errors;
pub mod introspect;
pub mod record;
pub mod registry;
pub mod signature;

// Re-export commonly used types
pub use crate::core::{source_code_hash, Annotation, Inputs, Metadata, Origin, Outputs, TypeRef};

pub use crate::annotation::{parse_annotation, AnnotationExpr, SideChannel};

pub use crate::errors::{Error, Result};

pub use crate::introspect::{
    introspect, Callable, CallableKind, Definition, Introspector, SourceIntrospector,
    SourceScanner,
};

pub use crate::record::{
    from_record_decomposer, to_record_constructor, Record, RecordConstructor, RecordDecomposer,
    RecordField, RecordType,
};

pub use crate::registry::{
    backend_mode, register, register_with_author, set_backend_mode, BackendMode, Registrar,
};

pub use crate::signature::{DuplicateLabelPolicy, Parameter, Signature, SignatureExtractor};
