//! Shared error types for the metadata compiler

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for nodemeta operations
#[derive(Debug, Error)]
pub enum Error {
    /// A non-callable item was handed to the registration gate
    #[error("Only functions can be registered as nodes: `{name}` is a {kind}")]
    NotCallable { name: String, kind: String },

    /// A tagged wrapper's side channel does not fit the annotation schema
    #[error("Side-channel schema mismatch: {reason}")]
    SchemaMismatch { reason: String },

    /// Two unpacked outputs carry the same label
    #[error("Duplicate output label `{label}`")]
    DuplicateLabel { label: String },

    /// The type handed to a record adapter is not a plain record
    #[error("`{0}` is not a record type. Only structs with named fields are supported!")]
    NotARecordType(String),

    /// Arguments handed to a record adapter do not fit the record
    #[error("Argument mismatch for `{record}`: {message}")]
    ArgumentMismatch { record: String, message: String },

    /// Parsing errors
    #[error("Parse error in {file}:{line}:{column}: {message}")]
    Parse {
        file: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic errors with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a schema mismatch error
    pub fn schema_mismatch(reason: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            reason: reason.into(),
        }
    }

    /// Create a not-callable error for the named item
    pub fn not_callable(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::NotCallable {
            name: name.into(),
            kind: kind.into(),
        }
    }

    /// Create an argument mismatch error
    pub fn argument_mismatch(record: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ArgumentMismatch {
            record: record.into(),
            message: message.into(),
        }
    }

    /// Create a parse error with location
    pub fn parse(
        file: impl Into<PathBuf>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            file: file.into(),
            line,
            column,
            message: message.into(),
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            message: self.to_string(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}
