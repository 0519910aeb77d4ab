use crate::core::Metadata;
use crate::errors::Result;
use crate::signature::Signature;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// How a callable was declared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallableKind {
    /// Free `fn` item
    Function,
    /// Associated function of an `impl` or `trait` block
    Method,
    /// Function declared in an `extern` block; no body to read
    Foreign,
    /// Synthesized constructor of a record type
    Constructor,
    /// Synthesized field decomposer of a record type
    Decomposer,
}

/// A function-like unit of code plus everything needed to describe it.
///
/// The metadata slot starts empty and is filled at most once, by the
/// registration gate. An introspection that yields nothing is recorded too,
/// so the gate never retries it.
#[derive(Clone)]
pub struct Callable {
    name: String,
    kind: CallableKind,
    module_path: String,
    qualname: Option<String>,
    owner: Option<String>,
    source: Option<String>,
    signature: Option<Signature>,
    docs: Option<String>,
    version: Option<String>,
    metadata: OnceCell<Option<Arc<Metadata>>>,
}

impl Callable {
    pub fn new(
        kind: CallableKind,
        module_path: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            module_path: module_path.into(),
            qualname: None,
            owner: None,
            source: None,
            signature: None,
            docs: None,
            version: None,
            metadata: OnceCell::new(),
        }
    }

    pub fn function(module_path: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(CallableKind::Function, module_path, name)
    }

    pub fn with_qualname(mut self, qualname: impl Into<String>) -> Self {
        self.qualname = Some(qualname.into());
        self
    }

    /// Qualified name of the enclosing type, for associated functions
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn with_docs(mut self, docs: impl Into<String>) -> Self {
        self.docs = Some(docs.into());
        self
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CallableKind {
        self.kind
    }

    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    pub fn qualname(&self) -> Option<&str> {
        self.qualname.as_deref()
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn docs(&self) -> Option<&str> {
        self.docs.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Metadata attached by registration, if any was produced
    pub fn metadata(&self) -> Option<&Arc<Metadata>> {
        self.metadata.get().and_then(Option::as_ref)
    }

    /// Whether the registration gate has already visited this callable
    pub fn is_registered(&self) -> bool {
        self.metadata.get().is_some()
    }

    /// Fill the metadata slot with `compute` unless it is already filled.
    ///
    /// Concurrent callers block on the first initializer, so `compute` runs
    /// at most once per callable. A failed computation leaves the slot empty.
    pub(crate) fn attach_metadata<F>(&self, compute: F) -> Result<Option<&Arc<Metadata>>>
    where
        F: FnOnce() -> Result<Option<Metadata>>,
    {
        self.metadata
            .get_or_try_init(|| compute().map(|meta| meta.map(Arc::new)))
            .map(Option::as_ref)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("module_path", &self.module_path)
            .field("qualname", &self.qualname)
            .field("registered", &self.is_registered())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Inputs, Origin, Outputs};

    fn sample_metadata() -> Metadata {
        Metadata {
            author_name: String::new(),
            author_email: String::new(),
            origin: Origin {
                module: "demo".into(),
                qualname: "f".into(),
                version: None,
            },
            source_code: "fn f() {}\n".into(),
            source_code_hash: crate::core::source_code_hash("fn f() {}\n"),
            docstring: String::new(),
            inputs: Inputs::new(),
            outputs: Outputs::new(),
        }
    }

    #[test]
    fn test_attach_runs_once() {
        let callable = Callable::function("demo", "f");
        let mut calls = 0;
        callable
            .attach_metadata(|| {
                calls += 1;
                Ok(Some(sample_metadata()))
            })
            .unwrap();
        callable
            .attach_metadata(|| {
                calls += 1;
                Ok(None)
            })
            .unwrap();
        assert_eq!(calls, 1);
        assert!(callable.metadata().is_some());
    }

    #[test]
    fn test_absent_result_still_marks_registered() {
        let callable = Callable::new(CallableKind::Foreign, "demo", "ext");
        callable.attach_metadata(|| Ok(None)).unwrap();
        assert!(callable.is_registered());
        assert!(callable.metadata().is_none());
    }

    #[test]
    fn test_failed_attach_leaves_slot_empty() {
        let callable = Callable::function("demo", "f");
        let result = callable.attach_metadata(|| {
            Err(crate::errors::Error::schema_mismatch("unknown field `colour`"))
        });
        assert!(result.is_err());
        assert!(!callable.is_registered());
    }
}
