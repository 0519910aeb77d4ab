use super::callable::{Callable, CallableKind};
use crate::core::{source_code_hash, Metadata, Origin};
use crate::errors::Result;
use crate::signature::SignatureExtractor;
use tracing::{debug, debug_span};

/// Builds [`Metadata`] for a callable.
///
/// `Ok(None)` means the callable cannot be described (no source text or no
/// signature) and should be skipped, not treated as a failure.
pub trait Introspector: Send + Sync {
    fn introspect(
        &self,
        callable: &Callable,
        author_name: &str,
        author_email: &str,
    ) -> Result<Option<Metadata>>;
}

impl<I: Introspector + ?Sized> Introspector for &I {
    fn introspect(
        &self,
        callable: &Callable,
        author_name: &str,
        author_email: &str,
    ) -> Result<Option<Metadata>> {
        (**self).introspect(callable, author_name, author_email)
    }
}

/// Introspector reading the source text and signature captured at scan time
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceIntrospector {
    extractor: SignatureExtractor,
}

impl SourceIntrospector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extractor(extractor: SignatureExtractor) -> Self {
        Self { extractor }
    }
}

impl Introspector for SourceIntrospector {
    fn introspect(
        &self,
        callable: &Callable,
        author_name: &str,
        author_email: &str,
    ) -> Result<Option<Metadata>> {
        let _span = debug_span!("introspect", name = callable.name()).entered();

        if callable.kind() == CallableKind::Foreign {
            debug!("Foreign function has no body, skipping");
            return Ok(None);
        }
        let (Some(source_code), Some(signature)) = (callable.source(), callable.signature())
        else {
            debug!("No source text or signature available, skipping");
            return Ok(None);
        };

        let (inputs, outputs) = self.extractor.extract(signature)?;

        Ok(Some(Metadata {
            author_name: author_name.to_string(),
            author_email: author_email.to_string(),
            origin: Origin {
                module: callable.module_path().to_string(),
                qualname: qualified_name(callable),
                version: callable.version().map(str::to_string),
            },
            source_code: source_code.to_string(),
            source_code_hash: source_code_hash(source_code),
            docstring: callable.docs().unwrap_or_default().to_string(),
            inputs,
            outputs,
        }))
    }
}

/// Own qualified name, else the enclosing type's, else the bare name
fn qualified_name(callable: &Callable) -> String {
    callable
        .qualname()
        .or_else(|| callable.owner())
        .unwrap_or_else(|| callable.name())
        .to_string()
}

/// Describe `callable` with the default extractor settings
pub fn introspect(
    callable: &Callable,
    author_name: &str,
    author_email: &str,
) -> Result<Option<Metadata>> {
    SourceIntrospector::new().introspect(callable, author_name, author_email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AnnotationExpr;
    use crate::core::Annotation;
    use crate::signature::Signature;

    fn add() -> Callable {
        Callable::function("demo", "add")
            .with_qualname("add")
            .with_source("fn add(a: i64, b: i64) -> i64 {\n    a + b\n}\n")
            .with_docs("Add two numbers.")
            .with_signature(
                Signature::new()
                    .with_parameter("a", Some(AnnotationExpr::bare("i64")))
                    .with_parameter("b", Some(AnnotationExpr::bare("i64")))
                    .returning(AnnotationExpr::bare("i64")),
            )
    }

    #[test]
    fn test_introspect_function() {
        let meta = introspect(&add(), "Ada", "ada@example.com").unwrap().unwrap();
        assert_eq!(meta.author_name, "Ada");
        assert_eq!(meta.origin.module, "demo");
        assert_eq!(meta.origin.qualname, "add");
        assert_eq!(meta.docstring, "Add two numbers.");
        assert_eq!(meta.source_code_hash.len(), 64);
        assert_eq!(meta.inputs.get("a"), Some(&Some(Annotation::of("i64"))));
        assert_eq!(meta.outputs.get("output"), Some(&Some(Annotation::of("i64"))));
    }

    #[test]
    fn test_missing_source_is_skipped() {
        let callable = Callable::function("demo", "opaque").with_signature(Signature::new());
        assert_eq!(introspect(&callable, "", "").unwrap(), None);
    }

    #[test]
    fn test_qualname_falls_back_to_owner_then_name() {
        let method = Callable::new(CallableKind::Method, "demo", "area")
            .with_owner("Circle")
            .with_source("fn area(&self) -> f64 { 0.0 }\n")
            .with_signature(Signature::new());
        let meta = introspect(&method, "", "").unwrap().unwrap();
        assert_eq!(meta.origin.qualname, "Circle");

        let bare = Callable::function("demo", "area")
            .with_source("fn area() {}\n")
            .with_signature(Signature::new());
        let meta = introspect(&bare, "", "").unwrap().unwrap();
        assert_eq!(meta.origin.qualname, "area");
        assert_eq!(meta.docstring, "");
    }

    #[test]
    fn test_introspection_does_not_attach() {
        let callable = add();
        introspect(&callable, "", "").unwrap();
        assert!(!callable.is_registered());
    }
}
