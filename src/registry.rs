//! Registration gate attaching metadata to callables.
//!
//! [`register`] is the decorator-style entry point: it checks that the
//! definition is callable, computes its [`Metadata`](crate::core::Metadata)
//! once, attaches it, and hands the same callable back. The process-wide
//! [`BackendMode`] decides whether metadata is computed at all.

use crate::errors::{Error, Result};
use crate::introspect::{Callable, Definition, Introspector, SourceIntrospector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Backend the registration gate serves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum BackendMode {
    /// Return callables untouched, never introspect
    Bare = 0,
    /// Attach metadata and return the callable
    #[default]
    WithMetadata = 1,
    /// Attach metadata for the workflow engine
    Workflow = 2,
    /// Attach metadata for the core graph runtime
    Core = 3,
}

impl BackendMode {
    pub const ALL: [BackendMode; 4] = [
        BackendMode::Bare,
        BackendMode::WithMetadata,
        BackendMode::Workflow,
        BackendMode::Core,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bare => "bare",
            Self::WithMetadata => "with-metadata",
            Self::Workflow => "workflow",
            Self::Core => "core",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Bare,
            2 => Self::Workflow,
            3 => Self::Core,
            _ => Self::WithMetadata,
        }
    }
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "unknown backend `{s}` (expected one of: bare, with-metadata, workflow, core)"
                ))
            })
    }
}

static BACKEND_MODE: AtomicU8 = AtomicU8::new(BackendMode::WithMetadata as u8);

/// Select the backend used by [`register`] for the whole process
pub fn set_backend_mode(mode: BackendMode) {
    BACKEND_MODE.store(mode as u8, Ordering::SeqCst);
}

/// Backend currently used by [`register`]
pub fn backend_mode() -> BackendMode {
    BackendMode::from_u8(BACKEND_MODE.load(Ordering::SeqCst))
}

/// Registration gate bound to one backend, author and introspector
#[derive(Debug, Clone)]
pub struct Registrar<I = SourceIntrospector> {
    mode: BackendMode,
    author_name: String,
    author_email: String,
    introspector: I,
}

impl Registrar<SourceIntrospector> {
    pub fn new(mode: BackendMode) -> Self {
        Self {
            mode,
            author_name: String::new(),
            author_email: String::new(),
            introspector: SourceIntrospector::new(),
        }
    }
}

impl<I: Introspector> Registrar<I> {
    pub fn with_author(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.author_name = name.into();
        self.author_email = email.into();
        self
    }

    pub fn with_introspector<J: Introspector>(self, introspector: J) -> Registrar<J> {
        Registrar {
            mode: self.mode,
            author_name: self.author_name,
            author_email: self.author_email,
            introspector,
        }
    }

    pub fn mode(&self) -> BackendMode {
        self.mode
    }

    /// Attach metadata to a callable definition and return the callable.
    ///
    /// A callable that already went through the gate is returned as is.
    ///
    /// # Errors
    ///
    /// [`Error::NotCallable`] for non-callable definitions; errors raised
    /// while parsing annotations propagate unchanged.
    pub fn register(&self, definition: &Definition) -> Result<Arc<Callable>> {
        let Definition::Callable(callable) = definition else {
            return Err(Error::not_callable(definition.name(), definition.kind_name()));
        };

        if self.mode == BackendMode::Bare {
            return Ok(Arc::clone(callable));
        }

        if !callable.is_registered() {
            let attached = callable.attach_metadata(|| {
                self.introspector
                    .introspect(callable, &self.author_name, &self.author_email)
            })?;
            debug!(
                name = callable.name(),
                mode = %self.mode,
                described = attached.is_some(),
                "Registered callable"
            );
        }

        // One arm per backend; they all hand back the callable for now.
        match self.mode {
            BackendMode::WithMetadata => Ok(Arc::clone(callable)),
            BackendMode::Workflow => Ok(Arc::clone(callable)),
            BackendMode::Core => Ok(Arc::clone(callable)),
            BackendMode::Bare => Ok(Arc::clone(callable)),
        }
    }
}

/// Register with the process-wide backend and no author
pub fn register(definition: &Definition) -> Result<Arc<Callable>> {
    Registrar::new(backend_mode()).register(definition)
}

/// Register with the process-wide backend and the given author
pub fn register_with_author(
    definition: &Definition,
    author_name: &str,
    author_email: &str,
) -> Result<Arc<Callable>> {
    Registrar::new(backend_mode())
        .with_author(author_name, author_email)
        .register(definition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AnnotationExpr;
    use crate::core::Metadata;
    use crate::introspect::ItemKind;
    use crate::signature::Signature;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingIntrospector {
        calls: AtomicUsize,
    }

    impl Introspector for CountingIntrospector {
        fn introspect(
            &self,
            callable: &Callable,
            author_name: &str,
            author_email: &str,
        ) -> Result<Option<Metadata>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            SourceIntrospector::new().introspect(callable, author_name, author_email)
        }
    }

    fn add() -> Definition {
        Callable::function("demo", "add")
            .with_qualname("add")
            .with_source("fn add(a: i64, b: i64) -> i64 { a + b }\n")
            .with_signature(
                Signature::new()
                    .with_parameter("a", Some(AnnotationExpr::bare("i64")))
                    .with_parameter("b", Some(AnnotationExpr::bare("i64")))
                    .returning(AnnotationExpr::bare("i64")),
            )
            .into()
    }

    #[test]
    fn test_register_attaches_metadata_once() {
        let counter = CountingIntrospector::default();
        let registrar = Registrar::new(BackendMode::WithMetadata)
            .with_author("Ada", "ada@example.com")
            .with_introspector(&counter);
        let def = add();

        let first = registrar.register(&def).unwrap();
        let second = registrar.register(&def).unwrap();

        assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        let meta = first.metadata().unwrap();
        assert_eq!(meta.author_email, "ada@example.com");
    }

    #[test]
    fn test_bare_mode_never_introspects() {
        let counter = CountingIntrospector::default();
        let registrar = Registrar::new(BackendMode::Bare).with_introspector(&counter);
        let def = add();

        let returned = registrar.register(&def).unwrap();

        assert_eq!(counter.calls.load(Ordering::SeqCst), 0);
        assert!(Arc::ptr_eq(&returned, def.as_callable().unwrap()));
        assert!(!returned.is_registered());
    }

    #[test]
    fn test_every_metadata_mode_returns_same_callable() {
        for mode in [BackendMode::WithMetadata, BackendMode::Workflow, BackendMode::Core] {
            let def = add();
            let returned = Registrar::new(mode).register(&def).unwrap();
            assert!(Arc::ptr_eq(&returned, def.as_callable().unwrap()));
            assert!(returned.metadata().is_some());
        }
    }

    #[test]
    fn test_non_callable_is_rejected() {
        let def = Definition::Item {
            name: "LIMIT".into(),
            kind: ItemKind::Const,
        };
        let err = Registrar::new(BackendMode::Bare).register(&def).unwrap_err();
        assert!(matches!(err, Error::NotCallable { .. }));
    }

    #[test]
    fn test_absent_metadata_is_not_recomputed() {
        let counter = CountingIntrospector::default();
        let registrar = Registrar::new(BackendMode::Core).with_introspector(&counter);
        let def: Definition = Callable::function("demo", "opaque").into();

        registrar.register(&def).unwrap();
        registrar.register(&def).unwrap();

        assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
        assert!(def.as_callable().unwrap().metadata().is_none());
    }

    #[test]
    fn test_concurrent_registration_computes_once() {
        let counter = CountingIntrospector::default();
        let registrar = Registrar::new(BackendMode::WithMetadata).with_introspector(&counter);
        let def = add();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| registrar.register(&def).unwrap());
            }
        });

        assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backend_mode_parsing() {
        assert_eq!("with_metadata".parse::<BackendMode>().unwrap(), BackendMode::WithMetadata);
        assert_eq!("Core".parse::<BackendMode>().unwrap(), BackendMode::Core);
        assert!("pyiron".parse::<BackendMode>().is_err());
    }
}
