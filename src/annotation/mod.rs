//! Annotation expressions and the parser that turns them into [`Annotation`]s.
//!
//! An annotation expression is one of:
//!
//! - a bare type (`i64`, `Vec<u8>`)
//! - a tagged wrapper `Annotated<T, meta!(label = "x", unit = "m")>` pairing a
//!   base type with a side-channel payload
//! - a tuple of expressions, used to describe multi-value returns
//!
//! An absent expression is modelled as `Option::None` by the callers.
//!
//! [`Annotation`]: crate::core::Annotation

pub mod expr;
pub mod parser;

pub use expr::{AnnotationExpr, SideChannel};
pub use parser::parse_annotation;
