//! Callable signatures and the extractor that turns them into input and
//! output annotation maps.

pub mod extractor;

pub use extractor::{DuplicateLabelPolicy, SignatureExtractor, SINGLE_OUTPUT_KEY};

use crate::annotation::AnnotationExpr;
use crate::errors::Result;
use serde::{Deserialize, Serialize};
use syn::{FnArg, Pat, ReturnType};

/// One declared parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub annotation: Option<AnnotationExpr>,
}

/// Declared parameters (in order) and return annotation of a callable
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub return_annotation: Option<AnnotationExpr>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        annotation: Option<AnnotationExpr>,
    ) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            annotation,
        });
        self
    }

    pub fn returning(mut self, annotation: AnnotationExpr) -> Self {
        self.return_annotation = Some(annotation);
        self
    }

    /// Build a signature from a parsed `fn` signature.
    ///
    /// The receiver is bound and never reported. Parameters bound by a
    /// pattern other than a plain identifier are named `arg{index}`.
    pub fn from_syn(sig: &syn::Signature) -> Result<Self> {
        let mut parameters = Vec::with_capacity(sig.inputs.len());
        for (index, input) in sig
            .inputs
            .iter()
            .filter_map(|arg| match arg {
                FnArg::Typed(pat_type) => Some(pat_type),
                FnArg::Receiver(_) => None,
            })
            .enumerate()
        {
            let name = match input.pat.as_ref() {
                Pat::Ident(pat_ident) => pat_ident.ident.to_string(),
                _ => format!("arg{index}"),
            };
            parameters.push(Parameter {
                name,
                annotation: Some(AnnotationExpr::from_syn(&input.ty)?),
            });
        }

        let return_annotation = match &sig.output {
            ReturnType::Default => None,
            ReturnType::Type(_, ty) => Some(AnnotationExpr::from_syn(ty)?),
        };

        Ok(Self {
            parameters,
            return_annotation,
        })
    }
}
