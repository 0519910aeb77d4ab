use super::Signature;
use crate::annotation::{parse_annotation, AnnotationExpr};
use crate::core::{Inputs, Outputs};
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};

/// Output key used when a callable returns a single value
pub const SINGLE_OUTPUT_KEY: &str = "output";

/// What to do when two unpacked outputs resolve to the same label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateLabelPolicy {
    /// Later outputs replace earlier ones under the shared key
    #[default]
    Overwrite,
    /// Fail with [`Error::DuplicateLabel`]
    Reject,
}

/// Enumerates a signature's parameters and unpacks its return annotation
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureExtractor {
    duplicate_labels: DuplicateLabelPolicy,
}

impl SignatureExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duplicate_labels(mut self, policy: DuplicateLabelPolicy) -> Self {
        self.duplicate_labels = policy;
        self
    }

    pub fn extract(&self, signature: &Signature) -> Result<(Inputs, Outputs)> {
        let inputs = self.extract_inputs(signature)?;
        let outputs = self.extract_outputs(signature.return_annotation.as_ref())?;
        Ok((inputs, outputs))
    }

    /// One entry per parameter, in declaration order
    pub fn extract_inputs(&self, signature: &Signature) -> Result<Inputs> {
        signature
            .parameters
            .iter()
            .map(|param| Ok((param.name.clone(), parse_annotation(param.annotation.as_ref())?)))
            .collect()
    }

    /// Unpack a return annotation into labelled outputs.
    ///
    /// One tagged level is peeled first so a whole tuple return can carry
    /// its own metadata and still be decomposed. A tuple yields one entry per
    /// member, keyed by the member's label or its index. Anything else yields
    /// a single entry keyed by its label, or [`SINGLE_OUTPUT_KEY`].
    pub fn extract_outputs(&self, returns: Option<&AnnotationExpr>) -> Result<Outputs> {
        let working = match returns {
            Some(AnnotationExpr::Tagged { base, .. }) => Some(base.as_ref()),
            other => other,
        };

        let mut outputs = Outputs::new();
        match working {
            Some(AnnotationExpr::Tuple(members)) => {
                for (index, member) in members.iter().enumerate() {
                    let annotation = parse_annotation(Some(member))?;
                    let key = annotation
                        .as_ref()
                        .and_then(|a| a.label.clone())
                        .unwrap_or_else(|| index.to_string());
                    self.insert(&mut outputs, key, annotation)?;
                }
            }
            _ => {
                let annotation = parse_annotation(returns)?;
                let key = annotation
                    .as_ref()
                    .and_then(|a| a.label.clone())
                    .unwrap_or_else(|| SINGLE_OUTPUT_KEY.to_string());
                outputs.insert(key, annotation);
            }
        }
        Ok(outputs)
    }

    fn insert(
        &self,
        outputs: &mut Outputs,
        key: String,
        annotation: Option<crate::core::Annotation>,
    ) -> Result<()> {
        if self.duplicate_labels == DuplicateLabelPolicy::Reject && outputs.contains_key(&key) {
            return Err(Error::DuplicateLabel { label: key });
        }
        outputs.insert(key, annotation);
        Ok(())
    }
}
