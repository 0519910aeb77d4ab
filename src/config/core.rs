use crate::registry::BackendMode;
use crate::signature::DuplicateLabelPolicy;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the configured backend
pub const BACKEND_ENV_VAR: &str = "NODEMETA_BACKEND";

/// Root configuration structure for nodemeta
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NodemetaConfig {
    /// Author recorded in every generated record
    #[serde(default)]
    pub author: Option<AuthorConfig>,

    /// Backend the registration gate serves
    #[serde(default)]
    pub backend: Option<BackendMode>,

    /// Collision handling for labelled tuple outputs
    #[serde(default)]
    pub duplicate_labels: Option<DuplicateLabelPolicy>,

    /// Module root used instead of the package name from Cargo.toml
    #[serde(default)]
    pub crate_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AuthorConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl NodemetaConfig {
    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .and_then(|a| a.name.as_deref())
            .unwrap_or_default()
    }

    pub fn author_email(&self) -> &str {
        self.author
            .as_ref()
            .and_then(|a| a.email.as_deref())
            .unwrap_or_default()
    }

    pub fn backend(&self) -> BackendMode {
        self.backend.unwrap_or_default()
    }

    pub fn duplicate_labels(&self) -> DuplicateLabelPolicy {
        self.duplicate_labels.unwrap_or_default()
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// An unparsable backend value is reported and ignored.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup(BACKEND_ENV_VAR) {
            match raw.parse::<BackendMode>() {
                Ok(mode) => self.backend = Some(mode),
                Err(e) => tracing::warn!("Ignoring {}: {}", BACKEND_ENV_VAR, e),
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NodemetaConfig::default();
        assert_eq!(config.backend(), BackendMode::WithMetadata);
        assert_eq!(config.duplicate_labels(), DuplicateLabelPolicy::Overwrite);
        assert_eq!(config.author_name(), "");
    }

    #[test]
    fn test_env_override_backend() {
        let config = NodemetaConfig::default()
            .with_env_overrides(|key| (key == BACKEND_ENV_VAR).then(|| "bare".to_string()));
        assert_eq!(config.backend(), BackendMode::Bare);
    }

    #[test]
    fn test_invalid_env_override_is_ignored() {
        let config = NodemetaConfig {
            backend: Some(BackendMode::Core),
            ..Default::default()
        }
        .with_env_overrides(|_| Some("turbo".to_string()));
        assert_eq!(config.backend(), BackendMode::Core);
    }
}
