//! Registry configuration.

use serde::{Deserialize, Serialize};

use crate::errors::QuantaResult;

/// Behavior switches for a [`Registry`](crate::Registry).
///
/// Missing JSON fields take their default values.
///
/// # Example
///
/// ```rust
/// use quanta_core::RegistryConfig;
///
/// let config = RegistryConfig::from_json(r#"{"strict_redeclaration": true}"#).unwrap();
/// assert!(config.strict_redeclaration);
/// assert!(config.record_diagnostics);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Treat re-declaration of a name as a fatal error instead of a warning
    pub strict_redeclaration: bool,
    /// Keep emitted diagnostics on the registry
    pub record_diagnostics: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            strict_redeclaration: false,
            record_diagnostics: true,
        }
    }
}

impl RegistryConfig {
    /// Preset for pipelines that must not silently supersede declarations
    pub fn strict() -> Self {
        RegistryConfig {
            strict_redeclaration: true,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> QuantaResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
