//! # Diagnostics
//!
//! Non-fatal events raised while mutating a [`Registry`](crate::Registry). Each one
//! is logged through `tracing` at `warn` level and, unless disabled in
//! [`RegistryConfig`](crate::RegistryConfig), recorded on the registry so callers
//! can inspect or escalate them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::quantities::QuantityKind;

/// A recorded warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum Diagnostic {
    /// A name was declared again; the new entry now answers to it
    DoubleRegistration { kind: QuantityKind, name: String },
    /// An entry was removed from the registry
    Removal { kind: QuantityKind, name: String },
}

impl Diagnostic {
    pub fn double_registration(kind: QuantityKind, name: impl Into<String>) -> Self {
        Diagnostic::DoubleRegistration {
            kind,
            name: name.into(),
        }
    }

    pub fn removal(kind: QuantityKind, name: impl Into<String>) -> Self {
        Diagnostic::Removal {
            kind,
            name: name.into(),
        }
    }

    /// Short code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            Diagnostic::DoubleRegistration { .. } => "DOUBLE_REGISTRATION",
            Diagnostic::Removal { .. } => "REMOVAL",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Diagnostic::DoubleRegistration { name, .. } | Diagnostic::Removal { name, .. } => name,
        }
    }

    pub(crate) fn log(&self) {
        tracing::warn!(code = self.code(), "{}", self);
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DoubleRegistration { kind, name } => {
                write!(f, "\"{}\" was already registered as a {}", name, kind)
            }
            Diagnostic::Removal { kind, name } => {
                write!(f, "{} \"{}\" deleted from the registry", kind, name)
            }
        }
    }
}
