//! # Error Types
//!
//! Structured error types for quanta_core. Every fatal condition raised while
//! registering a declaration, deriving a unit, removing an entry or evaluating an
//! expression is one of these variants, and each carries enough context to tell
//! the declarer which quantity and which units were involved.
//!
//! ## Example
//!
//! ```rust
//! use quanta_core::errors::{QuantaError, QuantaResult};
//! use quanta_core::units::{meter, second};
//!
//! fn require_same(left: &quanta_core::Unit, right: &quanta_core::Unit) -> QuantaResult<()> {
//!     if !left.is_equivalent(right) {
//!         return Err(QuantaError::inconsistent_units(left, right));
//!     }
//!     Ok(())
//! }
//!
//! let err = require_same(&meter(), &second()).unwrap_err();
//! assert_eq!(err.to_string(), "Invalid expression units: meter == second");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::quantities::QuantityKind;
use crate::units::Unit;

/// Result type alias for quanta_core operations
pub type QuantaResult<T> = Result<T, QuantaError>;

/// Structured error type for registration, unit and evaluation failures.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum QuantaError {
    /// Declared and derived units differ, or the two sides of an equation differ
    #[error("Invalid expression units: {left} == {right}")]
    InconsistentUnits { left: String, right: String },

    /// An expression names something that is neither local nor registered
    #[error("Undefined reference: '{name}' is neither a local nor a registered quantity")]
    UndefinedReference { name: String },

    /// Removal targeted an object that is not in the registry
    #[error("Not found in registry: {name}")]
    NotFound { name: String },

    /// Re-declaration of an existing name while strict mode is on
    #[error("Double registration of {kind} '{name}'")]
    DoubleRegistration { kind: QuantityKind, name: String },

    /// The declaration itself is malformed (missing or misplaced attributes)
    #[error("Invalid declaration '{name}': {reason}")]
    InvalidDeclaration { name: String, reason: String },

    /// The expression cannot be given a unit
    #[error("Invalid expression: {reason}")]
    InvalidExpression { reason: String },

    /// Numeric evaluation failed
    #[error("Evaluation failed: {reason}")]
    Evaluation { reason: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl QuantaError {
    /// Create an InconsistentUnits error from the two mismatched units
    pub fn inconsistent_units(left: &Unit, right: &Unit) -> Self {
        QuantaError::InconsistentUnits {
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    /// Create an UndefinedReference error
    pub fn undefined_reference(name: impl Into<String>) -> Self {
        QuantaError::UndefinedReference { name: name.into() }
    }

    /// Create a NotFound error
    pub fn not_found(name: impl Into<String>) -> Self {
        QuantaError::NotFound { name: name.into() }
    }

    /// Create a DoubleRegistration error
    pub fn double_registration(kind: QuantityKind, name: impl Into<String>) -> Self {
        QuantaError::DoubleRegistration {
            kind,
            name: name.into(),
        }
    }

    /// Create an InvalidDeclaration error
    pub fn invalid_declaration(name: impl Into<String>, reason: impl Into<String>) -> Self {
        QuantaError::InvalidDeclaration {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidExpression error
    pub fn invalid_expression(reason: impl Into<String>) -> Self {
        QuantaError::InvalidExpression {
            reason: reason.into(),
        }
    }

    /// Create an Evaluation error
    pub fn evaluation(reason: impl Into<String>) -> Self {
        QuantaError::Evaluation {
            reason: reason.into(),
        }
    }

    /// Check if this error comes from a unit mismatch
    pub fn is_unit_error(&self) -> bool {
        matches!(self, QuantaError::InconsistentUnits { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            QuantaError::InconsistentUnits { .. } => "INCONSISTENT_UNITS",
            QuantaError::UndefinedReference { .. } => "UNDEFINED_REFERENCE",
            QuantaError::NotFound { .. } => "NOT_FOUND",
            QuantaError::DoubleRegistration { .. } => "DOUBLE_REGISTRATION",
            QuantaError::InvalidDeclaration { .. } => "INVALID_DECLARATION",
            QuantaError::InvalidExpression { .. } => "INVALID_EXPRESSION",
            QuantaError::Evaluation { .. } => "EVALUATION_FAILED",
            QuantaError::SerializationError { .. } => "SERIALIZATION_ERROR",
        }
    }
}

impl From<serde_json::Error> for QuantaError {
    fn from(err: serde_json::Error) -> Self {
        QuantaError::SerializationError {
            reason: err.to_string(),
        }
    }
}
