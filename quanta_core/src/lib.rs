//! # quanta_core - Physical Quantity Registry
//!
//! `quanta_core` lets you declare physical Variables (with units and default values)
//! and Equations relating them. Every declaration is checked for dimensional
//! consistency when it is registered, and lands in an introspectable [`Registry`].
//!
//! ## Design Philosophy
//!
//! - **Check at declaration**: unit mismatches fail the registration call itself
//! - **Stable identity**: re-declaring a name creates a new quantity; old handles
//!   keep their old definition
//! - **Explicit service**: the registry is an owned value, not global state
//! - **Rich Errors**: structured error types and recorded diagnostics
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::HashMap;
//! use quanta_core::{Declaration, Expr, Registry};
//! use quanta_core::units::{meter, second};
//!
//! let mut registry = Registry::new();
//! let g = registry
//!     .register(
//!         Declaration::variable("g")
//!             .with_unit(meter() / second().powi(2))
//!             .with_default(9.8),
//!     )
//!     .unwrap();
//! let d = registry.register(Declaration::variable("d").with_unit(meter())).unwrap();
//!
//! let fall = registry
//!     .register(
//!         Declaration::equation("fall")
//!             .with_local(Declaration::variable("t").with_unit(second()))
//!             .with_expr(Expr::equality(&d, 0.5 * &g * Expr::name("t").powi(2))),
//!     )
//!     .unwrap();
//!
//! let t = fall.local("t").unwrap();
//! let rhs = registry.replace_defaults(&fall.rhs().unwrap());
//! let values = HashMap::from([(t.symbol().clone(), 1.0)]);
//! assert_eq!(rhs.evalf(&values).unwrap(), 4.9);
//! ```
//!
//! ## Modules
//!
//! - [`quantities`] - Declarations, canonical quantities and the registry
//! - [`units`] - Unit algebra, unit derivation and Markdown rendering
//! - [`algebra`] - Symbols and expressions
//! - [`introspection`] - Variable extraction, substitution and metadata tables
//! - [`errors`] - Structured error types
//! - [`diagnostics`] - Non-fatal warnings
//! - [`config`] - Registry configuration

pub mod algebra;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod introspection;
pub mod quantities;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use algebra::{Expr, Symbol};
pub use config::RegistryConfig;
pub use diagnostics::Diagnostic;
pub use errors::{QuantaError, QuantaResult};
pub use introspection::{generate_metadata_table, metadata_markdown, replace_variables, MetadataRow};
pub use quantities::{Declaration, Definition, Quantity, QuantityKind, Registry};
pub use units::{derive_unit, markdown, BaseUnit, Unit};
