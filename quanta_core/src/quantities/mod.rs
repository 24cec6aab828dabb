//! # Quantities
//!
//! Declaration, registration and lookup of Variables and Equations.
//!
//! A [`Declaration`] is a plain record built fluently by the author. Passing it to
//! [`Registry::register`] resolves its local sub-declarations, builds its
//! expression, derives and checks its unit, and inserts the resulting [`Quantity`]
//! into the registry. A `Quantity` is the canonical object: it carries a fresh
//! [`Symbol`](crate::Symbol) and an immutable [`Definition`].
//!
//! ## Example
//!
//! ```rust
//! use quanta_core::quantities::{Declaration, Registry};
//! use quanta_core::units::{meter, second};
//! use quanta_core::Expr;
//!
//! let mut registry = Registry::new();
//! let g = registry
//!     .register(
//!         Declaration::variable("g")
//!             .with_doc("Gravitational acceleration.")
//!             .with_unit(meter() / second().powi(2))
//!             .with_default(9.8),
//!     )
//!     .unwrap();
//! let d = registry
//!     .register(Declaration::variable("d").with_unit(meter()))
//!     .unwrap();
//!
//! let fall = registry
//!     .register(
//!         Declaration::equation("fall")
//!             .with_local(Declaration::variable("t").with_unit(second()))
//!             .with_expr(Expr::equality(&d, 0.5 * &g * Expr::name("t").powi(2))),
//!     )
//!     .unwrap();
//! assert_eq!(fall.args().len(), 3);
//! ```

mod builder;
pub mod declaration;
pub mod definition;
mod engine;
pub mod registry;

pub use declaration::{Declaration, QuantityKind};
pub use definition::{Definition, Quantity};
pub use registry::Registry;
