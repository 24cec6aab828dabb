//! # Symbolic Substrate
//!
//! A small expression algebra: identity-bearing [`Symbol`]s, the [`Expr`] tree with
//! equality, derivative and integral construction, substitution, and numeric
//! evaluation. Unit handling lives in [`crate::units`]; this module only carries
//! unit literals through.

pub mod expr;
pub mod ops;
pub mod symbol;

pub use expr::Expr;
pub use symbol::Symbol;
