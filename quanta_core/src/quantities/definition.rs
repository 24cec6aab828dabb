//! Canonical quantities and their definitions.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::declaration::QuantityKind;
use crate::algebra::{Expr, Symbol};
use crate::units::Unit;

/// Metadata attached to a registered quantity.
///
/// Built once by the registration engine and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Definition {
    pub kind: QuantityKind,
    pub name: String,
    pub symbol: Symbol,
    pub doc: Option<String>,
    pub latex_name: Option<String>,
    /// Unit as written in the declaration
    pub declared_unit: Option<Unit>,
    /// Effective unit: the declared one, else the derived one, else dimensionless
    pub unit: Unit,
    pub default: Option<f64>,
    /// Resolved expression; for an Equation, usually an equality
    pub expr: Option<Expr>,
    pub locals: Vec<Quantity>,
    /// Variables mentioned by an Equation, in first-appearance order
    pub args: Vec<Quantity>,
    pub declared_at: DateTime<Utc>,
}

impl Definition {
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }
}

/// The canonical object of a registered Variable or Equation.
///
/// Cloning is cheap and every clone shares one [`Definition`]. Equality and hashing
/// follow the symbol, so a re-declared quantity is never equal to the one it
/// superseded.
#[derive(Debug, Clone)]
pub struct Quantity(Arc<Definition>);

impl Quantity {
    pub(crate) fn new(definition: Definition) -> Self {
        Quantity(Arc::new(definition))
    }

    pub fn definition(&self) -> &Definition {
        &self.0
    }

    pub fn symbol(&self) -> &Symbol {
        &self.0.symbol
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn kind(&self) -> QuantityKind {
        self.0.kind
    }

    pub fn doc(&self) -> Option<&str> {
        self.0.doc()
    }

    pub fn unit(&self) -> &Unit {
        &self.0.unit
    }

    pub fn default(&self) -> Option<f64> {
        self.0.default
    }

    /// A local sub-quantity by name (the last one wins on duplicates)
    pub fn local(&self, name: &str) -> Option<&Quantity> {
        self.0.locals.iter().rev().find(|q| q.name() == name)
    }

    pub fn locals(&self) -> &[Quantity] {
        &self.0.locals
    }

    pub fn args(&self) -> &[Quantity] {
        &self.0.args
    }

    /// The expression this quantity stands for in other expressions.
    ///
    /// A Variable is its symbol; an Equation is its expression.
    pub fn to_expr(&self) -> Expr {
        match (self.kind(), &self.0.expr) {
            (QuantityKind::Equation, Some(expr)) => expr.clone(),
            _ => Expr::symbol(self.symbol()),
        }
    }

    /// Left side of an equality Equation
    pub fn lhs(&self) -> Option<Expr> {
        self.equality().and_then(Expr::lhs).cloned()
    }

    /// Right side of an equality Equation
    pub fn rhs(&self) -> Option<Expr> {
        self.equality().and_then(Expr::rhs).cloned()
    }

    fn equality(&self) -> Option<&Expr> {
        match self.kind() {
            QuantityKind::Equation => self.0.expr.as_ref(),
            QuantityKind::Variable => None,
        }
    }

    pub fn powi(&self, exponent: i32) -> Expr {
        self.to_expr().powi(exponent)
    }

    pub fn powf(&self, exponent: f64) -> Expr {
        self.to_expr().powf(exponent)
    }

    /// True if both handles share one Definition
    pub fn same_definition(&self, other: &Quantity) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.symbol() == other.symbol()
    }
}

impl Eq for Quantity {}

impl Hash for Quantity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbol().hash(state);
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<&Quantity> for Expr {
    fn from(quantity: &Quantity) -> Self {
        quantity.to_expr()
    }
}

impl From<Quantity> for Expr {
    fn from(quantity: Quantity) -> Self {
        quantity.to_expr()
    }
}

// ============================================================================
// Operators
// ============================================================================

macro_rules! impl_quantity_ops {
    ($($trait:ident, $method:ident);* $(;)?) => {
        $(
            impl<T: Into<Expr>> $trait<T> for &Quantity {
                type Output = Expr;
                fn $method(self, rhs: T) -> Expr {
                    self.to_expr().$method(rhs)
                }
            }

            impl $trait<&Quantity> for f64 {
                type Output = Expr;
                fn $method(self, rhs: &Quantity) -> Expr {
                    Expr::Num(self).$method(rhs)
                }
            }
        )*
    };
}

impl_quantity_ops! {
    Add, add;
    Sub, sub;
    Mul, mul;
    Div, div;
}

impl Neg for &Quantity {
    type Output = Expr;
    fn neg(self) -> Expr {
        -self.to_expr()
    }
}
