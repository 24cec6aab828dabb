//! # Symbolic Expressions
//!
//! The expression tree quantities are declared with. Constructors apply a small,
//! fixed set of automatic simplifications and nothing else:
//!
//! - nested sums and products are flattened
//! - numeric terms of a sum fold into one constant, numeric factors of a product
//!   fold into one leading coefficient
//! - `x**1 -> x`, `x**0 -> 1`, `num**num -> num`, `0*x -> 0`
//!
//! Like terms are never collected, so `a - a` stays a two-term sum and keeps the
//! unit of `a`.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::symbol::Symbol;
use crate::errors::{QuantaError, QuantaResult};
use crate::units::Unit;

/// Expression AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Dimensionless numeric literal
    Num(f64),
    /// Unit literal (e.g., a bare `meter` factor)
    Unit(Unit),
    /// Reference by name, resolved when the owning declaration is built
    Name(String),
    /// Resolved symbol
    Symbol(Symbol),
    /// Sum of terms
    Add(Vec<Expr>),
    /// Product of factors
    Mul(Vec<Expr>),
    /// Base raised to an exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Unevaluated derivative of `expr` with respect to `variable`
    Derivative {
        expr: Box<Expr>,
        variable: Box<Expr>,
        order: u32,
    },
    /// Unevaluated indefinite integral
    Integral {
        integrand: Box<Expr>,
        variable: Box<Expr>,
    },
    /// `lhs == rhs`
    Equality(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn num(value: f64) -> Self {
        Expr::Num(value)
    }

    pub fn name(name: impl Into<String>) -> Self {
        Expr::Name(name.into())
    }

    pub fn symbol(symbol: &Symbol) -> Self {
        Expr::Symbol(symbol.clone())
    }

    pub fn unit(unit: Unit) -> Self {
        Expr::Unit(unit)
    }

    /// Build a sum, flattening nested sums and folding numeric terms.
    pub fn sum(terms: Vec<Expr>) -> Self {
        let mut constant = 0.0;
        let mut rest = Vec::with_capacity(terms.len());
        for term in flatten(terms, |e| matches!(e, Expr::Add(_))) {
            match term {
                Expr::Num(value) => constant += value,
                other => rest.push(other),
            }
        }

        if constant != 0.0 || rest.is_empty() {
            rest.insert(0, Expr::Num(constant));
        }
        collapse(rest, Expr::Add)
    }

    /// Build a product, flattening nested products and folding numeric factors.
    pub fn product(factors: Vec<Expr>) -> Self {
        let mut coefficient = 1.0;
        let mut rest = Vec::with_capacity(factors.len());
        for factor in flatten(factors, |e| matches!(e, Expr::Mul(_))) {
            match factor {
                Expr::Num(value) => coefficient *= value,
                other => rest.push(other),
            }
        }

        if coefficient == 0.0 {
            return Expr::Num(0.0);
        }
        if coefficient != 1.0 || rest.is_empty() {
            rest.insert(0, Expr::Num(coefficient));
        }
        collapse(rest, Expr::Mul)
    }

    /// Build a power.
    pub fn power(base: Expr, exponent: Expr) -> Self {
        let exponent_value = exponent.as_number();
        if let (Some(b), Some(e)) = (base.as_number(), exponent_value) {
            return Expr::Num(b.powf(e));
        }
        match exponent_value {
            Some(e) if e == 1.0 => base,
            Some(e) if e == 0.0 => Expr::Num(1.0),
            _ => Expr::Pow(Box::new(base), Box::new(exponent)),
        }
    }

    /// Build an equality `lhs == rhs`.
    pub fn equality(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Expr::Equality(Box::new(lhs.into()), Box::new(rhs.into()))
    }

    /// Build an unevaluated derivative of the given order.
    pub fn derivative(expr: impl Into<Expr>, variable: impl Into<Expr>, order: u32) -> Self {
        Expr::Derivative {
            expr: Box::new(expr.into()),
            variable: Box::new(variable.into()),
            order,
        }
    }

    /// Build an unevaluated indefinite integral.
    pub fn integral(integrand: impl Into<Expr>, variable: impl Into<Expr>) -> Self {
        Expr::Integral {
            integrand: Box::new(integrand.into()),
            variable: Box::new(variable.into()),
        }
    }

    pub fn powi(self, exponent: i32) -> Self {
        Expr::power(self, Expr::Num(f64::from(exponent)))
    }

    pub fn powf(self, exponent: f64) -> Self {
        Expr::power(self, Expr::Num(exponent))
    }

    pub fn sqrt(self) -> Self {
        self.powf(0.5)
    }

    /// The numeric value of a literal
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Expr::Num(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, Expr::Equality(..))
    }

    /// Left side of an equality
    pub fn lhs(&self) -> Option<&Expr> {
        match self {
            Expr::Equality(lhs, _) => Some(lhs.as_ref()),
            _ => None,
        }
    }

    /// Right side of an equality
    pub fn rhs(&self) -> Option<&Expr> {
        match self {
            Expr::Equality(_, rhs) => Some(rhs.as_ref()),
            _ => None,
        }
    }

    /// Visit every node in pre-order, including derivative and integral variables.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Expr)) {
        visit(self);
        match self {
            Expr::Num(_) | Expr::Unit(_) | Expr::Name(_) | Expr::Symbol(_) => {}
            Expr::Add(items) | Expr::Mul(items) => {
                for item in items {
                    item.walk(visit);
                }
            }
            Expr::Pow(a, b) | Expr::Equality(a, b) => {
                a.walk(visit);
                b.walk(visit);
            }
            Expr::Derivative { expr, variable, .. } => {
                expr.walk(visit);
                variable.walk(visit);
            }
            Expr::Integral {
                integrand,
                variable,
            } => {
                integrand.walk(visit);
                variable.walk(visit);
            }
        }
    }

    /// Distinct symbols in order of first appearance.
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut found: Vec<Symbol> = Vec::new();
        self.walk(&mut |node| {
            if let Expr::Symbol(symbol) = node {
                if !found.contains(symbol) {
                    found.push(symbol.clone());
                }
            }
        });
        found
    }

    /// True if any unresolved [`Expr::Name`] remains
    pub fn has_names(&self) -> bool {
        let mut any = false;
        self.walk(&mut |node| any |= matches!(node, Expr::Name(_)));
        any
    }

    /// Substitute symbols by expressions.
    ///
    /// Subtrees without a mapped symbol are kept as they are; changed subtrees are
    /// rebuilt through the simplifying constructors. Derivative and integral
    /// variables are never substituted.
    pub fn subs(&self, mapping: &HashMap<Symbol, Expr>) -> Expr {
        self.substitute(mapping).unwrap_or_else(|| self.clone())
    }

    fn substitute(&self, mapping: &HashMap<Symbol, Expr>) -> Option<Expr> {
        match self {
            Expr::Symbol(symbol) => mapping.get(symbol).cloned(),
            Expr::Num(_) | Expr::Unit(_) | Expr::Name(_) => None,
            Expr::Add(terms) => substitute_all(terms, mapping).map(Expr::sum),
            Expr::Mul(factors) => substitute_all(factors, mapping).map(Expr::product),
            Expr::Pow(base, exponent) => substitute_pair(base, exponent, mapping)
                .map(|(base, exponent)| Expr::power(base, exponent)),
            Expr::Equality(lhs, rhs) => {
                substitute_pair(lhs, rhs, mapping).map(|(lhs, rhs)| Expr::equality(lhs, rhs))
            }
            Expr::Derivative {
                expr,
                variable,
                order,
            } => expr
                .substitute(mapping)
                .map(|expr| Expr::derivative(expr, (**variable).clone(), *order)),
            Expr::Integral {
                integrand,
                variable,
            } => integrand
                .substitute(mapping)
                .map(|integrand| Expr::integral(integrand, (**variable).clone())),
        }
    }

    /// Evaluate numerically with the given symbol values.
    ///
    /// Unit literals evaluate to 1 (coherent SI).
    pub fn evalf(&self, values: &HashMap<Symbol, f64>) -> QuantaResult<f64> {
        match self {
            Expr::Num(value) => Ok(*value),
            Expr::Unit(_) => Ok(1.0),
            Expr::Name(name) => Err(QuantaError::evaluation(format!(
                "unresolved name '{}'",
                name
            ))),
            Expr::Symbol(symbol) => values.get(symbol).copied().ok_or_else(|| {
                QuantaError::evaluation(format!("no value bound for '{}'", symbol))
            }),
            Expr::Add(terms) => terms.iter().map(|t| t.evalf(values)).sum(),
            Expr::Mul(factors) => factors.iter().map(|f| f.evalf(values)).product(),
            Expr::Pow(base, exponent) => Ok(base.evalf(values)?.powf(exponent.evalf(values)?)),
            Expr::Derivative { .. } | Expr::Integral { .. } => Err(QuantaError::evaluation(
                format!("'{}' is unevaluated", self),
            )),
            Expr::Equality(..) => Err(QuantaError::evaluation(format!(
                "'{}' is an equality; evaluate one side",
                self
            ))),
        }
    }

    fn is_atom(&self) -> bool {
        match self {
            Expr::Num(value) => *value >= 0.0,
            Expr::Name(_) | Expr::Symbol(_) | Expr::Derivative { .. } | Expr::Integral { .. } => {
                true
            }
            Expr::Unit(unit) => unit.factors().count() <= 1,
            _ => false,
        }
    }
}

fn flatten(items: Vec<Expr>, nested: impl Fn(&Expr) -> bool) -> Vec<Expr> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if nested(&item) {
            match item {
                Expr::Add(inner) | Expr::Mul(inner) => out.extend(inner),
                other => out.push(other),
            }
        } else {
            out.push(item);
        }
    }
    out
}

fn collapse(mut items: Vec<Expr>, wrap: fn(Vec<Expr>) -> Expr) -> Expr {
    if items.len() == 1 {
        items.remove(0)
    } else {
        wrap(items)
    }
}

fn substitute_all(items: &[Expr], mapping: &HashMap<Symbol, Expr>) -> Option<Vec<Expr>> {
    let replaced: Vec<Option<Expr>> = items.iter().map(|item| item.substitute(mapping)).collect();
    if replaced.iter().all(Option::is_none) {
        return None;
    }
    Some(
        replaced
            .into_iter()
            .zip(items)
            .map(|(new, old)| new.unwrap_or_else(|| old.clone()))
            .collect(),
    )
}

fn substitute_pair(
    a: &Expr,
    b: &Expr,
    mapping: &HashMap<Symbol, Expr>,
) -> Option<(Expr, Expr)> {
    match (a.substitute(mapping), b.substitute(mapping)) {
        (None, None) => None,
        (new_a, new_b) => Some((
            new_a.unwrap_or_else(|| a.clone()),
            new_b.unwrap_or_else(|| b.clone()),
        )),
    }
}

// ============================================================================
// Display
// ============================================================================

struct Wrapped<'a>(&'a Expr);

impl fmt::Display for Wrapped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_atom() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "({})", self.0)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(value) => write!(f, "{}", value),
            Expr::Unit(unit) => write!(f, "{}", unit),
            Expr::Name(name) => write!(f, "{}", name),
            Expr::Symbol(symbol) => write!(f, "{}", symbol),
            Expr::Add(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        write!(f, " + ")?;
                    }
                    write!(f, "{}", term)?;
                }
                Ok(())
            }
            Expr::Mul(factors) => {
                for (i, factor) in factors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "*")?;
                    }
                    match factor {
                        Expr::Add(_) => write!(f, "({})", factor)?,
                        _ => write!(f, "{}", factor)?,
                    }
                }
                Ok(())
            }
            Expr::Pow(base, exponent) => {
                write!(f, "{}**{}", Wrapped(base), Wrapped(exponent))
            }
            Expr::Derivative {
                expr,
                variable,
                order,
            } => {
                if *order == 1 {
                    write!(f, "Derivative({}, {})", expr, variable)
                } else {
                    write!(f, "Derivative({}, ({}, {}))", expr, variable, order)
                }
            }
            Expr::Integral {
                integrand,
                variable,
            } => write!(f, "Integral({}, {})", integrand, variable),
            Expr::Equality(lhs, rhs) => write!(f, "{} == {}", lhs, rhs),
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Num(value)
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Expr::Num(f64::from(value))
    }
}

impl From<Unit> for Expr {
    fn from(unit: Unit) -> Self {
        Expr::Unit(unit)
    }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        Expr::Symbol(symbol)
    }
}

impl From<&Symbol> for Expr {
    fn from(symbol: &Symbol) -> Self {
        Expr::Symbol(symbol.clone())
    }
}

impl From<&Expr> for Expr {
    fn from(expr: &Expr) -> Self {
        expr.clone()
    }
}

impl From<&str> for Expr {
    fn from(name: &str) -> Self {
        Expr::Name(name.to_string())
    }
}
