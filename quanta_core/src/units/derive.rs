//! Unit derivation for expressions.
//!
//! Walks an [`Expr`] and computes its unit in SI base form. Sums and equalities
//! must be homogeneous, exponents must be dimensionless.

use std::collections::HashMap;

use num_rational::Rational64;

use super::Unit;
use crate::algebra::{Expr, Symbol};
use crate::errors::{QuantaError, QuantaResult};

/// Source of units for the symbols an expression mentions.
pub trait UnitLookup {
    /// The declared unit of a symbol, or `None` if the symbol is unknown here
    fn unit_of(&self, symbol: &Symbol) -> Option<Unit>;
}

impl UnitLookup for HashMap<Symbol, Unit> {
    fn unit_of(&self, symbol: &Symbol) -> Option<Unit> {
        self.get(symbol).cloned()
    }
}

/// Compute the unit of an expression.
///
/// The result is expanded into SI base units. Sum terms and both sides of an
/// equality must agree, otherwise [`QuantaError::InconsistentUnits`] names the first
/// unit and the offending one.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use quanta_core::algebra::{Expr, Symbol};
/// use quanta_core::units::{derive_unit, meter, second};
///
/// let x = Symbol::new("x");
/// let t = Symbol::new("t");
/// let mut units = HashMap::new();
/// units.insert(x.clone(), meter());
/// units.insert(t.clone(), second());
///
/// let speed = Expr::symbol(&x) / Expr::symbol(&t);
/// assert_eq!(derive_unit(&speed, &units).unwrap(), meter() / second());
/// ```
pub fn derive_unit(expr: &Expr, lookup: &dyn UnitLookup) -> QuantaResult<Unit> {
    match expr {
        Expr::Num(_) => Ok(Unit::one()),
        Expr::Unit(unit) => Ok(unit.to_base()),
        Expr::Name(name) => Err(QuantaError::undefined_reference(name.as_str())),
        Expr::Symbol(symbol) => lookup
            .unit_of(symbol)
            .map(|unit| unit.to_base())
            .ok_or_else(|| QuantaError::undefined_reference(symbol.name())),
        Expr::Add(terms) => {
            let mut units = terms.iter().map(|term| derive_unit(term, lookup));
            let first = match units.next() {
                Some(unit) => unit?,
                None => return Ok(Unit::one()),
            };
            for unit in units {
                let unit = unit?;
                if unit != first {
                    return Err(QuantaError::inconsistent_units(&first, &unit));
                }
            }
            Ok(first)
        }
        Expr::Mul(factors) => {
            let mut unit = Unit::one();
            for factor in factors {
                unit = unit.try_mul(&derive_unit(factor, lookup)?)?;
            }
            Ok(unit)
        }
        Expr::Pow(base, exponent) => {
            let exponent_unit = derive_unit(exponent, lookup)?;
            if !exponent_unit.is_one() {
                return Err(QuantaError::inconsistent_units(&exponent_unit, &Unit::one()));
            }
            let base_unit = derive_unit(base, lookup)?;
            if base_unit.is_one() {
                return Ok(base_unit);
            }
            let power = exponent
                .as_number()
                .and_then(Rational64::approximate_float)
                .ok_or_else(|| {
                    QuantaError::invalid_expression(format!(
                        "exponent '{}' of a dimensional base must be a number",
                        exponent
                    ))
                })?;
            base_unit.pow(power)
        }
        Expr::Derivative {
            expr,
            variable,
            order,
        } => {
            let numerator = derive_unit(expr, lookup)?;
            let denominator = derive_unit(variable, lookup)?;
            numerator.try_div(&denominator.pow(Rational64::from_integer(i64::from(*order)))?)
        }
        Expr::Integral {
            integrand,
            variable,
        } => derive_unit(integrand, lookup)?.try_mul(&derive_unit(variable, lookup)?),
        Expr::Equality(lhs, rhs) => {
            let left = derive_unit(lhs, lookup)?;
            let right = derive_unit(rhs, lookup)?;
            if left != right {
                return Err(QuantaError::inconsistent_units(&left, &right));
            }
            Ok(left)
        }
    }
}
