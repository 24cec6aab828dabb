//! # Unit Algebra
//!
//! Physical units as products of named units raised to exact rational powers.
//! A [`Unit`] keeps the named units it was built from (so `joule/kilogram` still
//! renders as `J kg$^{-1}$`), and [`Unit::to_base`] expands coherent derived units
//! into SI base units for comparison.
//!
//! ## Design Philosophy
//!
//! - **Exact exponents**: `Rational64` exponents, so `meter**(1/2)` squared is `meter`
//! - **Structural equality**: `PartialEq` compares factors as written
//! - **Equivalence**: [`Unit::is_equivalent`] compares SI base expansions
//!
//! ## Example
//!
//! ```rust
//! use quanta_core::units::{joule, kilogram, meter, second};
//!
//! let specific_energy = joule() / kilogram();
//! assert_eq!(specific_energy.to_string(), "joule/kilogram");
//! assert!(specific_energy.is_equivalent(&(meter().powi(2) / second().powi(2))));
//! ```

pub mod derive;
pub mod markdown;

pub use derive::{derive_unit, UnitLookup};
pub use markdown::markdown;

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Div, Mul};

use num_rational::Rational64;
use num_traits::{CheckedAdd, CheckedMul, One, Signed, Zero};
use serde::{Deserialize, Serialize};

use crate::errors::{QuantaError, QuantaResult};

// ============================================================================
// Named Units
// ============================================================================

/// Named units known to the unit algebra.
///
/// The seven SI base units plus the coherent derived units used by the physics
/// declarations. Variant order is the display order of [`Unit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BaseUnit {
    Ampere,
    Candela,
    Hertz,
    Joule,
    Kelvin,
    Kilogram,
    Meter,
    Mole,
    Newton,
    Pascal,
    Second,
    Watt,
}

impl BaseUnit {
    /// All named units, in display order
    pub const ALL: [BaseUnit; 12] = [
        BaseUnit::Ampere,
        BaseUnit::Candela,
        BaseUnit::Hertz,
        BaseUnit::Joule,
        BaseUnit::Kelvin,
        BaseUnit::Kilogram,
        BaseUnit::Meter,
        BaseUnit::Mole,
        BaseUnit::Newton,
        BaseUnit::Pascal,
        BaseUnit::Second,
        BaseUnit::Watt,
    ];

    /// Full lowercase name (e.g., "meter")
    pub fn name(self) -> &'static str {
        match self {
            BaseUnit::Ampere => "ampere",
            BaseUnit::Candela => "candela",
            BaseUnit::Hertz => "hertz",
            BaseUnit::Joule => "joule",
            BaseUnit::Kelvin => "kelvin",
            BaseUnit::Kilogram => "kilogram",
            BaseUnit::Meter => "meter",
            BaseUnit::Mole => "mole",
            BaseUnit::Newton => "newton",
            BaseUnit::Pascal => "pascal",
            BaseUnit::Second => "second",
            BaseUnit::Watt => "watt",
        }
    }

    /// SI abbreviation (e.g., "m", "kg", "J")
    pub fn abbreviation(self) -> &'static str {
        match self {
            BaseUnit::Ampere => "A",
            BaseUnit::Candela => "cd",
            BaseUnit::Hertz => "Hz",
            BaseUnit::Joule => "J",
            BaseUnit::Kelvin => "K",
            BaseUnit::Kilogram => "kg",
            BaseUnit::Meter => "m",
            BaseUnit::Mole => "mol",
            BaseUnit::Newton => "N",
            BaseUnit::Pascal => "Pa",
            BaseUnit::Second => "s",
            BaseUnit::Watt => "W",
        }
    }

    /// Expansion into SI base units; empty for the base units themselves.
    pub fn decomposition(self) -> &'static [(BaseUnit, i64)] {
        use BaseUnit::*;
        match self {
            Hertz => &[(Second, -1)],
            Joule => &[(Kilogram, 1), (Meter, 2), (Second, -2)],
            Newton => &[(Kilogram, 1), (Meter, 1), (Second, -2)],
            Pascal => &[(Kilogram, 1), (Meter, -1), (Second, -2)],
            Watt => &[(Kilogram, 1), (Meter, 2), (Second, -3)],
            Ampere | Candela | Kelvin | Kilogram | Meter | Mole | Second => &[],
        }
    }

    /// True for the seven SI base units
    pub fn is_si_base(self) -> bool {
        self.decomposition().is_empty()
    }
}

impl fmt::Display for BaseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Unit Expression
// ============================================================================

/// A product of named units with rational exponents.
///
/// Invariant: no factor has a zero exponent, so the dimensionless identity is the
/// empty product and structural equality is well defined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Unit {
    factors: BTreeMap<BaseUnit, Rational64>,
}

impl Unit {
    /// The dimensionless identity unit
    pub fn one() -> Self {
        Self::default()
    }

    /// A single named unit
    pub fn base(unit: BaseUnit) -> Self {
        let mut out = Self::one();
        out.accumulate(unit, Rational64::one());
        out
    }

    /// Iterate over `(unit, exponent)` factors in display order
    pub fn factors(&self) -> impl Iterator<Item = (BaseUnit, Rational64)> + '_ {
        self.factors.iter().map(|(&unit, &exp)| (unit, exp))
    }

    /// Exponent of a named unit (zero when absent)
    pub fn exponent(&self, unit: BaseUnit) -> Rational64 {
        self.factors.get(&unit).copied().unwrap_or_else(Rational64::zero)
    }

    /// True when the unit has no factors as written
    pub fn is_one(&self) -> bool {
        self.factors.is_empty()
    }

    /// True when the SI base expansion has no factors (e.g., `joule/(newton*meter)`)
    pub fn is_dimensionless(&self) -> bool {
        self.to_base().is_one()
    }

    /// Raise to a rational power.
    ///
    /// Fails with [`QuantaError::InvalidExpression`] when an exponent no longer fits
    /// in a `Rational64`.
    pub fn pow(&self, exponent: Rational64) -> QuantaResult<Unit> {
        let mut out = Unit::one();
        for (&unit, exp) in &self.factors {
            let scaled = exp.checked_mul(&exponent).ok_or_else(|| {
                QuantaError::invalid_expression(format!(
                    "unit exponent overflow raising {} to {}",
                    self, exponent
                ))
            })?;
            out.accumulate(unit, scaled);
        }
        Ok(out)
    }

    /// Raise to an integer power
    pub fn powi(&self, exponent: i64) -> Unit {
        let exponent = Rational64::from_integer(exponent);
        let mut out = Unit::one();
        for (&unit, &exp) in &self.factors {
            out.accumulate(unit, exp * exponent);
        }
        out
    }

    /// Multiply, failing instead of overflowing an exponent
    pub fn try_mul(&self, rhs: &Unit) -> QuantaResult<Unit> {
        let mut out = self.clone();
        for (&unit, exp) in &rhs.factors {
            let sum = out.exponent(unit).checked_add(exp).ok_or_else(|| {
                QuantaError::invalid_expression(format!(
                    "unit exponent overflow multiplying {} by {}",
                    self, rhs
                ))
            })?;
            out.factors.remove(&unit);
            if !sum.is_zero() {
                out.factors.insert(unit, sum);
            }
        }
        Ok(out)
    }

    /// Divide, failing instead of overflowing an exponent
    pub fn try_div(&self, rhs: &Unit) -> QuantaResult<Unit> {
        self.try_mul(&rhs.powi(-1))
    }

    /// Expand derived units into SI base units
    pub fn to_base(&self) -> Unit {
        let mut out = Unit::one();
        for (&unit, &exp) in &self.factors {
            let parts = unit.decomposition();
            if parts.is_empty() {
                out.accumulate(unit, exp);
            } else {
                for &(base, base_exp) in parts {
                    out.accumulate(base, exp * Rational64::from_integer(base_exp));
                }
            }
        }
        out
    }

    /// Compare two units by their SI base expansion
    pub fn is_equivalent(&self, other: &Unit) -> bool {
        self.to_base() == other.to_base()
    }

    fn accumulate(&mut self, unit: BaseUnit, exponent: Rational64) {
        let entry = self.factors.entry(unit).or_insert_with(Rational64::zero);
        *entry += exponent;
        if entry.is_zero() {
            self.factors.remove(&unit);
        }
    }
}

fn format_factor(unit: BaseUnit, exponent: Rational64) -> String {
    if exponent.is_one() {
        unit.name().to_string()
    } else if exponent.is_integer() {
        format!("{}**{}", unit.name(), exponent)
    } else {
        format!("{}**({})", unit.name(), exponent)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numerator: Vec<String> = self
            .factors()
            .filter(|(_, exp)| exp.is_positive())
            .map(|(unit, exp)| format_factor(unit, exp))
            .collect();
        let denominator: Vec<String> = self
            .factors()
            .filter(|(_, exp)| exp.is_negative())
            .map(|(unit, exp)| format_factor(unit, -exp))
            .collect();

        let top = if numerator.is_empty() {
            "1".to_string()
        } else {
            numerator.join("*")
        };

        match denominator.len() {
            0 => write!(f, "{}", top),
            1 => write!(f, "{}/{}", top, denominator[0]),
            _ => write!(f, "{}/({})", top, denominator.join("*")),
        }
    }
}

impl From<BaseUnit> for Unit {
    fn from(unit: BaseUnit) -> Self {
        Unit::base(unit)
    }
}

// ============================================================================
// Arithmetic Implementations
// ============================================================================

impl Mul<&Unit> for &Unit {
    type Output = Unit;
    fn mul(self, rhs: &Unit) -> Unit {
        let mut out = self.clone();
        for (&unit, &exp) in &rhs.factors {
            out.accumulate(unit, exp);
        }
        out
    }
}

impl Div<&Unit> for &Unit {
    type Output = Unit;
    fn div(self, rhs: &Unit) -> Unit {
        self * &rhs.powi(-1)
    }
}

macro_rules! impl_owned_ops {
    ($trait:ident, $method:ident) => {
        impl $trait<Unit> for Unit {
            type Output = Unit;
            fn $method(self, rhs: Unit) -> Unit {
                (&self).$method(&rhs)
            }
        }

        impl $trait<&Unit> for Unit {
            type Output = Unit;
            fn $method(self, rhs: &Unit) -> Unit {
                (&self).$method(rhs)
            }
        }

        impl $trait<Unit> for &Unit {
            type Output = Unit;
            fn $method(self, rhs: Unit) -> Unit {
                self.$method(&rhs)
            }
        }
    };
}

impl_owned_ops!(Mul, mul);
impl_owned_ops!(Div, div);

// ============================================================================
// Unit Constructors
// ============================================================================

macro_rules! unit_constructors {
    ($($fn_name:ident => $variant:ident),* $(,)?) => {
        $(
            #[doc = concat!("The `", stringify!($fn_name), "` unit")]
            pub fn $fn_name() -> Unit {
                Unit::base(BaseUnit::$variant)
            }
        )*
    };
}

unit_constructors! {
    ampere => Ampere,
    candela => Candela,
    hertz => Hertz,
    joule => Joule,
    kelvin => Kelvin,
    kilogram => Kilogram,
    meter => Meter,
    mole => Mole,
    newton => Newton,
    pascal => Pascal,
    second => Second,
    watt => Watt,
}
