//! # Introspection Utilities
//!
//! Queries over expressions and registered quantities: which Variables an
//! expression mentions, substitution of Variables by values or other expressions,
//! and the metadata table used to document a set of Variables.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::algebra::{Expr, Symbol};
use crate::quantities::{Quantity, Registry};
use crate::units::markdown;

impl Registry {
    /// Registered Variables (including locals) anywhere in `expr`.
    ///
    /// Derivative and integral variables count. For an equality both sides are
    /// searched; pass one side to leave the other out.
    pub fn extract_variables(&self, expr: &Expr) -> HashSet<Symbol> {
        expr.symbols()
            .into_iter()
            .filter(|symbol| self.is_variable(symbol))
            .collect()
    }

    /// Substitute every Variable that has a default by `default * unit`.
    ///
    /// The result keeps its unit, and evaluates like the plain numbers since unit
    /// literals evaluate to 1. Use [`Registry::default_values`] with
    /// [`replace_variables`] for bare numbers.
    pub fn replace_defaults(&self, expr: &Expr) -> Expr {
        let mapping: HashMap<Symbol, Expr> = self
            .defaults
            .iter()
            .map(|(symbol, value)| {
                let quantity = match self.lookup(symbol).map(|q| q.unit()) {
                    Some(unit) if !unit.is_one() => {
                        Expr::product(vec![Expr::num(*value), Expr::unit(unit.clone())])
                    }
                    _ => Expr::num(*value),
                };
                (symbol.clone(), quantity)
            })
            .collect();
        replace_variables(expr, &mapping)
    }

    /// Defaults as dimensionless numbers, ready for [`replace_variables`]
    pub fn default_values(&self) -> HashMap<Symbol, Expr> {
        self.defaults
            .iter()
            .map(|(symbol, value)| (symbol.clone(), Expr::num(*value)))
            .collect()
    }

    /// Substitute every expression-valued Variable by its expression (one level)
    pub fn replace_expressions(&self, expr: &Expr) -> Expr {
        replace_variables(expr, &self.expressions)
    }
}

/// Substitute mapped Variables and leave the rest symbolic.
pub fn replace_variables(expr: &Expr, mapping: &HashMap<Symbol, Expr>) -> Expr {
    expr.subs(mapping)
}

// ============================================================================
// Metadata Table
// ============================================================================

static GREEK: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "alpha", "beta", "gamma", "delta", "epsilon", "varepsilon", "zeta", "eta", "theta",
        "vartheta", "iota", "kappa", "lambda", "mu", "nu", "xi", "pi", "rho", "sigma", "tau",
        "upsilon", "phi", "varphi", "chi", "psi", "omega", "Gamma", "Delta", "Theta",
        "Lambda", "Xi", "Pi", "Sigma", "Upsilon", "Phi", "Psi", "Omega",
    ]
    .into_iter()
    .collect()
});

/// One row of a metadata table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataRow {
    pub symbol: String,
    pub name: String,
    pub description: String,
    pub default: String,
    pub unit: String,
}

impl MetadataRow {
    pub fn header() -> Self {
        MetadataRow {
            symbol: "Symbol".into(),
            name: "Name".into(),
            description: "Description".into(),
            default: "Default value".into(),
            unit: "Units".into(),
        }
    }

    pub fn cells(&self) -> [&str; 5] {
        [
            self.symbol.as_str(),
            self.name.as_str(),
            self.description.as_str(),
            self.default.as_str(),
            self.unit.as_str(),
        ]
    }
}

/// Metadata rows for the given Variables, header row first.
///
/// # Example
///
/// ```rust
/// use quanta_core::introspection::generate_metadata_table;
/// use quanta_core::quantities::{Declaration, Registry};
/// use quanta_core::units::{joule, kilogram};
///
/// let mut registry = Registry::new();
/// let lambda_e = registry
///     .register(
///         Declaration::variable("lambda_E")
///             .with_doc("Latent heat of evaporation.")
///             .with_unit(joule() / kilogram())
///             .with_default(2.45e6),
///     )
///     .unwrap();
///
/// let rows = generate_metadata_table(&[lambda_e]);
/// assert_eq!(
///     rows[1].cells(),
///     ["$\\lambda_E$", "lambda_E", "Latent heat of evaporation.", "2450000.0", "J kg$^{-1}$"]
/// );
/// ```
pub fn generate_metadata_table(variables: &[Quantity]) -> Vec<MetadataRow> {
    std::iter::once(MetadataRow::header())
        .chain(variables.iter().map(metadata_row))
        .collect()
}

fn metadata_row(quantity: &Quantity) -> MetadataRow {
    let definition = quantity.definition();
    MetadataRow {
        symbol: latex_symbol(quantity.name(), definition.latex_name.as_deref()),
        name: quantity.name().to_string(),
        description: definition
            .doc()
            .and_then(|doc| doc.lines().map(str::trim).find(|line| !line.is_empty()))
            .unwrap_or_default()
            .to_string(),
        default: definition
            .default
            .map(format_default)
            .unwrap_or_else(|| "-".to_string()),
        unit: markdown(quantity.unit()),
    }
}

/// Shortest round-trip form; exponent notation below 1e-4 and from 1e16 on.
fn format_default(value: f64) -> String {
    let magnitude = value.abs();
    if value.is_finite() && value != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{:e}", value);
        if let Some((mantissa, exponent)) = formatted.split_once('e') {
            if let Ok(exponent) = exponent.parse::<i32>() {
                let sign = if exponent < 0 { '-' } else { '+' };
                return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
            }
        }
    }
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// LaTeX for a quantity name, wrapped in `$`.
///
/// `lambda_E` becomes `$\lambda_E$`, `T_ref` becomes `$T_{ref}$`.
pub fn latex_symbol(name: &str, latex_name: Option<&str>) -> String {
    if let Some(latex) = latex_name {
        return format!("${}$", latex);
    }
    let (base, subscript) = match name.split_once('_') {
        Some((base, subscript)) => (base, Some(subscript)),
        None => (name, None),
    };

    let mut out = String::from("$");
    if GREEK.contains(base) {
        out.push('\\');
    }
    out.push_str(base);
    match subscript {
        Some(sub) if sub.chars().count() == 1 => {
            out.push('_');
            out.push_str(sub);
        }
        Some(sub) if !sub.is_empty() => {
            out.push_str("_{");
            out.push_str(sub);
            out.push('}');
        }
        _ => {}
    }
    out.push('$');
    out
}

/// Render metadata rows as a Markdown table; the first row is the header.
pub fn metadata_markdown(rows: &[MetadataRow]) -> String {
    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        out.push_str("| ");
        out.push_str(&row.cells().join(" | "));
        out.push_str(" |\n");
        if i == 0 {
            out.push_str(&"|---".repeat(5));
            out.push_str("|\n");
        }
    }
    out
}
