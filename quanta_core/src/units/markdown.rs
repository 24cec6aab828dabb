//! Markdown rendering of units for metadata tables.

use num_traits::One;

use super::Unit;

/// Render a unit in Markdown with LaTeX superscript exponents.
///
/// Factors are sorted by abbreviation and separated by spaces; an exponent of one
/// is omitted. The dimensionless unit renders as `1`.
///
/// # Example
///
/// ```rust
/// use quanta_core::units::{kilogram, markdown, meter, second};
///
/// assert_eq!(markdown(&(kilogram() * meter() / second().powi(2))), "kg m s$^{-2}$");
/// ```
pub fn markdown(unit: &Unit) -> String {
    if unit.is_one() {
        return "1".to_string();
    }

    let mut parts: Vec<_> = unit
        .factors()
        .map(|(base, exp)| (base.abbreviation(), exp))
        .collect();
    parts.sort_by(|a, b| a.0.cmp(b.0));

    parts
        .iter()
        .map(|(abbreviation, exp)| {
            if exp.is_one() {
                abbreviation.to_string()
            } else {
                format!("{}$^{{{}}}$", abbreviation, exp)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
