//! # Registration Engine
//!
//! Turns a [`Declaration`] into a registered [`Quantity`]:
//!
//! 1. locals are registered into a child scope, in order
//! 2. the expression is built against that scope
//! 3. the unit is derived and checked against the declared one
//! 4. a fresh symbol and an immutable [`Definition`] are created
//! 5. the quantity is inserted, superseding any entry with the same name
//!
//! Steps 1-4 only read the registry, so a failed declaration leaves it untouched.

use chrono::Utc;

use super::builder::{build_expression, Scope};
use super::declaration::{Declaration, QuantityKind};
use super::definition::{Definition, Quantity};
use super::registry::Registry;
use crate::algebra::{Expr, Symbol};
use crate::diagnostics::Diagnostic;
use crate::errors::{QuantaError, QuantaResult};
use crate::units::{self, Unit};

impl Registry {
    /// Register a declaration and return its canonical quantity.
    ///
    /// Re-declaring a name supersedes the previous entry and emits a
    /// [`Diagnostic::DoubleRegistration`], or fails with
    /// [`QuantaError::DoubleRegistration`] when `strict_redeclaration` is set.
    pub fn register(&mut self, declaration: Declaration) -> QuantaResult<Quantity> {
        let strict = self.config.strict_redeclaration;
        let mut diagnostics = Vec::new();
        let quantity = prepare(&declaration, &Scope::root(self), strict, &mut diagnostics)?;

        if self.table(quantity.kind()).contains_name(quantity.name()) {
            if strict {
                return Err(QuantaError::double_registration(
                    quantity.kind(),
                    quantity.name(),
                ));
            }
            diagnostics.push(Diagnostic::double_registration(
                quantity.kind(),
                quantity.name(),
            ));
        }

        self.index(&quantity);
        self.insert(quantity.clone());
        for diagnostic in diagnostics {
            self.emit(diagnostic);
        }

        tracing::debug!(
            kind = %quantity.kind(),
            name = quantity.name(),
            unit = %quantity.unit(),
            "registered quantity"
        );
        Ok(quantity)
    }

    /// Resolve names in an expression against the registered Variables
    pub fn build_expression(&self, expr: &Expr) -> QuantaResult<Expr> {
        build_expression(expr, &Scope::root(self))
    }

    /// Unit of an expression over registered quantities, in SI base form
    pub fn derive_unit(&self, expr: &Expr) -> QuantaResult<Unit> {
        units::derive_unit(expr, self)
    }
}

fn prepare(
    declaration: &Declaration,
    parent: &Scope<'_>,
    strict: bool,
    diagnostics: &mut Vec<Diagnostic>,
) -> QuantaResult<Quantity> {
    let mut scope = parent.child();
    for local in &declaration.locals {
        if local.kind != QuantityKind::Variable {
            return Err(QuantaError::invalid_declaration(
                &declaration.name,
                format!("local '{}' must be a variable", local.name),
            ));
        }
        let quantity = prepare(local, &scope, strict, diagnostics)?;
        if scope.declare(quantity) {
            if strict {
                return Err(QuantaError::double_registration(
                    QuantityKind::Variable,
                    &local.name,
                ));
            }
            diagnostics.push(Diagnostic::double_registration(
                QuantityKind::Variable,
                &local.name,
            ));
        }
    }

    let expr = declaration
        .expr
        .as_ref()
        .map(|raw| build_expression(raw, &scope))
        .transpose()?;

    let unit = match declaration.kind {
        QuantityKind::Variable => variable_unit(declaration, expr.as_ref(), &scope)?,
        QuantityKind::Equation => equation_unit(declaration, expr.as_ref(), &scope)?,
    };

    let args = match (declaration.kind, &expr) {
        (QuantityKind::Equation, Some(expr)) => expr
            .symbols()
            .iter()
            .filter_map(|symbol| scope.quantity(symbol))
            .filter(|q| q.kind() == QuantityKind::Variable)
            .collect(),
        _ => Vec::new(),
    };

    Ok(Quantity::new(Definition {
        kind: declaration.kind,
        name: declaration.name.clone(),
        symbol: Symbol::new(declaration.name.as_str()),
        doc: declaration.doc.clone(),
        latex_name: declaration.latex_name.clone(),
        declared_unit: declaration.unit.clone(),
        unit,
        default: declaration.default,
        expr,
        locals: scope.into_entries(),
        args,
        declared_at: Utc::now(),
    }))
}

fn variable_unit(
    declaration: &Declaration,
    expr: Option<&Expr>,
    scope: &Scope<'_>,
) -> QuantaResult<Unit> {
    let Some(expr) = expr else {
        return Ok(declaration.unit.clone().unwrap_or_else(Unit::one));
    };
    if expr.is_equality() {
        return Err(QuantaError::invalid_declaration(
            &declaration.name,
            "a variable expression cannot be an equality",
        ));
    }

    let derived = units::derive_unit(expr, scope)?;
    match &declaration.unit {
        Some(declared) if !declared.is_equivalent(&derived) => {
            Err(QuantaError::inconsistent_units(declared, &derived))
        }
        Some(declared) => Ok(declared.clone()),
        None => Ok(derived),
    }
}

fn equation_unit(
    declaration: &Declaration,
    expr: Option<&Expr>,
    scope: &Scope<'_>,
) -> QuantaResult<Unit> {
    if declaration.default.is_some() {
        return Err(QuantaError::invalid_declaration(
            &declaration.name,
            "an equation cannot have a default value",
        ));
    }
    let Some(expr) = expr else {
        return Err(QuantaError::invalid_declaration(
            &declaration.name,
            "equation requires an expression",
        ));
    };

    // An equality must have matching sides; other expressions only need a unit
    let derived = units::derive_unit(expr, scope)?;

    match &declaration.unit {
        Some(declared) if !declared.is_equivalent(&derived) => {
            Err(QuantaError::inconsistent_units(declared, &derived))
        }
        Some(declared) => Ok(declared.clone()),
        None => Ok(derived),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;
    use crate::units::{joule, kelvin, kilogram, meter, mole, second};

    fn fall_registry() -> (Registry, Quantity, Quantity) {
        let mut registry = Registry::new();
        let g = registry
            .register(
                Declaration::variable("g")
                    .with_unit(meter() / second().powi(2))
                    .with_default(9.8),
            )
            .unwrap();
        let d = registry
            .register(Declaration::variable("d").with_unit(meter()))
            .unwrap();
        (registry, g, d)
    }

    #[test]
    fn test_bare_variable_is_dimensionless() {
        let mut registry = Registry::new();
        let x = registry.register(Declaration::variable("x")).unwrap();
        assert!(x.unit().is_one());
        assert_eq!(registry.variable("x"), Some(&x));
        assert!(registry.diagnostics().is_empty());
    }

    #[test]
    fn test_declared_unit_must_match_expression() {
        let (mut registry, g, d) = fall_registry();

        let err = registry
            .register(
                Declaration::variable("v")
                    .with_unit(meter())
                    .with_expr(&d / &g),
            )
            .unwrap_err();
        assert!(err.is_unit_error());
        assert!(registry.variable("v").is_none());

        let v = registry
            .register(
                Declaration::variable("v")
                    .with_unit(meter() / second())
                    .with_expr((&d * &g).sqrt()),
            )
            .unwrap();
        assert_eq!(v.unit(), &(meter() / second()));
        assert_eq!(registry.expressions().get(v.symbol()), v.definition().expr.as_ref());
    }

    #[test]
    fn test_declared_unit_keeps_named_form() {
        let mut registry = Registry::new();
        let q = registry
            .register(Declaration::variable("q").with_unit(joule()))
            .unwrap();
        let m = registry
            .register(Declaration::variable("m").with_unit(kilogram()))
            .unwrap();
        let specific = registry
            .register(
                Declaration::variable("e")
                    .with_unit(joule() / kilogram())
                    .with_expr(&q / &m),
            )
            .unwrap();
        assert_eq!(specific.unit().to_string(), "joule/kilogram");
    }

    #[test]
    fn test_expression_unit_is_derived() {
        let mut registry = Registry::new();
        let r = registry
            .register(Declaration::variable("R").with_unit(joule() / (mole() * kelvin())))
            .unwrap();
        let t = registry
            .register(Declaration::variable("T").with_unit(kelvin()))
            .unwrap();
        let rt = registry
            .register(Declaration::variable("RT").with_expr(&r * &t))
            .unwrap();
        assert!(rt.unit().is_equivalent(&(joule() / mole())));
        assert!(rt.definition().declared_unit.is_none());
    }

    #[test]
    fn test_equation_sides_must_match() {
        let (mut registry, g, d) = fall_registry();
        let err = registry
            .register(Declaration::equation("bad").with_expr(Expr::equality(&g, &d)))
            .unwrap_err();
        assert_eq!(
            err,
            QuantaError::InconsistentUnits {
                left: "meter/second**2".into(),
                right: "meter".into(),
            }
        );
        assert_eq!(registry.equation_count(), 0);
    }

    #[test]
    fn test_equation_shape_errors() {
        let (mut registry, g, _) = fall_registry();

        let missing = registry.register(Declaration::equation("e1")).unwrap_err();
        assert_eq!(missing.error_code(), "INVALID_DECLARATION");

        let with_default = registry
            .register(
                Declaration::equation("e3")
                    .with_default(1.0)
                    .with_expr(Expr::equality(&g, &g)),
            )
            .unwrap_err();
        assert_eq!(with_default.error_code(), "INVALID_DECLARATION");

        let variable_eq = registry
            .register(Declaration::variable("v").with_expr(Expr::equality(&g, &g)))
            .unwrap_err();
        assert_eq!(variable_eq.error_code(), "INVALID_DECLARATION");
    }

    #[test]
    fn test_equation_without_equality() {
        let (mut registry, g, _) = fall_registry();
        let doubled = registry
            .register(Declaration::equation("doubled").with_expr(2.0 * &g))
            .unwrap();

        assert_eq!(doubled.unit(), &(meter() / second().powi(2)));
        assert_eq!(doubled.to_expr(), 2.0 * Expr::symbol(g.symbol()));
        assert!(doubled.lhs().is_none());
        assert_eq!(doubled.args(), &[g.clone()]);
        assert_eq!(registry.equation("doubled"), Some(&doubled));

        let err = registry
            .register(
                Declaration::equation("mismatched")
                    .with_unit(meter())
                    .with_expr(2.0 * &g),
            )
            .unwrap_err();
        assert!(err.is_unit_error());
    }

    #[test]
    fn test_variable_with_local_default() {
        let mut registry = Registry::new();
        let definition = registry
            .register(
                Declaration::variable("local_definition")
                    .with_doc("Local definition.")
                    .with_local(
                        Declaration::variable("local_variable")
                            .with_doc("Local variable.")
                            .with_unit(meter())
                            .with_default(2.0),
                    )
                    .with_expr(1.5 * Expr::name("local_variable")),
            )
            .unwrap();

        let local = definition.local("local_variable").unwrap();
        assert_eq!(definition.doc(), Some("Local definition."));
        assert_eq!(definition.unit(), &meter());
        assert_eq!(registry.defaults().get(local.symbol()), Some(&2.0));
        assert!(registry.variable("local_variable").is_none());

        let expr = definition.definition().expr.clone().unwrap();
        assert_eq!(
            crate::introspection::replace_variables(&expr, &registry.default_values()),
            Expr::num(3.0)
        );
        assert_eq!(registry.replace_defaults(&expr).evalf(&Default::default()).unwrap(), 3.0);
    }

    #[test]
    fn test_equation_records_args_and_locals() {
        let (mut registry, g, d) = fall_registry();
        let fall = registry
            .register(
                Declaration::equation("fall")
                    .with_doc("Distance fallen.")
                    .with_local(Declaration::variable("t").with_unit(second()))
                    .with_expr(Expr::equality(&d, 0.5 * &g * Expr::name("t").powi(2))),
            )
            .unwrap();

        let t = fall.local("t").unwrap();
        let names: Vec<&str> = fall.args().iter().map(|q| q.name()).collect();
        assert_eq!(names, vec!["d", "g", "t"]);
        assert_eq!(fall.unit(), &meter());
        assert_eq!(fall.doc(), Some("Distance fallen."));
        assert!(registry.is_variable(t.symbol()));
        assert!(registry.variable("t").is_none());
        assert_eq!(registry.lookup(t.symbol()), Some(t));
    }

    #[test]
    fn test_later_locals_see_earlier_ones() {
        let mut registry = Registry::new();
        let eq = registry
            .register(
                Declaration::equation("e")
                    .with_local(Declaration::variable("a").with_unit(meter()))
                    .with_local(Declaration::variable("b").with_expr(Expr::name("a") * 2.0))
                    .with_expr(Expr::equality(Expr::name("b"), Expr::name("a"))),
            )
            .unwrap();
        assert_eq!(eq.local("b").unwrap().unit(), &meter());
    }

    #[test]
    fn test_undefined_reference_leaves_registry_untouched() {
        let mut registry = Registry::new();
        let err = registry
            .register(
                Declaration::equation("e")
                    .with_local(Declaration::variable("a").with_default(1.0))
                    .with_expr(Expr::equality(Expr::name("a"), Expr::name("missing"))),
            )
            .unwrap_err();
        assert_eq!(err, QuantaError::undefined_reference("missing"));
        assert!(registry.defaults().is_empty());
        assert_eq!(registry.equation_count(), 0);
    }

    #[test]
    fn test_redeclaration_supersedes() {
        let mut registry = Registry::new();
        let old = registry
            .register(Declaration::variable("x").with_unit(meter()).with_default(1.0))
            .unwrap();
        let new = registry
            .register(Declaration::variable("x").with_unit(second()))
            .unwrap();

        assert_ne!(old, new);
        assert_eq!(registry.variable("x"), Some(&new));
        assert_eq!(old.unit(), &meter());
        assert_eq!(registry.get(old.symbol()), Some(&old));
        assert_eq!(registry.variable_count(), 2);
        assert_eq!(
            registry.diagnostics(),
            &[Diagnostic::double_registration(QuantityKind::Variable, "x")]
        );
    }

    #[test]
    fn test_strict_redeclaration_is_fatal() {
        let mut registry = Registry::with_config(RegistryConfig::strict());
        registry.register(Declaration::variable("x")).unwrap();
        let err = registry.register(Declaration::variable("x")).unwrap_err();
        assert_eq!(err, QuantaError::double_registration(QuantityKind::Variable, "x"));
        assert_eq!(registry.variable_count(), 1);
    }

    #[test]
    fn test_duplicate_local_warns() {
        let mut registry = Registry::new();
        let eq = registry
            .register(
                Declaration::equation("e")
                    .with_local(Declaration::variable("a").with_unit(meter()))
                    .with_local(Declaration::variable("a").with_unit(second()))
                    .with_expr(Expr::equality(Expr::name("a"), Expr::name("a"))),
            )
            .unwrap();
        assert_eq!(eq.unit(), &second());
        assert_eq!(eq.locals().len(), 2);
        assert_eq!(registry.diagnostics().len(), 1);

        let mut strict = Registry::with_config(RegistryConfig::strict());
        let err = strict
            .register(
                Declaration::equation("e")
                    .with_local(Declaration::variable("a"))
                    .with_local(Declaration::variable("a"))
                    .with_expr(Expr::equality(Expr::name("a"), Expr::name("a"))),
            )
            .unwrap_err();
        assert_eq!(err.error_code(), "DOUBLE_REGISTRATION");
    }

    #[test]
    fn test_local_equation_is_rejected() {
        let mut registry = Registry::new();
        let err = registry
            .register(
                Declaration::variable("v").with_local(Declaration::equation("inner")),
            )
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DECLARATION");
    }

    #[test]
    fn test_derivative_equation() {
        let mut registry = Registry::new();
        let x = registry
            .register(Declaration::variable("x").with_unit(meter()))
            .unwrap();
        let t = registry
            .register(Declaration::variable("t").with_unit(second()))
            .unwrap();
        let v = registry
            .register(Declaration::variable("v").with_unit(meter() / second()))
            .unwrap();

        registry
            .register(
                Declaration::equation("velocity")
                    .with_expr(Expr::equality(&v, Expr::derivative(&x, &t, 1))),
            )
            .unwrap();
        let err = registry
            .register(
                Declaration::equation("acceleration")
                    .with_expr(Expr::equality(&v, Expr::derivative(&x, &t, 2))),
            )
            .unwrap_err();
        assert!(err.is_unit_error());
    }
}
