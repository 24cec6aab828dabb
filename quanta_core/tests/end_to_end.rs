//! End-to-end registration scenarios against a fresh registry per test.

use std::collections::{HashMap, HashSet};

use quanta_core::units::{joule, kelvin, kilogram, meter, mole, second};
use quanta_core::{
    generate_metadata_table, replace_variables, Declaration, Diagnostic, Expr, QuantaError,
    Quantity, QuantityKind, Registry, Unit,
};

struct Fall {
    registry: Registry,
    g: Quantity,
    d: Quantity,
    fall: Quantity,
}

fn fall_scenario() -> Fall {
    let mut registry = Registry::new();
    let g = registry
        .register(
            Declaration::variable("g")
                .with_doc("Gravitational acceleration.")
                .with_unit(meter() / second().powi(2))
                .with_default(9.8),
        )
        .unwrap();
    let d = registry
        .register(Declaration::variable("d").with_doc("Distance.").with_unit(meter()))
        .unwrap();
    let fall = registry
        .register(
            Declaration::equation("fall")
                .with_doc("Distance fallen after time t.")
                .with_local(Declaration::variable("t").with_unit(second()))
                .with_expr(Expr::equality(
                    &d,
                    Expr::num(1.0) / 2.0 * &g * Expr::name("t").powi(2),
                )),
        )
        .unwrap();
    Fall {
        registry,
        g,
        d,
        fall,
    }
}

#[test]
fn test_fall_evaluates_with_defaults() {
    let Fall { registry, fall, .. } = fall_scenario();
    let t = fall.local("t").unwrap();

    let rhs = registry.replace_defaults(&fall.rhs().unwrap());
    let values = HashMap::from([(t.symbol().clone(), 1.0)]);
    assert_eq!(rhs.evalf(&values).unwrap(), 4.9);
}

#[test]
fn test_replace_defaults_keeps_units() {
    let Fall { registry, d, fall, .. } = fall_scenario();
    let t = fall.local("t").unwrap();

    let replaced = registry.replace_defaults(&fall.to_expr());
    assert_eq!(
        replaced,
        Expr::equality(
            &d,
            4.9 * Expr::unit(meter() / second().powi(2)) * Expr::symbol(t.symbol()).powi(2)
        )
    );

    let rhs = registry.replace_defaults(&fall.rhs().unwrap());
    assert_eq!(registry.derive_unit(&rhs).unwrap(), meter());
}

#[test]
fn test_replace_variables_on_equation() {
    let Fall { registry, g, d, fall } = fall_scenario();
    let t = fall.local("t").unwrap();

    let mapping = HashMap::from([(g.symbol().clone(), Expr::num(9.8))]);
    let replaced = replace_variables(&fall.to_expr(), &mapping);
    assert_eq!(
        replaced,
        Expr::equality(&d, 4.9 * Expr::symbol(t.symbol()).powi(2))
    );

    // Unbound variables stay symbolic, empty mappings change nothing
    assert_eq!(registry.replace_defaults(&d.to_expr()), d.to_expr());
    assert_eq!(replace_variables(&fall.to_expr(), &HashMap::new()), fall.to_expr());
}

#[test]
fn test_extract_variables_sides() {
    let Fall { registry, g, d, fall } = fall_scenario();
    let t = fall.local("t").unwrap();

    let rhs_vars = registry.extract_variables(&fall.rhs().unwrap());
    assert_eq!(
        rhs_vars,
        HashSet::from([g.symbol().clone(), t.symbol().clone()])
    );

    let all_vars = registry.extract_variables(&fall.to_expr());
    assert_eq!(
        all_vars,
        HashSet::from([d.symbol().clone(), g.symbol().clone(), t.symbol().clone()])
    );
}

#[test]
fn test_mismatched_equation_names_both_units() {
    let mut registry = Registry::new();
    let g = registry
        .register(Declaration::variable("g").with_unit(meter() / second().powi(2)))
        .unwrap();
    let x = registry
        .register(Declaration::variable("x").with_unit(meter()))
        .unwrap();

    let err = registry
        .register(Declaration::equation("bad").with_expr(Expr::equality(&g, &x)))
        .unwrap_err();
    assert!(matches!(err, QuantaError::InconsistentUnits { .. }));
    assert_eq!(err.to_string(), "Invalid expression units: meter/second**2 == meter");
    assert!(registry.equation("bad").is_none());
}

#[test]
fn test_double_registration_warns_once() {
    let Fall { mut registry, g, .. } = fall_scenario();

    let g2 = registry
        .register(
            Declaration::variable("g")
                .with_unit(meter() / second().powi(2))
                .with_default(9.81),
        )
        .unwrap();

    assert_eq!(
        registry.diagnostics(),
        &[Diagnostic::double_registration(QuantityKind::Variable, "g")]
    );
    assert_eq!(registry.variable("g"), Some(&g2));
    assert_eq!(g.default(), Some(9.8));
    assert_eq!(g2.default(), Some(9.81));
    assert!(!g.same_definition(&g2));
    assert_eq!(registry.defaults().get(g.symbol()), Some(&9.8));
    assert_eq!(registry.defaults().get(g2.symbol()), Some(&9.81));
}

#[test]
fn test_remove_twice() {
    let mut registry = Registry::new();
    let x = registry
        .register(Declaration::variable("x").with_unit(meter()).with_default(2.0))
        .unwrap();

    let removed = registry.remove(x.symbol()).unwrap();
    assert!(removed.same_definition(&x));
    assert!(registry.variable("x").is_none());
    assert!(registry.defaults().is_empty());
    assert_eq!(
        registry.take_diagnostics(),
        vec![Diagnostic::removal(QuantityKind::Variable, "x")]
    );

    let err = registry.remove(x.symbol()).unwrap_err();
    assert_eq!(err, QuantaError::not_found("x"));
    assert!(registry.diagnostics().is_empty());
}

#[test]
fn test_removing_equation_drops_its_locals() {
    let mut registry = Registry::new();
    let x = registry
        .register(Declaration::variable("x").with_unit(meter()))
        .unwrap();
    let eq = registry
        .register(
            Declaration::equation("e")
                .with_local(Declaration::variable("k").with_default(3.0))
                .with_expr(Expr::equality(&x, Expr::name("k") * &x)),
        )
        .unwrap();
    let k = eq.local("k").unwrap().clone();
    assert_eq!(registry.defaults().get(k.symbol()), Some(&3.0));

    registry.remove(eq.symbol()).unwrap();
    assert!(registry.defaults().is_empty());
    assert!(registry.lookup(k.symbol()).is_none());
    assert_eq!(registry.variable_count(), 1);
}

#[test]
fn test_derive_unit_properties() {
    let mut registry = Registry::new();
    let a = registry
        .register(Declaration::variable("a").with_unit(kilogram()))
        .unwrap();
    let b = registry
        .register(Declaration::variable("b").with_unit(meter() / second()))
        .unwrap();

    let unit_a = registry.derive_unit(&a.to_expr()).unwrap();
    let unit_b = registry.derive_unit(&b.to_expr()).unwrap();
    assert_eq!(registry.derive_unit(&(&a * &b)).unwrap(), &unit_a * &unit_b);
    assert_eq!(registry.derive_unit(&(&a - &a)).unwrap(), unit_a);
    assert_eq!(registry.derive_unit(&(&a / &a)).unwrap(), Unit::one());
    assert_eq!(
        registry.derive_unit(&(&a * b.powi(2))).unwrap(),
        kilogram() * meter().powi(2) / second().powi(2)
    );
}

#[test]
fn test_combined_units() {
    let mut registry = Registry::new();
    let r = registry
        .register(
            Declaration::variable("R_mol")
                .with_unit(joule() / (kelvin() * mole()))
                .with_default(8.314472),
        )
        .unwrap();
    let t = registry
        .register(Declaration::variable("T_a").with_unit(kelvin()))
        .unwrap();
    let n = registry
        .register(Declaration::variable("n").with_unit(mole()))
        .unwrap();
    let energy = registry
        .register(Declaration::variable("E").with_unit(joule()))
        .unwrap();

    registry
        .register(
            Declaration::equation("ideal").with_expr(Expr::equality(&energy, &n * &r * &t)),
        )
        .unwrap();
    assert_eq!(r.unit().to_string(), "joule/(kelvin*mole)");
}

#[test]
fn test_expression_variable_expands() {
    let Fall { mut registry, g, .. } = fall_scenario();
    let double_g = registry
        .register(Declaration::variable("double_g").with_expr(2.0 * &g))
        .unwrap();

    assert!(double_g.unit().is_equivalent(g.unit()));
    let expanded = registry.replace_expressions(&(&double_g * 3.0));
    assert_eq!(expanded, 6.0 * Expr::symbol(g.symbol()));
    let with_defaults = registry.replace_defaults(&expanded);
    assert_eq!(with_defaults.evalf(&HashMap::new()).unwrap(), 6.0 * 9.8);
    assert!(registry.derive_unit(&with_defaults).unwrap().is_equivalent(g.unit()));
}

#[test]
fn test_equation_args_include_locals() {
    let Fall { g, d, fall, .. } = fall_scenario();
    let t = fall.local("t").unwrap();
    assert_eq!(fall.args(), &[d, g, t.clone()]);
    assert_eq!(fall.kind(), QuantityKind::Equation);
    assert_eq!(fall.lhs(), Some(fall.args()[0].to_expr()));
}

#[test]
fn test_metadata_table() {
    let mut registry = Registry::new();
    let e_l = registry
        .register(
            Declaration::variable("E_l")
                .with_doc("Latent heat flux from leaf.")
                .with_unit(joule() / (meter().powi(2) * second())),
        )
        .unwrap();
    let lambda_e = registry
        .register(
            Declaration::variable("lambda_E")
                .with_doc("Latent heat of evaporation.")
                .with_unit(joule() / kilogram())
                .with_default(2.45e6),
        )
        .unwrap();

    let rows = generate_metadata_table(&[lambda_e, e_l]);
    let cells: Vec<[&str; 5]> = rows.iter().map(|row| row.cells()).collect();
    assert_eq!(
        cells,
        vec![
            ["Symbol", "Name", "Description", "Default value", "Units"],
            [
                "$\\lambda_E$",
                "lambda_E",
                "Latent heat of evaporation.",
                "2450000.0",
                "J kg$^{-1}$",
            ],
            [
                "$E_l$",
                "E_l",
                "Latent heat flux from leaf.",
                "-",
                "J m$^{-2}$ s$^{-1}$",
            ],
        ]
    );
}
