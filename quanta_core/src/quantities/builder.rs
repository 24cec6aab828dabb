//! Expression building: resolving names against local and global scope.

use super::declaration::QuantityKind;
use super::definition::Quantity;
use super::registry::Registry;
use crate::algebra::{Expr, Symbol};
use crate::errors::{QuantaError, QuantaResult};
use crate::units::{Unit, UnitLookup};

/// Name resolution scope for one declaration body.
///
/// Locals are searched innermost first, then the registered Variables.
pub(crate) struct Scope<'a> {
    registry: &'a Registry,
    parent: Option<&'a Scope<'a>>,
    entries: Vec<Quantity>,
}

impl<'a> Scope<'a> {
    pub(crate) fn root(registry: &'a Registry) -> Self {
        Scope {
            registry,
            parent: None,
            entries: Vec::new(),
        }
    }

    pub(crate) fn child(&self) -> Scope<'_> {
        Scope {
            registry: self.registry,
            parent: Some(self),
            entries: Vec::new(),
        }
    }

    /// Add a local. Returns true if it shadows an earlier local of this scope.
    pub(crate) fn declare(&mut self, quantity: Quantity) -> bool {
        let shadowed = self.entries.iter().any(|q| q.name() == quantity.name());
        self.entries.push(quantity);
        shadowed
    }

    /// The quantity a name refers to
    pub(crate) fn resolve(&self, name: &str) -> Option<Quantity> {
        self.entries
            .iter()
            .rev()
            .find(|q| q.name() == name)
            .cloned()
            .or_else(|| match self.parent {
                Some(parent) => parent.resolve(name),
                None => self.registry.variable(name).cloned(),
            })
    }

    /// The quantity a symbol belongs to, local or registered
    pub(crate) fn quantity(&self, symbol: &Symbol) -> Option<Quantity> {
        self.entries
            .iter()
            .find(|q| q.symbol() == symbol)
            .cloned()
            .or_else(|| match self.parent {
                Some(parent) => parent.quantity(symbol),
                None => self.registry.lookup(symbol).cloned(),
            })
    }

    pub(crate) fn into_entries(self) -> Vec<Quantity> {
        self.entries
    }
}

impl UnitLookup for Scope<'_> {
    fn unit_of(&self, symbol: &Symbol) -> Option<Unit> {
        self.quantity(symbol)
            .filter(|q| q.kind() == QuantityKind::Variable)
            .map(|q| q.unit().clone())
    }
}

/// Replace every name in `expr` by the symbol it resolves to.
///
/// The tree is rebuilt node for node without re-simplifying, so the algebraic
/// structure is preserved and building an already resolved expression is a no-op.
pub(crate) fn build_expression(expr: &Expr, scope: &Scope<'_>) -> QuantaResult<Expr> {
    Ok(match expr {
        Expr::Name(name) => scope
            .resolve(name)
            .map(|q| Expr::symbol(q.symbol()))
            .ok_or_else(|| QuantaError::undefined_reference(name.as_str()))?,
        Expr::Num(_) | Expr::Unit(_) | Expr::Symbol(_) => expr.clone(),
        Expr::Add(terms) => Expr::Add(build_all(terms, scope)?),
        Expr::Mul(factors) => Expr::Mul(build_all(factors, scope)?),
        Expr::Pow(base, exponent) => Expr::Pow(boxed(base, scope)?, boxed(exponent, scope)?),
        Expr::Equality(lhs, rhs) => Expr::Equality(boxed(lhs, scope)?, boxed(rhs, scope)?),
        Expr::Derivative {
            expr: inner,
            variable,
            order,
        } => Expr::Derivative {
            expr: boxed(inner, scope)?,
            variable: boxed(variable, scope)?,
            order: *order,
        },
        Expr::Integral {
            integrand,
            variable,
        } => Expr::Integral {
            integrand: boxed(integrand, scope)?,
            variable: boxed(variable, scope)?,
        },
    })
}

fn boxed(expr: &Expr, scope: &Scope<'_>) -> QuantaResult<Box<Expr>> {
    build_expression(expr, scope).map(Box::new)
}

fn build_all(items: &[Expr], scope: &Scope<'_>) -> QuantaResult<Vec<Expr>> {
    items.iter().map(|item| build_expression(item, scope)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantities::Declaration;
    use crate::units::{meter, second};

    #[test]
    fn test_locals_shadow_globals() {
        let mut registry = Registry::new();
        let global = registry
            .register(Declaration::variable("x").with_unit(meter()))
            .unwrap();
        let local = registry
            .register(Declaration::variable("x").with_unit(second()))
            .unwrap();
        registry.remove(local.symbol()).unwrap();

        let root = Scope::root(&registry);
        assert_eq!(root.resolve("x"), Some(global.clone()));

        let mut inner = root.child();
        assert!(!inner.declare(local.clone()));
        assert_eq!(inner.resolve("x"), Some(local.clone()));
        assert_eq!(inner.unit_of(local.symbol()), Some(second()));
        assert_eq!(inner.unit_of(global.symbol()), Some(meter()));
    }

    #[test]
    fn test_build_replaces_names_and_keeps_structure() {
        let mut registry = Registry::new();
        let g = registry
            .register(Declaration::variable("g").with_unit(meter()))
            .unwrap();

        let scope = Scope::root(&registry);
        let raw = Expr::Mul(vec![Expr::Num(1.0), Expr::name("g")]);
        let built = build_expression(&raw, &scope).unwrap();
        assert_eq!(built, Expr::Mul(vec![Expr::Num(1.0), Expr::symbol(g.symbol())]));
        assert_eq!(build_expression(&built, &scope).unwrap(), built);
    }

    #[test]
    fn test_unknown_name_is_undefined_reference() {
        let registry = Registry::new();
        let scope = Scope::root(&registry);
        let err = build_expression(&(Expr::name("nope") * 2.0), &scope).unwrap_err();
        assert_eq!(err, QuantaError::undefined_reference("nope"));
    }
}
