//! # Registry
//!
//! The service object owning every registered Variable and Equation, plus the
//! shared `defaults` and `expressions` maps that substitution utilities read.
//!
//! Entries are keyed by symbol and kept in declaration order. A name resolves to the
//! most recently registered entry with that name; superseded entries keep their key
//! until they are removed.

use std::collections::HashMap;

use super::declaration::QuantityKind;
use super::definition::Quantity;
use crate::algebra::{Expr, Symbol};
use crate::config::RegistryConfig;
use crate::diagnostics::Diagnostic;
use crate::errors::{QuantaError, QuantaResult};
use crate::units::{Unit, UnitLookup};

// ============================================================================
// Ordered Table
// ============================================================================

/// Quantities of one kind, indexed by symbol and by name.
#[derive(Debug, Clone, Default)]
pub(crate) struct Table {
    entries: HashMap<Symbol, Quantity>,
    by_name: HashMap<String, Symbol>,
    order: Vec<Symbol>,
}

impl Table {
    fn get(&self, symbol: &Symbol) -> Option<&Quantity> {
        self.entries.get(symbol)
    }

    fn by_name(&self, name: &str) -> Option<&Quantity> {
        self.by_name.get(name).and_then(|symbol| self.entries.get(symbol))
    }

    pub(crate) fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    fn insert(&mut self, quantity: Quantity) {
        let symbol = quantity.symbol().clone();
        self.by_name.insert(quantity.name().to_string(), symbol.clone());
        self.order.push(symbol.clone());
        self.entries.insert(symbol, quantity);
    }

    fn remove(&mut self, symbol: &Symbol) -> Option<Quantity> {
        let removed = self.entries.remove(symbol)?;
        self.order.retain(|s| s != symbol);

        // Fall back to the newest remaining entry with the same name
        if self.by_name.get(removed.name()) == Some(symbol) {
            let replacement = self
                .order
                .iter()
                .rev()
                .find(|s| {
                    self.entries
                        .get(*s)
                        .is_some_and(|q| q.name() == removed.name())
                })
                .cloned();
            match replacement {
                Some(previous) => {
                    self.by_name.insert(removed.name().to_string(), previous);
                }
                None => {
                    self.by_name.remove(removed.name());
                }
            }
        }
        Some(removed)
    }

    fn iter(&self) -> impl Iterator<Item = &Quantity> + '_ {
        self.order.iter().filter_map(|symbol| self.entries.get(symbol))
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Registries for Variables and Equations with their shared substitution maps.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    pub(crate) config: RegistryConfig,
    pub(crate) variables: Table,
    pub(crate) equations: Table,
    /// Local sub-quantities of registered entries, reachable by symbol only
    pub(crate) locals: HashMap<Symbol, Quantity>,
    pub(crate) defaults: HashMap<Symbol, f64>,
    pub(crate) expressions: HashMap<Symbol, Expr>,
    diagnostics: Vec<Diagnostic>,
}

impl Registry {
    /// Create an empty registry with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Registry {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The Variable a name currently resolves to
    pub fn variable(&self, name: &str) -> Option<&Quantity> {
        self.variables.by_name(name)
    }

    /// The Equation a name currently resolves to
    pub fn equation(&self, name: &str) -> Option<&Quantity> {
        self.equations.by_name(name)
    }

    /// A top-level entry of either kind by symbol
    pub fn get(&self, symbol: &Symbol) -> Option<&Quantity> {
        self.variables
            .get(symbol)
            .or_else(|| self.equations.get(symbol))
    }

    /// Like [`Registry::get`], but also finds local sub-quantities
    pub fn lookup(&self, symbol: &Symbol) -> Option<&Quantity> {
        self.get(symbol).or_else(|| self.locals.get(symbol))
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.get(symbol).is_some()
    }

    /// True for registered Variables and their local sub-quantities
    pub fn is_variable(&self, symbol: &Symbol) -> bool {
        self.lookup(symbol)
            .is_some_and(|q| q.kind() == QuantityKind::Variable)
    }

    /// Registered Variables in declaration order
    pub fn variables(&self) -> impl Iterator<Item = &Quantity> + '_ {
        self.variables.iter()
    }

    /// Registered Equations in declaration order
    pub fn equations(&self) -> impl Iterator<Item = &Quantity> + '_ {
        self.equations.iter()
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn equation_count(&self) -> usize {
        self.equations.len()
    }

    pub fn defaults(&self) -> &HashMap<Symbol, f64> {
        &self.defaults
    }

    pub fn expressions(&self) -> &HashMap<Symbol, Expr> {
        &self.expressions
    }

    /// Diagnostics recorded so far, oldest first
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drain the recorded diagnostics
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Forget every entry and diagnostic, keeping the configuration
    pub fn clear(&mut self) {
        *self = Registry::with_config(self.config.clone());
    }

    /// Remove a top-level Variable or Equation.
    ///
    /// Its default, its expression alias and all of its local sub-quantities are
    /// dropped as well. Fails with [`QuantaError::NotFound`] if the symbol is not a
    /// registry key.
    pub fn remove(&mut self, symbol: &Symbol) -> QuantaResult<Quantity> {
        let removed = match self.variables.remove(symbol) {
            Some(quantity) => quantity,
            None => self
                .equations
                .remove(symbol)
                .ok_or_else(|| QuantaError::not_found(symbol.name()))?,
        };

        self.forget(&removed);
        self.emit(Diagnostic::removal(removed.kind(), removed.name()));
        Ok(removed)
    }

    fn forget(&mut self, quantity: &Quantity) {
        self.defaults.remove(quantity.symbol());
        self.expressions.remove(quantity.symbol());
        for local in quantity.locals() {
            self.locals.remove(local.symbol());
            self.forget(local);
        }
    }

    /// Make the shared maps see a Variable and its locals
    pub(crate) fn index(&mut self, quantity: &Quantity) {
        for local in quantity.locals() {
            self.locals.insert(local.symbol().clone(), local.clone());
            self.index(local);
        }
        if quantity.kind() != QuantityKind::Variable {
            return;
        }
        let definition = quantity.definition();
        if let Some(default) = definition.default {
            self.defaults.insert(quantity.symbol().clone(), default);
        }
        if let Some(expr) = &definition.expr {
            self.expressions
                .insert(quantity.symbol().clone(), expr.clone());
        }
    }

    pub(crate) fn insert(&mut self, quantity: Quantity) {
        match quantity.kind() {
            QuantityKind::Variable => self.variables.insert(quantity),
            QuantityKind::Equation => self.equations.insert(quantity),
        }
    }

    pub(crate) fn table(&self, kind: QuantityKind) -> &Table {
        match kind {
            QuantityKind::Variable => &self.variables,
            QuantityKind::Equation => &self.equations,
        }
    }

    pub(crate) fn emit(&mut self, diagnostic: Diagnostic) {
        diagnostic.log();
        if self.config.record_diagnostics {
            self.diagnostics.push(diagnostic);
        }
    }
}

impl UnitLookup for Registry {
    fn unit_of(&self, symbol: &Symbol) -> Option<Unit> {
        self.lookup(symbol)
            .filter(|q| q.kind() == QuantityKind::Variable)
            .map(|q| q.unit().clone())
    }
}
