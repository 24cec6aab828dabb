//! Author-facing declaration records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::algebra::Expr;
use crate::units::Unit;

/// Whether a declaration is a Variable or an Equation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantityKind {
    Variable,
    Equation,
}

impl fmt::Display for QuantityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantityKind::Variable => write!(f, "variable"),
            QuantityKind::Equation => write!(f, "equation"),
        }
    }
}

/// A user-authored Variable or Equation, not yet registered.
///
/// All attributes are optional. A Variable with neither `unit` nor `expr` is a bare
/// placeholder with the dimensionless unit. An Equation must carry an `expr`, and if
/// it is an equality both sides must share a unit. Expressions may refer to registered quantities directly (through
/// `&Quantity` operators) or by name with [`Expr::name`]; names are resolved against
/// the declaration's locals first, then the registered Variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub kind: QuantityKind,
    pub name: String,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub latex_name: Option<String>,
    #[serde(default)]
    pub unit: Option<Unit>,
    #[serde(default)]
    pub default: Option<f64>,
    #[serde(default)]
    pub expr: Option<Expr>,
    /// Nested declarations visible only while building `expr`
    #[serde(default)]
    pub locals: Vec<Declaration>,
}

impl Declaration {
    fn new(kind: QuantityKind, name: impl Into<String>) -> Self {
        Declaration {
            kind,
            name: name.into(),
            doc: None,
            latex_name: None,
            unit: None,
            default: None,
            expr: None,
            locals: Vec::new(),
        }
    }

    /// Start a Variable declaration
    pub fn variable(name: impl Into<String>) -> Self {
        Self::new(QuantityKind::Variable, name)
    }

    /// Start an Equation declaration
    pub fn equation(name: impl Into<String>) -> Self {
        Self::new(QuantityKind::Equation, name)
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// LaTeX used for the symbol column of metadata tables (without `$`)
    pub fn with_latex(mut self, latex: impl Into<String>) -> Self {
        self.latex_name = Some(latex.into());
        self
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn with_default(mut self, default: f64) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_expr(mut self, expr: impl Into<Expr>) -> Self {
        self.expr = Some(expr.into());
        self
    }

    /// Add a local sub-declaration. Later locals may refer to earlier ones.
    pub fn with_local(mut self, local: Declaration) -> Self {
        self.locals.push(local);
        self
    }
}
