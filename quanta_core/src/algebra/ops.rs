//! Arithmetic operators on expressions.
//!
//! Every operator routes through the simplifying constructors of [`Expr`]:
//! `a - b` is `a + (-1)*b` and `a / b` is `a * b**-1`.

use std::ops::{Add, Div, Mul, Neg, Sub};

use super::expr::Expr;

impl<T: Into<Expr>> Add<T> for Expr {
    type Output = Expr;
    fn add(self, rhs: T) -> Expr {
        Expr::sum(vec![self, rhs.into()])
    }
}

impl<T: Into<Expr>> Sub<T> for Expr {
    type Output = Expr;
    fn sub(self, rhs: T) -> Expr {
        let rhs: Expr = rhs.into();
        Expr::sum(vec![self, -rhs])
    }
}

impl<T: Into<Expr>> Mul<T> for Expr {
    type Output = Expr;
    fn mul(self, rhs: T) -> Expr {
        Expr::product(vec![self, rhs.into()])
    }
}

impl<T: Into<Expr>> Div<T> for Expr {
    type Output = Expr;
    fn div(self, rhs: T) -> Expr {
        Expr::product(vec![self, Expr::power(rhs.into(), Expr::Num(-1.0))])
    }
}

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::product(vec![Expr::Num(-1.0), self])
    }
}

// ============================================================================
// Scalar on the left (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_scalar_lhs {
    ($($trait:ident, $method:ident);* $(;)?) => {
        $(
            impl $trait<Expr> for f64 {
                type Output = Expr;
                fn $method(self, rhs: Expr) -> Expr {
                    Expr::Num(self).$method(rhs)
                }
            }
        )*
    };
}

impl_scalar_lhs! {
    Add, add;
    Sub, sub;
    Mul, mul;
    Div, div;
}
