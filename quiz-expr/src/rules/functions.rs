//! Elementary functions: constructors and the handful of rewrite rules they carry.
//!
//! `sqrt` and `exp` are notation, not heads; they construct `Pow` nodes directly so
//! that all of the power rules apply to them. `ln`, `sin`, `cos` and `abs` are real
//! heads that mostly stay symbolic, evaluating only at a few special points.

use crate::consts::E;
use crate::error::EvalError;
use crate::eval::Engine;
use crate::expr::{num_abs, Expr};
use crate::primitive::rat;
use crate::rules::{Rule, RuleTable};

/// The square root of an expression, as the power `a^(1/2)`.
pub fn sqrt(a: impl Into<Expr>) -> Expr {
    a.into().pow(Expr::Rational(rat((1, 2))))
}

/// The exponential function, as the power `e^a`.
pub fn exp(a: impl Into<Expr>) -> Expr {
    E.clone().pow(a.into())
}

/// The natural logarithm of an expression.
pub fn ln(a: impl Into<Expr>) -> Expr {
    Expr::node("ln", vec![a.into()])
}

/// The sine of an expression.
pub fn sin(a: impl Into<Expr>) -> Expr {
    Expr::node("sin", vec![a.into()])
}

/// The cosine of an expression.
pub fn cos(a: impl Into<Expr>) -> Expr {
    Expr::node("cos", vec![a.into()])
}

/// The absolute value of an expression.
pub fn abs(a: impl Into<Expr>) -> Expr {
    Expr::node("abs", vec![a.into()])
}

/// `ln 1 = 0`, `ln e = 1`, `ln(e^x) = x`. The logarithm of zero is a hard error
/// rather than a symbolic minus infinity.
fn ln_special(_ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    let a = &args[0];
    if a.is_zero() {
        return Err(EvalError::LogOfZero);
    }
    if a.is_one() {
        return Ok(Some(Expr::from(0)));
    }
    if *a == *E {
        return Ok(Some(Expr::from(1)));
    }
    if let Some(inner) = a.args_of("Pow") {
        if inner.len() == 2 && inner[0] == *E {
            return Ok(Some(inner[1].clone()));
        }
    }
    Ok(None)
}

fn sin_special(_ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    if args[0].is_zero() {
        return Ok(Some(Expr::from(0)));
    }
    Ok(None)
}

fn cos_special(_ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    if args[0].is_zero() {
        return Ok(Some(Expr::from(1)));
    }
    Ok(None)
}

fn abs_literal(_ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    Ok(num_abs(&args[0]))
}

pub(crate) fn register(table: &mut RuleTable) {
    table.register("ln", Rule {
        name: "ln_special",
        min_args: 1,
        max_args: Some(1),
        apply: ln_special,
    });
    table.register("sin", Rule {
        name: "sin_special",
        min_args: 1,
        max_args: Some(1),
        apply: sin_special,
    });
    table.register("cos", Rule {
        name: "cos_special",
        min_args: 1,
        max_args: Some(1),
        apply: cos_special,
    });
    table.register("abs", Rule {
        name: "abs_literal",
        min_args: 1,
        max_args: Some(1),
        apply: abs_literal,
    });
}
