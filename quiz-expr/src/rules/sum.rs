//! Collection of like terms in sums.

use crate::error::EvalError;
use crate::eval::Engine;
use crate::expr::{num_add, Expr};
use crate::rules::{Rule, RuleTable};

/// Splits a summand into a `(coefficient, factor)` pair. Assumes the summand has
/// already been evaluated, so a numeric coefficient, if any, is the first factor.
///
/// - `5` -> `(5, 1)`
/// - `3*a` -> `(3, a)`
/// - `3*a*b` -> `(3, a*b)`
/// - `a` -> `(1, a)`
fn split_summand(a: &Expr) -> (Expr, Expr) {
    if let Some(factors) = a.args_of("Times") {
        if factors.len() >= 2 && factors[0].is_number() {
            let rest = if factors.len() == 2 {
                factors[1].clone()
            } else {
                Expr::node("Times", factors[1..].to_vec())
            };
            return (factors[0].clone(), rest);
        }
    }
    if a.is_number() {
        (a.clone(), Expr::from(1))
    } else {
        (Expr::from(1), a.clone())
    }
}

/// Collects monomials, adding the numeric coefficients of structurally equal factors
/// and dropping zero terms.
///
/// `a+a = 2a`, `2a+3a = 5a`, `x+0 = x`, etc.
fn plus_collect(ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    let mut terms: Vec<(Expr, Expr)> = Vec::new();
    for a in args {
        let (coeff, base) = split_summand(a);
        let mut merged = false;
        for (c, t) in terms.iter_mut() {
            if *t == base {
                if let Some(sum) = num_add(c, &coeff) {
                    *c = sum;
                    merged = true;
                    break;
                }
            }
        }
        if !merged {
            terms.push((coeff, base));
        }
    }

    let mut out = Vec::new();
    for (c, t) in terms {
        let term = ngin.eval(c * t)?;
        if !term.is_zero() {
            out.push(term);
        }
    }

    Ok(Some(if out.is_empty() {
        Expr::from(0)
    } else if out.len() == 1 {
        out.remove(0)
    } else {
        Expr::node("Plus", out)
    }))
}

pub(crate) fn register(table: &mut RuleTable) {
    table.register("Plus", Rule {
        name: "plus_collect",
        min_args: 0,
        max_args: None,
        apply: plus_collect,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::var;
    use pretty_assertions::assert_eq;

    #[test]
    fn numeric_sum() {
        let ngin = Engine::new();
        assert_eq!(
            ngin.eval(Expr::from(2) + Expr::from(3)).unwrap(),
            Expr::from(5),
        );
    }

    #[test]
    fn like_terms_combine() {
        let ngin = Engine::new();
        let x = var("x");
        assert_eq!(
            ngin.eval(x.clone() + x.clone()).unwrap(),
            ngin.eval(Expr::from(2) * x).unwrap(),
        );
    }

    #[test]
    fn cancellation_gives_zero() {
        let ngin = Engine::new();
        let x = var("x");
        assert_eq!(ngin.eval(x.clone() - x).unwrap(), Expr::from(0));
    }

    #[test]
    fn unlike_terms_stay_separate() {
        let ngin = Engine::new();
        let x = var("x");
        let y = var("y");
        let e = ngin.eval(x.clone() + y.clone()).unwrap();
        assert_eq!(e, Expr::node("Plus", vec![x, y]));
    }

    #[test]
    fn exact_fraction_coefficients() {
        let ngin = Engine::new();
        let x = var("x");
        // x/2 + x/2 = x
        let half_x = crate::expr::frac(1, 2) * x.clone();
        let e = ngin.eval(half_x.clone() + half_x).unwrap();
        assert_eq!(e, x);
    }
}
