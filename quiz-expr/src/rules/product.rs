//! Collection of like factors in products.

use crate::error::EvalError;
use crate::eval::Engine;
use crate::expr::{num_mul, Expr};
use crate::rules::{Rule, RuleTable};

/// Splits a multiplicand into a `(base, exponent)` pair.
///
/// - `a^n` -> `(a, n)`
/// - `a` -> `(a, 1)`
fn split_multiplicand(a: &Expr) -> (Expr, Expr) {
    if let Some(args) = a.args_of("Pow") {
        if args.len() == 2 {
            return (args[0].clone(), args[1].clone());
        }
    }
    (a.clone(), Expr::from(1))
}

/// Heads whose expressions read as ordinary scalar values. Factors with other heads
/// (function applications like `sin` or `ln`) are moved to the end of the product so
/// that `x*sin(x)` never renders as `sin(x)*x`.
fn is_scalar_form(a: &Expr) -> bool {
    if a.is_number() {
        return true;
    }
    matches!(a.tag(), Some("var" | "const" | "Plus" | "Times" | "Pow" | "Part"))
}

/// Multiplies out the numeric coefficient and collects the exponents of structurally
/// equal bases.
///
/// `a*a = a^2`, `a^2*a^3 = a^5`, `2*x*3 = 6x`, `0*x = 0`.
fn times_collect(ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    let mut coeff = Expr::from(1);
    let mut factors: Vec<(Expr, Expr)> = Vec::new();
    for a in args {
        if let Some(c) = num_mul(&coeff, a) {
            coeff = c;
            continue;
        }
        let (base, exp) = split_multiplicand(a);
        let mut merged = false;
        for (b, e) in factors.iter_mut() {
            if *b == base {
                *e = ngin.eval(e.clone() + exp.clone())?;
                merged = true;
                break;
            }
        }
        if !merged {
            factors.push((base, exp));
        }
    }

    if coeff.is_zero() {
        return Ok(Some(coeff));
    }

    let mut out = Vec::new();
    for (b, e) in factors {
        let f = ngin.eval(b.pow(e))?;
        if !f.is_one() {
            out.push(f);
        }
    }
    out.sort_by_key(|f| usize::from(!is_scalar_form(f)));

    Ok(Some(if out.is_empty() {
        coeff
    } else if coeff.is_one() {
        if out.len() == 1 {
            out.remove(0)
        } else {
            Expr::node("Times", out)
        }
    } else {
        let mut all = Vec::with_capacity(out.len() + 1);
        all.push(coeff);
        all.extend(out);
        Expr::node("Times", all)
    }))
}

pub(crate) fn register(table: &mut RuleTable) {
    table.register("Times", Rule {
        name: "times_collect",
        min_args: 0,
        max_args: None,
        apply: times_collect,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{frac, var};
    use pretty_assertions::assert_eq;

    #[test]
    fn numeric_product() {
        let ngin = Engine::new();
        assert_eq!(
            ngin.eval(Expr::from(2) * Expr::from(3)).unwrap(),
            Expr::from(6),
        );
    }

    #[test]
    fn repeated_factor_becomes_power() {
        let ngin = Engine::new();
        let x = var("x");
        assert_eq!(
            ngin.eval(x.clone() * x.clone()).unwrap(),
            x.pow(Expr::from(2)),
        );
    }

    #[test]
    fn exponents_add() {
        let ngin = Engine::new();
        let x = var("x");
        let e = x.clone().pow(Expr::from(2)) * x.clone().pow(Expr::from(3));
        assert_eq!(ngin.eval(e).unwrap(), x.pow(Expr::from(5)));
    }

    #[test]
    fn reciprocal_cancels() {
        let ngin = Engine::new();
        let x = var("x");
        assert_eq!(ngin.eval(frac(x.clone(), x)).unwrap(), Expr::from(1));
    }

    #[test]
    fn zero_annihilates() {
        let ngin = Engine::new();
        let x = var("x");
        assert_eq!(ngin.eval(Expr::from(0) * x).unwrap(), Expr::from(0));
    }

    #[test]
    fn coefficients_multiply_across_nesting() {
        let ngin = Engine::new();
        let x = var("x");
        let e = Expr::from(2) * (Expr::from(3) * x.clone());
        assert_eq!(
            ngin.eval(e).unwrap(),
            Expr::node("Times", vec![Expr::from(6), x]),
        );
    }

    #[test]
    fn function_factors_go_last() {
        let ngin = Engine::new();
        let x = var("x");
        let s = Expr::node("sin", vec![x.clone()]);
        let e = ngin.eval(s.clone() * x.clone()).unwrap();
        assert_eq!(e, Expr::node("Times", vec![x, s]));
    }
}
