//! Normalization of powers: exact integer and rational powers, radicals in lowest
//! form, powers of the imaginary unit, and `e^ln` collapsing.
//!
//! The radical normal form keeps numbers exact rather than decimal. A power of an
//! exact number with a fractional exponent is split into an exact leading factor and
//! residual radicals whose bases carry no perfect powers, so `sqrt(24) = 2*sqrt(6)`
//! and `(1/2)^(1/2) = (1/2)*sqrt(2)`. Radicals over the same reduced exponent are kept
//! together: `sqrt(6)` stays `6^(1/2)` rather than splitting into `2^(1/2)*3^(1/2)`.

use crate::consts::{E, I};
use crate::error::EvalError;
use crate::eval::Engine;
use crate::expr::{num_is_negative, Expr};
use crate::primitive::{int, PRECISION};
use crate::rules::{Rule, RuleTable};
use rug::ops::Pow;
use rug::{Float, Integer, Rational};
use std::collections::BTreeMap;

/// Factorizes a positive integer by trial division. Quiz-scale numbers only; no
/// attempt is made at anything cleverer than checking 2 and the odd numbers.
fn prime_factorization(n: &Integer) -> BTreeMap<Integer, u32> {
    let mut n = n.clone();
    let mut factors = BTreeMap::new();
    let mut p = int(2);
    while n > 1 {
        if p.clone().square() > n {
            *factors.entry(n.clone()).or_insert(0) += 1;
            break;
        }
        while n.is_divisible(&p) {
            n /= &p;
            *factors.entry(p.clone()).or_insert(0) += 1;
        }
        p += if p == 2 { 1 } else { 2 };
    }
    factors
}

/// Reduces `n^(m/q)` for a positive integer `n` and `0 < m < q` into an exact rational
/// leading factor times residual radicals. The residuals are grouped by their reduced
/// exponent, so perfect-power content is extracted but coprime radicands with the same
/// index stay in one radical.
fn int_radical(n: &Integer, m: u32, q: u32) -> (Rational, Vec<(Integer, Rational)>) {
    let mut lead = Rational::from(1);
    let mut groups: BTreeMap<Rational, Integer> = BTreeMap::new();
    for (p, e) in prime_factorization(n) {
        let total = e * m;
        let whole = total / q;
        let rem = total % q;
        if whole > 0 {
            lead *= p.clone().pow(whole);
        }
        if rem > 0 {
            let exp = Rational::from((rem, q));
            *groups.entry(exp).or_insert_with(|| int(1)) *= p;
        }
    }
    let residual = groups.into_iter().map(|(exp, base)| (base, exp)).collect();
    (lead, residual)
}

/// The radical normal form of `base^r` for a positive exact `base` and a non-integer
/// rational exponent `r`.
///
/// The exponent is split as `r = d + m/q` with `0 < m/q < 1`; `base^d` is exact. For a
/// rational base `s/t` the denominator is rationalized away first, since
/// `(s/t)^(m/q) = (1/t) * s^(m/q) * t^((q-m)/q)` leaves only integer radicands.
/// Returns `None` when the exponent's integer part does not fit machine range.
fn radical_normal_form(base: &Expr, r: &Rational) -> Option<Expr> {
    let (num, den) = match base {
        Expr::Integer(n) => (n.clone(), int(1)),
        Expr::Rational(x) => {
            let (n, d) = x.clone().into_numer_denom();
            (n, d)
        },
        _ => return None,
    };

    let d = r.clone().floor().into_numer_denom().0.to_i32()?;
    let rem = r.clone() - Rational::from(d);
    let (m, q) = {
        let (n, d) = rem.into_numer_denom();
        (n.to_u32()?, d.to_u32()?)
    };

    let mut lead = Rational::from((num.clone(), den.clone())).pow(d);
    let mut residual = Vec::new();

    let (l, mut res) = int_radical(&num, m, q);
    lead *= l;
    residual.append(&mut res);
    if den > 1 {
        lead /= &den;
        let (l, mut res) = int_radical(&den, q - m, q);
        lead *= l;
        residual.append(&mut res);
    }

    let mut factors: Vec<Expr> = residual
        .into_iter()
        .map(|(b, e)| Expr::from(b).pow(Expr::from(e)))
        .collect();
    Some(if factors.is_empty() {
        Expr::from(lead)
    } else if lead == 1 && factors.len() == 1 {
        factors.remove(0)
    } else {
        let mut all = Vec::with_capacity(factors.len() + 1);
        if lead != 1 {
            all.push(Expr::from(lead));
        }
        all.append(&mut factors);
        if all.len() == 1 {
            all.remove(0)
        } else {
            Expr::node("Times", all)
        }
    })
}

fn to_float(a: &Expr) -> Option<Float> {
    Some(match a {
        Expr::Integer(n) => Float::with_val(PRECISION, n),
        Expr::Rational(r) => Float::with_val(PRECISION, r),
        Expr::Float(f) => f.clone(),
        _ => return None,
    })
}

/// Evaluates powers of numeric leaves. Exact bases with integer exponents stay exact;
/// exact bases with rational exponents go to radical normal form; anything touching a
/// float becomes a float. A negative exact base with a fractional exponent factors
/// through the imaginary unit: `a^r = |a|^r * i^(2r)`.
fn pow_constants(_ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    let (a, b) = (&args[0], &args[1]);

    // x^0 = 1 and x^1 = x hold for symbolic bases too
    if b.is_zero() {
        return Ok(Some(Expr::from(1)));
    }
    if b.is_one() {
        return Ok(Some(a.clone()));
    }
    if !a.is_number() || !b.is_number() {
        return Ok(None);
    }
    if a.is_one() {
        return Ok(Some(Expr::from(1)));
    }
    if a.is_zero() {
        if num_is_negative(b) {
            return Err(EvalError::DivisionByZero);
        }
        return Ok(Some(Expr::from(0)));
    }

    match (a, b) {
        (Expr::Integer(_) | Expr::Rational(_), Expr::Integer(n)) => {
            let Some(n) = n.to_i32() else {
                return Ok(None);
            };
            let base = match a {
                Expr::Integer(x) => Rational::from(x),
                Expr::Rational(x) => x.clone(),
                _ => unreachable!(),
            };
            Ok(Some(Expr::from(base.pow(n))))
        },
        (Expr::Integer(_) | Expr::Rational(_), Expr::Rational(r)) => {
            if num_is_negative(a) {
                // a^r = |a|^r * i^(2r)
                let mag = match a {
                    Expr::Integer(x) => Expr::from(Integer::from(x.abs_ref())),
                    Expr::Rational(x) => Expr::from(Rational::from(x.abs_ref())),
                    _ => unreachable!(),
                };
                let twice = Expr::from(r.clone() * Rational::from(2));
                return Ok(Some(mag.pow(b.clone()) * I.clone().pow(twice)));
            }
            Ok(radical_normal_form(a, r))
        },
        _ => {
            // at least one float
            let (Some(x), Some(y)) = (to_float(a), to_float(b)) else {
                return Ok(None);
            };
            if x.is_sign_negative() && !y.is_integer() {
                return Ok(None);
            }
            Ok(Some(Expr::Float(x.pow(y))))
        },
    }
}

/// `(a^b)^c = a^(b*c)`.
fn pow_pow(_ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    let Some(inner) = args[0].args_of("Pow") else {
        return Ok(None);
    };
    if inner.len() != 2 {
        return Ok(None);
    }
    Ok(Some(
        inner[0].clone().pow(inner[1].clone() * args[1].clone()),
    ))
}

/// `e^(ln x) = x` and `e^(c * ln x) = x^c`.
fn exp_ln(_ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    if args[0] != *E {
        return Ok(None);
    }
    if let Some(inner) = args[1].args_of("ln") {
        if inner.len() == 1 {
            return Ok(Some(inner[0].clone()));
        }
    }
    if let Some(factors) = args[1].args_of("Times") {
        let logs: Vec<usize> = factors
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_tag("ln"))
            .map(|(i, _)| i)
            .collect();
        if let [i] = logs[..] {
            if let Some(inner) = factors[i].args_of("ln") {
                if inner.len() == 1 {
                    let rest: Vec<Expr> = factors
                        .iter()
                        .enumerate()
                        .filter(|(j, _)| *j != i)
                        .map(|(_, f)| f.clone())
                        .collect();
                    let exp = if rest.len() == 1 {
                        rest.into_iter().next().unwrap_or(Expr::from(1))
                    } else {
                        Expr::node("Times", rest)
                    };
                    return Ok(Some(inner[0].clone().pow(exp)));
                }
            }
        }
    }
    Ok(None)
}

/// Integer powers of the imaginary unit cycle with period four.
fn i_pow(_ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    if args[0] != *I {
        return Ok(None);
    }
    let Some(n) = args[1].as_integer() else {
        return Ok(None);
    };
    Ok(Some(match n.mod_u(4) {
        0 => Expr::from(1),
        1 => I.clone(),
        2 => Expr::from(-1),
        _ => Expr::from(-1) * I.clone(),
    }))
}

pub(crate) fn register(table: &mut RuleTable) {
    table.register("Pow", Rule {
        name: "pow_constants",
        min_args: 2,
        max_args: Some(2),
        apply: pow_constants,
    });
    table.register("Pow", Rule {
        name: "pow_pow",
        min_args: 2,
        max_args: Some(2),
        apply: pow_pow,
    });
    table.register("Pow", Rule {
        name: "exp_ln",
        min_args: 2,
        max_args: Some(2),
        apply: exp_ln,
    });
    table.register("Pow", Rule {
        name: "i_pow",
        min_args: 2,
        max_args: Some(2),
        apply: i_pow,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{frac, pow, var};
    use crate::primitive::rat;
    use pretty_assertions::assert_eq;

    fn sqrt_of(n: i32) -> Expr {
        Expr::from(n).pow(Expr::Rational(rat((1, 2))))
    }

    #[test]
    fn integer_powers_are_exact() {
        let ngin = Engine::new();
        assert_eq!(ngin.eval(pow(2, 10)).unwrap(), Expr::from(1024));
        assert_eq!(
            ngin.eval(pow(2, -3)).unwrap(),
            Expr::Rational(rat((1, 8))),
        );
    }

    #[test]
    fn zero_and_one_exponents() {
        let ngin = Engine::new();
        let x = var("x");
        assert_eq!(ngin.eval(pow(x.clone(), 0)).unwrap(), Expr::from(1));
        assert_eq!(ngin.eval(pow(x.clone(), 1)).unwrap(), x);
    }

    #[test]
    fn zero_to_negative_power_fails() {
        let ngin = Engine::new();
        assert_eq!(
            ngin.eval(pow(0, -2)).unwrap_err(),
            EvalError::DivisionByZero,
        );
    }

    #[test]
    fn perfect_square_roots_collapse() {
        let ngin = Engine::new();
        let e = Expr::from(4).pow(Expr::Rational(rat((1, 2))));
        assert_eq!(ngin.eval(e).unwrap(), Expr::from(2));
    }

    #[test]
    fn radical_extracts_square_content() {
        let ngin = Engine::new();
        // sqrt(24) = 2*sqrt(6)
        let e = Expr::from(24).pow(Expr::Rational(rat((1, 2))));
        assert_eq!(
            ngin.eval(e).unwrap(),
            Expr::node("Times", vec![Expr::from(2), sqrt_of(6)]),
        );
    }

    #[test]
    fn coprime_radicands_stay_together() {
        let ngin = Engine::new();
        let e = sqrt_of(6);
        assert_eq!(ngin.eval(e.clone()).unwrap(), e);
    }

    #[test]
    fn rational_base_rationalizes() {
        let ngin = Engine::new();
        // (1/2)^(1/2) = (1/2)*sqrt(2)
        let e = Expr::Rational(rat((1, 2))).pow(Expr::Rational(rat((1, 2))));
        assert_eq!(
            ngin.eval(e).unwrap(),
            Expr::node(
                "Times",
                vec![Expr::Rational(rat((1, 2))), sqrt_of(2)],
            ),
        );
    }

    #[test]
    fn negative_base_factors_through_i() {
        let ngin = Engine::new();
        // (-4)^(1/2) = 2i
        let e = Expr::from(-4).pow(Expr::Rational(rat((1, 2))));
        assert_eq!(
            ngin.eval(e).unwrap(),
            Expr::node("Times", vec![Expr::from(2), I.clone()]),
        );
    }

    #[test]
    fn i_cycles_mod_four() {
        let ngin = Engine::new();
        assert_eq!(ngin.eval(I.clone().pow(Expr::from(2))).unwrap(), Expr::from(-1));
        assert_eq!(ngin.eval(I.clone().pow(Expr::from(4))).unwrap(), Expr::from(1));
        assert_eq!(
            ngin.eval(I.clone().pow(Expr::from(7))).unwrap(),
            Expr::node("Times", vec![Expr::from(-1), I.clone()]),
        );
        assert_eq!(ngin.eval(I.clone().pow(Expr::from(-1))).unwrap(),
            Expr::node("Times", vec![Expr::from(-1), I.clone()]));
    }

    #[test]
    fn nested_power_flattens() {
        let ngin = Engine::new();
        let x = var("x");
        let e = pow(pow(x.clone(), 2), 3);
        assert_eq!(ngin.eval(e).unwrap(), x.pow(Expr::from(6)));
    }

    #[test]
    fn exp_of_log_collapses() {
        let ngin = Engine::new();
        let x = var("x");
        let e = E.clone().pow(Expr::node("ln", vec![x.clone()]));
        assert_eq!(ngin.eval(e).unwrap(), x);
    }

    #[test]
    fn division_of_integers_stays_exact() {
        let ngin = Engine::new();
        assert_eq!(
            ngin.eval(frac(1, 3)).unwrap(),
            Expr::Rational(rat((1, 3))),
        );
    }
}
