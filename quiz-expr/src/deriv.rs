//! Symbolic differentiation.
//!
//! A derivative is requested by building a `Deriv` node holding the target
//! expression, a specification list of `(variable, order)` pairs, and a list of
//! symbols to treat as constant. The node is transient: for well-formed inputs the
//! rule below reduces it away entirely. Every variable is assumed to depend on the
//! specification variables unless it appears in the constants list; the
//! specification variables themselves are mutually independent.
//!
//! A zero-order entry is deliberately kept during normalization: `(v, 0)` marks `v`
//! as an independent variable, which is different from `v` being absent (absent
//! variables are treated as dependent). For example the derivative of `x*y` with
//! respect to `y` leaves a symbolic `Deriv` factor for `x`, while the same request
//! with an explicit `(x, 0)` entry reduces it to `x`.
//!
//! A request the rules cannot resolve (symbolic orders, unknown function heads)
//! stays symbolic rather than erroring, so it can still be rendered or substituted
//! into.

use crate::error::EvalError;
use crate::eval::Engine;
use crate::expr::{frac, Expr};
use crate::rules::functions::{cos, ln, sin};
use crate::rules::{Rule, RuleTable};

/// Builds an unevaluated `Deriv` node.
pub fn deriv(target: Expr, spec: Vec<(Expr, Expr)>, constants: Vec<Expr>) -> Expr {
    Expr::node("Deriv", vec![target, spec_to_expr(&spec), Expr::List(constants)])
}

fn spec_to_expr(spec: &[(Expr, Expr)]) -> Expr {
    Expr::List(
        spec.iter()
            .map(|(v, n)| Expr::List(vec![v.clone(), n.clone()]))
            .collect(),
    )
}

/// Reads a specification list back out of its expression form. `None` for anything
/// that is not a list of `[variable, order]` pairs.
fn parse_spec(e: &Expr) -> Option<Vec<(Expr, Expr)>> {
    e.as_list()?
        .iter()
        .map(|entry| match entry.as_list() {
            Some([v, n]) => Some((v.clone(), n.clone())),
            _ => None,
        })
        .collect()
}

/// Merges repeated variables by summing their orders, keeping zero-order entries,
/// and validates every numeric order.
fn normalize_spec(
    ngin: &Engine,
    spec: &[(Expr, Expr)],
) -> Result<Vec<(Expr, Expr)>, EvalError> {
    let mut out: Vec<(Expr, Expr)> = Vec::new();
    for (v, n) in spec {
        if !v.is_tag("var") {
            return Err(EvalError::DerivSpecNotVar);
        }
        if n.is_number() {
            match n.as_integer() {
                Some(k) if *k < 0 => return Err(EvalError::DerivOrderNegative),
                Some(_) => {},
                None => return Err(EvalError::DerivOrderFractional),
            }
        }
        match out.iter_mut().find(|(v2, _)| v2 == v) {
            Some((_, n2)) => *n2 = ngin.eval(n.clone() + n2.clone())?,
            None => out.push((v.clone(), n.clone())),
        }
    }
    Ok(out)
}

/// Splits off one first-order derivative: returns `(spec2, Some(v))` such that the
/// input is equivalent to `spec2` followed by `(v, 1)`, choosing the last entry with
/// a positive integer order, or `(spec, None)` if there is none. The chosen entry is
/// left in `spec2` with its order decremented (possibly to zero).
fn split_spec(spec: &[(Expr, Expr)]) -> (Vec<(Expr, Expr)>, Option<Expr>) {
    for i in (0..spec.len()).rev() {
        if let Some(n) = spec[i].1.as_integer() {
            if *n > 0 {
                let mut out = spec.to_vec();
                out[i].1 = Expr::from(n.clone() - 1u32);
                return (out, Some(spec[i].0.clone()));
            }
        }
    }
    (spec.to_vec(), None)
}

/// Looks up a variable's order in the spec. Returns `(spec2, order, present)` with
/// the variable's entry zeroed in `spec2`.
fn spec_for_var(spec: &[(Expr, Expr)], v: &Expr) -> (Vec<(Expr, Expr)>, Expr, bool) {
    for i in 0..spec.len() {
        if spec[i].0 == *v {
            let mut out = spec.to_vec();
            out[i].1 = Expr::from(0);
            return (out, spec[i].1.clone(), true);
        }
    }
    (spec.to_vec(), Expr::from(0), false)
}

/// Zeroes every order, keeping the variables as independence markers.
fn zeroed_spec(spec: &[(Expr, Expr)]) -> Vec<(Expr, Expr)> {
    spec.iter().map(|(v, _)| (v.clone(), Expr::from(0))).collect()
}

fn total_order_is_zero(spec: &[(Expr, Expr)]) -> bool {
    spec.iter()
        .all(|(_, n)| n.as_integer().map_or(false, |k| *k == 0))
}

/// The Jacobian row of a known function head: the partial derivative of the function
/// with respect to each of its arguments, at the argument point.
fn jacobian(tag: &str, args: &[Expr]) -> Option<Vec<Expr>> {
    match (tag, args.len()) {
        ("Pow", 2) => {
            let (a, b) = (args[0].clone(), args[1].clone());
            Some(vec![
                b.clone() * a.clone().pow(b.clone() - Expr::from(1)),
                a.clone().pow(b) * ln(a),
            ])
        },
        ("ln", 1) => Some(vec![frac(1, args[0].clone())]),
        ("cos", 1) => Some(vec![sin(args[0].clone())]),
        ("sin", 1) => Some(vec![-cos(args[0].clone())]),
        _ => None,
    }
}

fn deriv_basic(ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    let e = &args[0];
    let constants = &args[2];
    let Some(spec) = parse_spec(&args[1]) else {
        return Ok(None);
    };
    let Some(const_list) = constants.as_list() else {
        return Ok(None);
    };

    let normalized = normalize_spec(ngin, &spec)?;
    if normalized != spec {
        return Ok(Some(deriv(e.clone(), normalized, const_list.to_vec())));
    }

    if total_order_is_zero(&spec) {
        return Ok(Some(e.clone()));
    }

    let is_const_part = e
        .args_of("Part")
        .map_or(false, |a| a.first().map_or(false, |c| c.is_tag("const")));
    if e.is_number() || e.is_tag("const") || is_const_part {
        let (_, v) = split_spec(&spec);
        return Ok(match v {
            // symbolic orders: not yet decidable
            None => None,
            Some(_) => Some(Expr::from(0)),
        });
    }

    if e.is_tag("var") {
        if const_list.contains(e) {
            return Ok(Some(Expr::from(0)));
        }
        let (spec2, n, present) = spec_for_var(&spec, e);
        return Ok(match n.as_integer() {
            // an independent variable's derivative with respect to another variable
            Some(k) if *k == 0 && present => Some(Expr::from(0)),
            Some(k) if *k > 1 => Some(Expr::from(0)),
            Some(k) if *k == 1 => {
                Some(deriv(Expr::from(1), spec2, const_list.to_vec()))
            },
            _ => None,
        });
    }

    if let Some(inner) = e.args_of("Deriv") {
        // join nested requests with the same constants
        if inner.len() == 3 && inner[2] == *constants {
            if let Some(inner_spec) = parse_spec(&inner[1]) {
                let mut joined = spec.clone();
                joined.extend(inner_spec);
                return Ok(Some(deriv(inner[0].clone(), joined, const_list.to_vec())));
            }
        }
        return Ok(None);
    }

    if let Some(terms) = e.args_of("Plus") {
        let out: Vec<Expr> = terms
            .iter()
            .map(|t| deriv(t.clone(), spec.clone(), const_list.to_vec()))
            .collect();
        return Ok(Some(Expr::node("Plus", out)));
    }

    if let Some(factors) = e.args_of("Times") {
        let (spec2, v) = split_spec(&spec);
        let Some(v) = v else {
            return Ok(None);
        };
        let mut inner_spec = zeroed_spec(&spec);
        inner_spec.push((v, Expr::from(1)));
        let mut sum = Expr::from(0);
        for i in 0..factors.len() {
            let mut product = factors.to_vec();
            product[i] = deriv(factors[i].clone(), inner_spec.clone(), const_list.to_vec());
            sum = sum + Expr::node("Times", product);
        }
        return Ok(Some(deriv(sum, spec2, const_list.to_vec())));
    }

    if let Some(part) = e.args_of("Part") {
        // the index is discrete, so the derivative passes through the container
        let mut out = vec![deriv(part[0].clone(), spec, const_list.to_vec())];
        out.extend(part[1..].iter().cloned());
        return Ok(Some(Expr::node("Part", out)));
    }

    if let (Some(tag), Some((_, fn_args))) = (e.tag(), e.as_node()) {
        if let Some(de) = jacobian(tag, fn_args) {
            let (spec2, v) = split_spec(&spec);
            let Some(v) = v else {
                return Ok(None);
            };
            let mut inner_spec = zeroed_spec(&spec);
            inner_spec.push((v, Expr::from(1)));
            let mut sum = Expr::from(0);
            for (d, a) in de.into_iter().zip(fn_args) {
                let da = deriv(a.clone(), inner_spec.clone(), const_list.to_vec());
                sum = sum + d * da;
            }
            return Ok(Some(deriv(sum, spec2, const_list.to_vec())));
        }
    }

    Ok(None)
}

impl Engine {
    /// The total derivative of `e`, first order in each listed variable in turn.
    pub fn d(&self, e: &Expr, vars: &[Expr]) -> Result<Expr, EvalError> {
        let spec: Vec<(Expr, Expr)> = vars
            .iter()
            .map(|v| (v.clone(), Expr::from(1)))
            .collect();
        self.derivative(e, &spec, &[])
    }

    /// The total derivative of `e` for a full `(variable, order)` specification and
    /// a set of variables to hold constant.
    pub fn derivative(
        &self,
        e: &Expr,
        spec: &[(Expr, Expr)],
        constants: &[Expr],
    ) -> Result<Expr, EvalError> {
        for (v, _) in spec {
            if !v.is_tag("var") {
                return Err(EvalError::DerivSpecNotVar);
            }
        }
        for c in constants {
            if !c.is_tag("var") {
                return Err(EvalError::DerivSpecNotVar);
            }
        }
        self.eval(deriv(e.clone(), spec.to_vec(), constants.to_vec()))
    }
}

pub(crate) fn register(table: &mut RuleTable) {
    table.register("Deriv", Rule {
        name: "deriv_basic",
        min_args: 3,
        max_args: Some(3),
        apply: deriv_basic,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{constant, pow, var};
    use pretty_assertions::assert_eq;

    #[test]
    fn power_rule() {
        let ngin = Engine::new();
        let t = var("t");
        let d = ngin.d(&pow(t.clone(), 2), &[t.clone()]).unwrap();
        assert_eq!(d, ngin.eval(Expr::from(2) * t).unwrap());
    }

    #[test]
    fn constants_differentiate_to_zero() {
        let ngin = Engine::new();
        let t = var("t");
        assert_eq!(ngin.d(&Expr::from(5), &[t.clone()]).unwrap(), Expr::from(0));
        assert_eq!(ngin.d(&constant("c"), &[t.clone()]).unwrap(), Expr::from(0));
    }

    #[test]
    fn declared_constant_variable() {
        let ngin = Engine::new();
        let t = var("t");
        let c = var("c");
        let d = ngin
            .derivative(&c, &[(t.clone(), Expr::from(1))], &[c.clone()])
            .unwrap();
        assert_eq!(d, Expr::from(0));
    }

    #[test]
    fn derivative_of_the_variable_itself() {
        let ngin = Engine::new();
        let t = var("t");
        assert_eq!(ngin.d(&t, &[t.clone()]).unwrap(), Expr::from(1));
        // second derivative is zero
        let d2 = ngin
            .derivative(&t, &[(t.clone(), Expr::from(2))], &[])
            .unwrap();
        assert_eq!(d2, Expr::from(0));
    }

    #[test]
    fn dependent_variable_stays_symbolic() {
        let ngin = Engine::new();
        let t = var("t");
        let x = var("x");
        // x is implicitly a function of t, so dx/dt stays unresolved
        let d = ngin.d(&x, &[t.clone()]).unwrap();
        assert_eq!(d, deriv(x, vec![(t, Expr::from(1))], vec![]));
    }

    #[test]
    fn zero_order_marks_independence() {
        let ngin = Engine::new();
        let x = var("x");
        let y = var("y");
        // D(x*y, (x, 0), y) treats x as independent of y
        let d = ngin
            .derivative(
                &(x.clone() * y.clone()),
                &[(x.clone(), Expr::from(0)), (y.clone(), Expr::from(1))],
                &[],
            )
            .unwrap();
        assert_eq!(d, x);
    }

    #[test]
    fn linearity_over_sums() {
        let ngin = Engine::new();
        let t = var("t");
        let e = pow(t.clone(), 2) + Expr::from(3) * t.clone();
        let d = ngin.d(&e, &[t.clone()]).unwrap();
        let expected = ngin
            .eval(Expr::from(2) * t.clone() + Expr::from(3))
            .unwrap();
        assert_eq!(d, expected);
    }

    #[test]
    fn product_rule_expands() {
        let ngin = Engine::new();
        let t = var("t");
        let f = var("f");
        let g = var("g");
        let d = ngin.d(&(f.clone() * g.clone()), &[t.clone()]).unwrap();
        let df = deriv(f.clone(), vec![(t.clone(), Expr::from(1))], vec![]);
        let dg = deriv(g.clone(), vec![(t.clone(), Expr::from(1))], vec![]);
        let expected = ngin.eval(df * g + f * dg).unwrap();
        assert_eq!(d, expected);
    }

    #[test]
    fn chain_rule_through_ln() {
        let ngin = Engine::new();
        let t = var("t");
        // d/dt ln(t^2) = 2/t
        let d = ngin
            .d(&crate::rules::functions::ln(pow(t.clone(), 2)), &[t.clone()])
            .unwrap();
        let expected = ngin.eval(frac(2, t.clone())).unwrap();
        assert_eq!(d, expected);
    }

    #[test]
    fn negative_order_is_rejected() {
        let ngin = Engine::new();
        let t = var("t");
        assert_eq!(
            ngin.derivative(&t, &[(t.clone(), Expr::from(-1))], &[])
                .unwrap_err(),
            EvalError::DerivOrderNegative,
        );
    }

    #[test]
    fn fractional_order_is_rejected() {
        let ngin = Engine::new();
        let t = var("t");
        let half = Expr::Rational(crate::primitive::rat((1, 2)));
        assert_eq!(
            ngin.derivative(&t, &[(t.clone(), half)], &[]).unwrap_err(),
            EvalError::DerivOrderFractional,
        );
    }

    #[test]
    fn non_variable_spec_is_rejected() {
        let ngin = Engine::new();
        let t = var("t");
        assert_eq!(
            ngin.derivative(&t, &[(Expr::from(3), Expr::from(1))], &[])
                .unwrap_err(),
            EvalError::DerivSpecNotVar,
        );
    }

    #[test]
    fn symbolic_order_stays_unreduced() {
        let ngin = Engine::new();
        let t = var("t");
        let n = var("n");
        let d = ngin
            .derivative(&Expr::from(7), &[(t.clone(), n.clone())], &[])
            .unwrap();
        assert_eq!(d, deriv(Expr::from(7), vec![(t, n)], vec![]));
    }
}
