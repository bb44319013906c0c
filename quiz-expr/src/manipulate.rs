//! Tree manipulation: substitution, expansion, and polynomial collection.

use crate::error::EvalError;
use crate::eval::Engine;
use crate::expr::Expr;

/// The distinct variables occurring in an expression, in first-appearance order.
pub fn free_variables(e: &Expr) -> Vec<Expr> {
    fn walk(e: &Expr, out: &mut Vec<Expr>) {
        if e.is_tag("var") {
            if !out.contains(e) {
                out.push(e.clone());
            }
            return;
        }
        match e {
            Expr::Node(head, args) => {
                walk(head, out);
                for a in args {
                    walk(a, out);
                }
            },
            Expr::List(elts) => {
                for x in elts {
                    walk(x, out);
                }
            },
            _ => {},
        }
    }
    let mut out = Vec::new();
    walk(e, &mut out);
    out
}

/// A sparse polynomial over a fixed variable list: monomials keyed by one exponent
/// per variable, compared structurally so symbolic and negative exponents work.
struct Poly {
    terms: Vec<(Vec<Expr>, Expr)>,
}

impl Poly {
    fn constant(n: usize, coeff: Expr) -> Poly {
        Poly { terms: vec![(vec![Expr::from(0); n], coeff)] }
    }

    fn variable(n: usize, i: usize) -> Poly {
        let mut exps = vec![Expr::from(0); n];
        exps[i] = Expr::from(1);
        Poly { terms: vec![(exps, Expr::from(1))] }
    }

    fn monomial(n: usize, i: usize, exp: Expr) -> Poly {
        let mut exps = vec![Expr::from(0); n];
        exps[i] = exp;
        Poly { terms: vec![(exps, Expr::from(1))] }
    }

    fn add_term(
        &mut self,
        ngin: &Engine,
        exps: Vec<Expr>,
        coeff: Expr,
    ) -> Result<(), EvalError> {
        match self.terms.iter_mut().find(|(e, _)| *e == exps) {
            Some((_, c)) => *c = ngin.eval(c.clone() + coeff)?,
            None => self.terms.push((exps, coeff)),
        }
        Ok(())
    }

    fn add(mut self, ngin: &Engine, other: Poly) -> Result<Poly, EvalError> {
        for (exps, coeff) in other.terms {
            self.add_term(ngin, exps, coeff)?;
        }
        Ok(self)
    }

    fn mul(self, ngin: &Engine, other: &Poly) -> Result<Poly, EvalError> {
        let n = self.terms.first().map_or(0, |(e, _)| e.len());
        let mut out = Poly { terms: Vec::new() };
        for (e1, c1) in &self.terms {
            for (e2, c2) in &other.terms {
                let mut exps = Vec::with_capacity(n);
                for (a, b) in e1.iter().zip(e2) {
                    exps.push(ngin.eval(a.clone() + b.clone())?);
                }
                let coeff = ngin.eval(c1.clone() * c2.clone())?;
                out.add_term(ngin, exps, coeff)?;
            }
        }
        Ok(out)
    }
}

impl Engine {
    /// Substitutes pattern/value pairs throughout an expression. At each subtree the
    /// pairs are tried in order; a structurally equal pattern is replaced outright,
    /// with no rewriting inside the replacement. Otherwise the head and every
    /// argument are substituted recursively and the result re-evaluated.
    pub fn replace(&self, e: &Expr, repls: &[(Expr, Expr)]) -> Result<Expr, EvalError> {
        for (pattern, value) in repls {
            if e == pattern {
                return Ok(value.clone());
            }
        }
        match e {
            Expr::Node(head, args) => {
                let head = self.replace(head, repls)?;
                let args = args
                    .iter()
                    .map(|a| self.replace(a, repls))
                    .collect::<Result<Vec<_>, _>>()?;
                self.eval(Expr::Node(Box::new(head), args))
            },
            Expr::List(elts) => Ok(Expr::List(
                elts.iter()
                    .map(|x| self.replace(x, repls))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            _ => Ok(e.clone()),
        }
    }

    /// Fully distributes products over sums, everywhere in the expression.
    ///
    /// A product with a sum among its factors is expanded one distribution at a
    /// time, re-expanding each term; an integer power (other than `-1`) of a sum is
    /// expanded by peeling one factor off the exponent.
    pub fn expand(&self, e: &Expr) -> Result<Expr, EvalError> {
        let (head, args) = match e {
            Expr::List(elts) => {
                return Ok(Expr::List(
                    elts.iter()
                        .map(|x| self.expand(x))
                        .collect::<Result<Vec<_>, _>>()?,
                ));
            },
            Expr::Node(head, args) => (head, args),
            _ => return Ok(e.clone()),
        };

        let args = args
            .iter()
            .map(|a| self.expand(a))
            .collect::<Result<Vec<_>, _>>()?;

        if e.is_tag("Times") {
            if let Some(i) = args.iter().position(|a| a.is_tag("Plus")) {
                let rest: Vec<Expr> = args
                    .iter()
                    .enumerate()
                    .filter(|(k, _)| *k != i)
                    .map(|(_, a)| a.clone())
                    .collect();
                let rest = self.expand(&self.eval(Expr::node("Times", rest))?)?;
                let mut val = Expr::from(0);
                if let Some(terms) = args[i].args_of("Plus") {
                    for b in terms {
                        val = val + self.expand(&(b.clone() * rest.clone()))?;
                    }
                }
                return self.eval(val);
            }
        }

        if e.is_tag("Pow") && args.len() == 2 {
            let exponent = args[1].as_integer().cloned();
            if let (Some(n), Some(terms)) = (exponent, args[0].args_of("Plus")) {
                if n != -1 {
                    let step = if n > 0 { -1 } else { 1 };
                    let peeled = args[0].clone().pow(Expr::from(n + step));
                    let rest = self.expand(&self.eval(peeled)?)?;
                    let terms = terms.to_vec();
                    let mut val = Expr::from(0);
                    for b in terms {
                        val = val + self.expand(&(b * rest.clone()))?;
                    }
                    return self.eval(val);
                }
            }
        }

        self.eval(Expr::Node(Box::new((**head).clone()), args))
    }

    /// Collects an expression as a polynomial in the given variables, merging like
    /// monomials. With an empty variable list, every free variable is used.
    pub fn collect(&self, e: &Expr, vars: &[Expr]) -> Result<Expr, EvalError> {
        self.collect_with(e, vars, |_, c| Ok(c.clone()))
    }

    /// [`collect`](Engine::collect) with a simplifier applied to each coefficient
    /// before reassembly.
    pub fn collect_with<F>(&self, e: &Expr, vars: &[Expr], simplify: F) -> Result<Expr, EvalError>
    where
        F: Fn(&Engine, &Expr) -> Result<Expr, EvalError>,
    {
        let discovered;
        let vars = if vars.is_empty() {
            discovered = free_variables(e);
            &discovered[..]
        } else {
            vars
        };

        let expanded = self.expand(e)?;
        let poly = self.to_poly(&expanded, vars)?;

        let mut terms = Vec::with_capacity(poly.terms.len());
        for (exps, coeff) in poly.terms {
            let coeff = simplify(self, &coeff)?;
            if coeff.is_zero() {
                continue;
            }
            let mut factors = vec![coeff];
            for (v, n) in vars.iter().zip(exps) {
                if !n.is_zero() {
                    factors.push(v.clone().pow(n));
                }
            }
            terms.push(self.eval(Expr::node("Times", factors))?);
        }
        self.eval(Expr::node("Plus", terms))
    }

    fn to_poly(&self, e: &Expr, vars: &[Expr]) -> Result<Poly, EvalError> {
        let n = vars.len();
        if let Some(i) = vars.iter().position(|v| v == e) {
            return Ok(Poly::variable(n, i));
        }
        if let Some(terms) = e.args_of("Plus") {
            let mut out = Poly { terms: Vec::new() };
            for t in terms {
                out = out.add(self, self.to_poly(t, vars)?)?;
            }
            return Ok(out);
        }
        if let Some(factors) = e.args_of("Times") {
            let mut out = Poly::constant(n, Expr::from(1));
            for f in factors {
                let p = self.to_poly(f, vars)?;
                out = out.mul(self, &p)?;
            }
            return Ok(out);
        }
        if let Some(pow_args) = e.args_of("Pow") {
            if pow_args.len() == 2 {
                if let Some(i) = vars.iter().position(|v| *v == pow_args[0]) {
                    return Ok(Poly::monomial(n, i, pow_args[1].clone()));
                }
            }
        }
        // everything else, including numbers, is part of the coefficient
        Ok(Poly::constant(n, e.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{frac, pow, var};
    use pretty_assertions::assert_eq;

    #[test]
    fn substitution_re_evaluates() {
        let ngin = Engine::new();
        let x = var("x");
        let y = var("y");
        let e = ngin.eval(pow(x.clone(), 2) + y.clone()).unwrap();
        let r = ngin.replace(&e, &[(x, Expr::from(2))]).unwrap();
        assert_eq!(r, ngin.eval(Expr::from(4) + y).unwrap());
    }

    #[test]
    fn substitution_is_simultaneous_per_subtree() {
        let ngin = Engine::new();
        let a = var("a");
        let b = var("b");
        // a -> b while b -> 3: the replacement value is not rewritten again
        let r = ngin
            .replace(&(a.clone() + b.clone()), &[(a, b.clone()), (b.clone(), Expr::from(3))])
            .unwrap();
        assert_eq!(r, ngin.eval(b + Expr::from(3)).unwrap());
    }

    #[test]
    fn expand_square_of_sum() {
        let ngin = Engine::new();
        let x = var("x");
        let e = pow(x.clone() + Expr::from(1), 2);
        let expected = ngin
            .eval(
                pow(x.clone(), 2) + Expr::from(2) * x.clone() + Expr::from(1),
            )
            .unwrap();
        assert_eq!(ngin.expand(&e).unwrap(), expected);
    }

    #[test]
    fn expand_distributes_products() {
        let ngin = Engine::new();
        let x = var("x");
        let e = (x.clone() + Expr::from(1)) * (x.clone() + Expr::from(2));
        let expected = ngin
            .eval(pow(x.clone(), 2) + Expr::from(3) * x.clone() + Expr::from(2))
            .unwrap();
        assert_eq!(ngin.expand(&e).unwrap(), expected);
    }

    #[test]
    fn expand_leaves_reciprocals_alone() {
        let ngin = Engine::new();
        let x = var("x");
        let e = ngin.eval(frac(1, x.clone() + Expr::from(1))).unwrap();
        assert_eq!(ngin.expand(&e).unwrap(), e);
    }

    #[test]
    fn collect_merges_like_monomials() {
        let ngin = Engine::new();
        let x = var("x");
        let y = var("y");
        // x*y + 2*y*x collects to 3*x*y
        let e = x.clone() * y.clone() + Expr::from(2) * y.clone() * x.clone();
        let c = ngin.collect(&e, &[x.clone(), y.clone()]).unwrap();
        assert_eq!(c, ngin.eval(Expr::from(3) * x * y).unwrap());
    }

    #[test]
    fn collect_defaults_to_free_variables() {
        let ngin = Engine::new();
        let x = var("x");
        let e = x.clone() * x.clone() + x.clone();
        let c = ngin.collect(&e, &[]).unwrap();
        // monomials come out in first-appearance order
        assert_eq!(c, ngin.eval(pow(x.clone(), 2) + x).unwrap());
    }

    #[test]
    fn collect_supports_negative_exponents() {
        let ngin = Engine::new();
        let x = var("x");
        let e = frac(1, x.clone()) + frac(2, x.clone());
        let c = ngin.collect(&e, &[x.clone()]).unwrap();
        assert_eq!(c, ngin.eval(Expr::from(3) * pow(x, -1)).unwrap());
    }

    #[test]
    fn collect_applies_coefficient_simplifier() {
        let ngin = Engine::new();
        let x = var("x");
        let y = var("y");
        // the simplifier sees each coefficient; here it zeroes out y
        let e = y.clone() * x.clone() + x.clone();
        let c = ngin
            .collect_with(&e, &[x.clone()], |ngin, coeff| {
                ngin.replace(coeff, &[(y.clone(), Expr::from(0))])
            })
            .unwrap();
        assert_eq!(c, x);
    }

    #[test]
    fn free_variable_discovery_is_ordered() {
        let x = var("x");
        let y = var("y");
        let e = x.clone() * y.clone() + x.clone();
        assert_eq!(free_variables(&e), vec![x, y]);
    }
}
