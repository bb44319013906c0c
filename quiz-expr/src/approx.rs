//! Opt-in numeric approximation.
//!
//! Evaluation keeps every number exact; nothing in the engine introduces a float on
//! its own. [`approx`] is the single deliberate escape hatch: it walks a tree and
//! replaces each exact number with its floating approximation, changing nothing else.

use crate::error::EvalError;
use crate::eval::Engine;
use crate::expr::Expr;
use crate::primitive::PRECISION;
use rug::Float;

/// Replaces every exact number in the tree with a float of the working precision.
/// The shape of the tree is untouched; no simplification happens here.
pub fn approx(e: &Expr) -> Expr {
    match e {
        Expr::Integer(n) => Expr::Float(Float::with_val(PRECISION, n)),
        Expr::Rational(r) => Expr::Float(Float::with_val(PRECISION, r)),
        Expr::Float(_) | Expr::Str(_) => e.clone(),
        Expr::List(elts) => Expr::List(elts.iter().map(approx).collect()),
        Expr::Node(head, args) => Expr::Node(
            Box::new(approx(head)),
            args.iter().map(approx).collect(),
        ),
    }
}

impl Engine {
    /// Converts to floats with [`approx`], then evaluates, so that arithmetic the
    /// exact rules left symbolic (like `2^(1/2)`) collapses numerically.
    pub fn n(&self, e: &Expr) -> Result<Expr, EvalError> {
        self.eval(approx(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{frac, pow, var};
    use crate::primitive::rat;
    use pretty_assertions::assert_eq;

    #[test]
    fn exact_leaves_become_floats() {
        let e = approx(&Expr::from(2));
        assert_eq!(e, Expr::Float(Float::with_val(PRECISION, 2)));
        let half = approx(&Expr::Rational(rat((1, 2))));
        assert_eq!(half, Expr::Float(Float::with_val(PRECISION, 0.5)));
    }

    #[test]
    fn tree_shape_is_preserved() {
        let e = pow(var("x"), Expr::from(2)) + Expr::from(1);
        let a = approx(&e);
        assert!(a.is_tag("Plus"));
        // the variable survives untouched
        let args = a.args_of("Plus").unwrap();
        assert_eq!(args[0].args_of("Pow").unwrap()[0], var("x"));
    }

    #[test]
    fn engine_n_collapses_radicals() {
        let ngin = Engine::new();
        let v = ngin.n(&pow(Expr::from(2), frac(1, 2))).unwrap();
        let Expr::Float(f) = v else {
            panic!("expected a float, got {}", v);
        };
        let err = (f.to_f64() - std::f64::consts::SQRT_2).abs();
        assert!(err < 1e-12);
    }
}
