//! The fixed-point evaluator.
//!
//! [`Engine::eval`] puts an expression into a canonical normal form by applying every
//! registered rule until the expression no longer changes. The function is idempotent:
//! `eval(eval(e)) == eval(e)`.
//!
//! It is not a general simplifier; it collects coefficients and exponents in linear
//! combinations and monomials, performs exact numeric arithmetic, and applies whatever
//! rules the other modules registered for a head. Evaluation proceeds post-order:
//!
//! * Numeric and text leaves evaluate to themselves; lists evaluate element-wise.
//! * For a compound node, the head and every argument are evaluated first.
//! * If the head carries the flattening attribute (`Plus`, `Times`), arguments with the
//!   same head are spliced into the parent's argument list.
//! * If the head is a text tag, its rules are tried most-recently-registered first. A
//!   rule either does not apply, or returns a candidate; if the candidate is
//!   structurally different from the node, evaluation restarts from the top on the
//!   candidate, since a rewrite may change the head itself or require re-flattening.
//! * If no rule changes the node, it is final.
//!
//! The restart loop carries a fixed iteration budget. A pair of rules that rewrite into
//! each other would otherwise diverge silently; with the budget, such a bug surfaces as
//! [`EvalError::Diverged`].

use crate::error::EvalError;
use crate::expr::Expr;
use crate::rules::RuleTable;
use crate::{deriv, matrix, rules};

/// The maximum number of top-level rewrites in a single [`Engine::eval`] call.
const REWRITE_BUDGET: usize = 10_000;

/// The evaluator: a rule table plus the fixed-point reduction loop.
///
/// Constructing an [`Engine`] registers every rule in the crate (arithmetic
/// normalization, matrix algebra and symbolic differentiation) in a well-defined
/// order. The engine is immutable after construction and holds no interior mutability,
/// so sharing one between threads is safe.
#[derive(Debug)]
pub struct Engine {
    table: RuleTable,
}

impl Engine {
    /// Creates an engine with the full rule set registered.
    pub fn new() -> Self {
        let mut table = RuleTable::default();
        table.mark_flat("Plus");
        table.mark_flat("Times");

        // registration order matters: rules registered later are tried first, so the
        // matrix rules refine `Plus`/`Times`/`Pow` ahead of scalar collection
        rules::sum::register(&mut table);
        rules::product::register(&mut table);
        rules::power::register(&mut table);
        rules::functions::register(&mut table);
        matrix::register(&mut table);
        deriv::register(&mut table);

        Engine { table }
    }

    /// Reduces an expression to canonical form.
    pub fn eval(&self, expr: Expr) -> Result<Expr, EvalError> {
        let mut e = expr;
        for _ in 0..REWRITE_BUDGET {
            match e {
                Expr::Integer(_) | Expr::Rational(_) | Expr::Float(_) | Expr::Str(_) => {
                    return Ok(e);
                },
                Expr::List(elts) => {
                    let elts = elts
                        .into_iter()
                        .map(|x| self.eval(x))
                        .collect::<Result<Vec<_>, _>>()?;
                    return Ok(Expr::List(elts));
                },
                Expr::Node(head, args) => {
                    let head = self.eval(*head)?;
                    let mut evaluated = Vec::with_capacity(args.len());
                    for a in args {
                        evaluated.push(self.eval(a)?);
                    }

                    let tag = head.as_str().map(str::to_string);
                    let args = match &tag {
                        Some(t) if self.table.is_flat(t) => {
                            // arguments are already flattened by the recursive eval
                            let mut spliced = Vec::with_capacity(evaluated.len());
                            for a in evaluated {
                                match a {
                                    Expr::Node(h, inner) if h.as_str() == Some(t) => {
                                        spliced.extend(inner);
                                    },
                                    other => spliced.push(other),
                                }
                            }
                            spliced
                        },
                        _ => evaluated,
                    };

                    let node = Expr::Node(Box::new(head), args);
                    let Some(tag) = tag else {
                        return Ok(node);
                    };
                    let node_args: &[Expr] = match &node {
                        Expr::Node(_, a) => a.as_slice(),
                        _ => &[],
                    };

                    let mut rewritten = None;
                    for rule in self.table.rules_for(&tag).iter().rev() {
                        if !rule.accepts(node_args.len()) {
                            continue;
                        }
                        if let Some(candidate) = (rule.apply)(self, node_args)? {
                            // structural equality is the change oracle: an equal
                            // candidate means the rule did nothing, try the next
                            if candidate != node {
                                rewritten = Some(candidate);
                                break;
                            }
                        }
                    }

                    match rewritten {
                        Some(candidate) => e = candidate,
                        None => return Ok(node),
                    }
                },
            }
        }

        Err(EvalError::Diverged)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::var;
    use pretty_assertions::assert_eq;

    #[test]
    fn leaves_evaluate_to_themselves() {
        let ngin = Engine::new();
        assert_eq!(ngin.eval(Expr::from(5)).unwrap(), Expr::from(5));
        assert_eq!(
            ngin.eval(Expr::Str("x".into())).unwrap(),
            Expr::Str("x".into()),
        );
    }

    #[test]
    fn lists_evaluate_elementwise() {
        let ngin = Engine::new();
        let e = Expr::List(vec![Expr::from(1) + Expr::from(1), Expr::from(3)]);
        assert_eq!(
            ngin.eval(e).unwrap(),
            Expr::List(vec![Expr::from(2), Expr::from(3)]),
        );
    }

    #[test]
    fn nested_sums_flatten() {
        let ngin = Engine::new();
        let x = var("x");
        let y = var("y");
        let z = var("z");
        // x + (y + z) reduces to a single three-term sum
        let e = ngin.eval(x.clone() + (y.clone() + z.clone())).unwrap();
        assert_eq!(e, Expr::node("Plus", vec![x, y, z]));
    }

    #[test]
    fn evaluation_is_idempotent() {
        let ngin = Engine::new();
        let x = var("x");
        let e = (x.clone() + x.clone()) * x.clone() + Expr::from(3) * x;
        let once = ngin.eval(e).unwrap();
        let twice = ngin.eval(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn unknown_heads_stay_symbolic() {
        let ngin = Engine::new();
        let e = Expr::node("mystery", vec![var("x")]);
        assert_eq!(ngin.eval(e.clone()).unwrap(), e);
    }
}
