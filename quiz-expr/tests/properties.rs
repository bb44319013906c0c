//! End-to-end checks of the engine's user-visible guarantees, exercised through
//! the public API only.

use quiz_expr::latex::{latex, latex_with};
use quiz_expr::matrix::{cols, identity_matrix, matrix, shape, vector};
use quiz_expr::rules::functions::{ln, sqrt};
use quiz_expr::{constant, frac, pow, var, Engine, EvalError, Expr, PolicyStack};
use pretty_assertions::assert_eq;

/// Reads the entries of a matrix back out through 1-based indexing.
fn entries(ngin: &Engine, m: &Expr) -> Vec<Vec<Expr>> {
    let (r, c) = shape(m).unwrap();
    (1..=r)
        .map(|i| {
            (1..=c)
                .map(|j| ngin.part(m, &[i as i64, j as i64]).unwrap())
                .collect()
        })
        .collect()
}

#[test]
fn evaluation_is_idempotent() {
    let ngin = Engine::new();
    let x = var("x");
    let samples = vec![
        x.clone() + x.clone(),
        x.clone() * x.clone(),
        sqrt(Expr::from(24)),
        frac(x.clone(), var("y")),
        pow(Expr::from(-4), frac(1, 2)),
        ln(pow(quiz_expr::consts::E.clone(), x.clone())),
        x + Expr::from(0),
    ];
    for e in samples {
        let once = ngin.eval(e).unwrap();
        let twice = ngin.eval(once.clone()).unwrap();
        assert_eq!(twice, once);
    }
}

#[test]
fn like_terms_collect() {
    let ngin = Engine::new();
    let x = var("x");
    assert_eq!(
        ngin.eval(x.clone() + x.clone()).unwrap(),
        ngin.eval(Expr::from(2) * x.clone()).unwrap(),
    );
    assert_eq!(
        ngin.eval(x.clone() * x.clone()).unwrap(),
        pow(x, Expr::from(2)),
    );
    assert_eq!(
        ngin.eval(Expr::from(2) + Expr::from(3)).unwrap(),
        Expr::from(5),
    );
}

#[test]
fn binomial_square_expands() {
    let ngin = Engine::new();
    let x = var("x");
    let expanded = ngin
        .expand(&pow(x.clone() + Expr::from(1), Expr::from(2)))
        .unwrap();
    let expected = ngin
        .eval(pow(x.clone(), Expr::from(2)) + Expr::from(2) * x + Expr::from(1))
        .unwrap();
    assert_eq!(expanded, expected);
}

#[test]
fn substitution_re_evaluates() {
    let ngin = Engine::new();
    let x = var("x");
    let y = var("y");
    let e = ngin.eval(pow(x.clone(), Expr::from(2)) + y.clone()).unwrap();
    let replaced = ngin.replace(&e, &[(x, Expr::from(2))]).unwrap();
    assert_eq!(replaced, ngin.eval(Expr::from(4) + y).unwrap());
}

#[test]
fn perfect_radicands_collapse_exactly() {
    let ngin = Engine::new();
    assert_eq!(ngin.eval(pow(4, frac(1, 2))).unwrap(), Expr::from(2));
    assert_eq!(ngin.eval(pow(8, frac(1, 3))).unwrap(), Expr::from(2));
}

#[test]
fn determinant_of_identity_is_one() {
    let ngin = Engine::new();
    for n in 1..=4 {
        let id = identity_matrix(n).unwrap();
        assert_eq!(ngin.det(&id).unwrap(), Expr::from(1));
    }
}

#[test]
fn row_echelon_leading_entries_are_one() {
    let ngin = Engine::new();
    let a = matrix(vec![
        vec![Expr::from(1), Expr::from(2), Expr::from(3)],
        vec![Expr::from(2), Expr::from(4), Expr::from(6)],
        vec![Expr::from(1), Expr::from(1), Expr::from(1)],
    ])
    .unwrap();

    let ref_form = ngin.row_reduce(&a, false).unwrap();
    for row in entries(&ngin, &ref_form) {
        match row.iter().find(|v| !v.is_zero()) {
            Some(lead) => assert!(lead.is_one()),
            None => {}, // all-zero row
        }
    }

    // in RREF, a pivot's column is zero everywhere else
    let rref_form = ngin.row_reduce(&a, true).unwrap();
    let grid = entries(&ngin, &rref_form);
    for (i, row) in grid.iter().enumerate() {
        if let Some(j) = row.iter().position(|v| !v.is_zero()) {
            assert!(row[j].is_one());
            for (k, other) in grid.iter().enumerate() {
                if k != i {
                    assert!(other[j].is_zero());
                }
            }
        }
    }
}

#[test]
fn rank_plus_nullity_is_column_count() {
    let ngin = Engine::new();
    let samples = vec![
        matrix(vec![
            vec![Expr::from(1), Expr::from(2)],
            vec![Expr::from(2), Expr::from(4)],
        ])
        .unwrap(),
        matrix(vec![
            vec![Expr::from(1), Expr::from(0), Expr::from(2)],
            vec![Expr::from(0), Expr::from(1), Expr::from(3)],
        ])
        .unwrap(),
        identity_matrix(3).unwrap(),
        matrix(vec![vec![Expr::from(0), Expr::from(0)]]).unwrap(),
    ];
    for a in samples {
        let total = ngin.rank(&a).unwrap() + ngin.nullity(&a).unwrap();
        assert_eq!(total, cols(&a).unwrap());
    }
}

#[test]
fn inverse_round_trips_through_matrix_product() {
    let ngin = Engine::new();
    let a = matrix(vec![
        vec![Expr::from(1), Expr::from(2)],
        vec![Expr::from(3), Expr::from(4)],
    ])
    .unwrap();
    let inv = ngin.eval(pow(a.clone(), Expr::from(-1))).unwrap();
    let prod = ngin.eval(a.matmul(inv)).unwrap();
    assert_eq!(prod, identity_matrix(2).unwrap());
}

#[test]
fn gram_schmidt_factors_the_input() {
    let ngin = Engine::new();
    let a = matrix(vec![
        vec![Expr::from(3), Expr::from(1)],
        vec![Expr::from(4), Expr::from(1)],
    ])
    .unwrap();
    let (q, r) = ngin.gram_schmidt(&a, true).unwrap();
    assert_eq!(ngin.eval(q.clone().matmul(r)).unwrap(), a);

    // normalized columns are orthonormal
    let grid = entries(&ngin, &q);
    let col = |j: usize| {
        vector(grid.iter().map(|row| row[j].clone()).collect()).unwrap()
    };
    assert_eq!(ngin.dot(&col(0), &col(0)).unwrap(), Expr::from(1));
    assert_eq!(ngin.dot(&col(1), &col(1)).unwrap(), Expr::from(1));
    assert_eq!(ngin.dot(&col(0), &col(1)).unwrap(), Expr::from(0));
}

#[test]
fn differentiation_basics() {
    let ngin = Engine::new();
    let t = var("t");

    let d1 = ngin.d(&pow(t.clone(), Expr::from(2)), &[t.clone()]).unwrap();
    assert_eq!(d1, ngin.eval(Expr::from(2) * t.clone()).unwrap());

    let c = constant("c");
    assert_eq!(ngin.d(&c, &[t.clone()]).unwrap(), Expr::from(0));
}

#[test]
fn product_rule_matches_leibniz_expansion() {
    let ngin = Engine::new();
    let t = var("t");
    let f = pow(t.clone(), Expr::from(2));
    let g = pow(t.clone(), Expr::from(3));

    let lhs = ngin
        .d(&ngin.eval(f.clone() * g.clone()).unwrap(), &[t.clone()])
        .unwrap();
    let df = ngin.d(&f, &[t.clone()]).unwrap();
    let dg = ngin.d(&g, &[t]).unwrap();
    let rhs = ngin.eval(df * g + f * dg).unwrap();
    assert_eq!(lhs, rhs);
}

#[test]
fn rendering_never_emits_plus_minus() {
    let ngin = Engine::new();
    let e = ngin
        .eval(var("x") + Expr::from(-1) * var("y"))
        .unwrap();
    let s = latex(&e);
    assert!(!s.contains("+ -"), "rendered {:?}", s);
}

#[test]
fn policy_scope_reverts_even_on_error_exit() {
    fn render_in_scope(policy: &mut PolicyStack, fail: bool) -> Result<String, EvalError> {
        let mut scope = policy.scope();
        scope.set_vector_as_tuple(true);
        if fail {
            return Err(EvalError::ZeroColumn);
        }
        let v = vector(vec![Expr::from(1), Expr::from(2)])?;
        Ok(latex_with(&v, &scope))
    }

    let mut policy = PolicyStack::new();
    let ok = render_in_scope(&mut policy, false).unwrap();
    assert_eq!(ok, "\\left(1,2\\right)");
    // the override did not leak out of the scope
    assert!(!policy.vector_as_tuple());

    assert!(render_in_scope(&mut policy, true).is_err());
    assert!(!policy.vector_as_tuple());
    let v = vector(vec![Expr::from(1), Expr::from(2)]).unwrap();
    assert_eq!(latex_with(&v, &policy), "\\begin{bmatrix}1\\\\2\\end{bmatrix}");
}
