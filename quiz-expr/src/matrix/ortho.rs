//! Inner products, norms and orthogonalization.

use crate::error::EvalError;
use crate::eval::Engine;
use crate::expr::{frac, Expr};
use crate::matrix::{entry_rows, from_rows, shape};
use crate::rules::functions::{abs, sqrt};

/// The columns of a matrix, as entry vectors.
fn columns(e: &Expr, op: &'static str) -> Result<Vec<Vec<Expr>>, EvalError> {
    let rows = entry_rows(e).ok_or(EvalError::ExpectedMatrix(op))?;
    let (r, c) = (rows.len(), rows[0].len());
    Ok((0..c)
        .map(|j| (0..r).map(|i| rows[i][j].clone()).collect())
        .collect())
}

/// Reassembles a matrix from its columns.
fn from_columns(cols: Vec<Vec<Expr>>) -> Expr {
    let (c, r) = (cols.len(), cols[0].len());
    from_rows(
        (0..r)
            .map(|i| (0..c).map(|j| cols[j][i].clone()).collect())
            .collect(),
    )
}

/// The unevaluated sum of entrywise products.
fn dot_terms(u: &[Expr], v: &[Expr]) -> Expr {
    let terms: Vec<Expr> = u
        .iter()
        .zip(v)
        .map(|(a, b)| a.clone() * b.clone())
        .collect();
    Expr::node("Plus", terms)
}

/// The unevaluated sum of squared absolute values of a slice of entries.
fn abs_square_sum(entries: &[Expr]) -> Expr {
    let terms: Vec<Expr> = entries
        .iter()
        .map(|x| abs(x.clone()).pow(Expr::from(2)))
        .collect();
    Expr::node("Plus", terms)
}

impl Engine {
    /// The dot product of two vectors of the same length.
    pub fn dot(&self, u: &Expr, v: &Expr) -> Result<Expr, EvalError> {
        let (ur, uc) = shape(u).map_err(|_| EvalError::ExpectedVector("dot"))?;
        let (vr, vc) = shape(v).map_err(|_| EvalError::ExpectedVector("dot"))?;
        if uc != 1 || vc != 1 {
            return Err(EvalError::ExpectedVector("dot"));
        }
        if ur != vr {
            return Err(EvalError::ShapeMismatch {
                op: "dot",
                lhs: (ur, uc),
                rhs: (vr, vc),
            });
        }
        let a = columns(u, "dot")?;
        let b = columns(v, "dot")?;
        self.eval(dot_terms(&a[0], &b[0]))
    }

    /// The Frobenius norm: the square root of the sum of squared absolute entries.
    pub fn norm(&self, e: &Expr) -> Result<Expr, EvalError> {
        let rows = entry_rows(e).ok_or(EvalError::ExpectedMatrix("norm"))?;
        let entries: Vec<Expr> = rows.into_iter().flatten().collect();
        self.eval(sqrt(abs_square_sum(&entries)))
    }

    /// Divides each column by its norm. A zero column is an error.
    pub fn normalize(&self, e: &Expr) -> Result<Expr, EvalError> {
        let cols = columns(e, "normalize")?;
        let mut out = Vec::with_capacity(cols.len());
        for col in cols {
            let n = self.eval(sqrt(abs_square_sum(&col)))?;
            if n.is_zero() {
                return Err(EvalError::ZeroColumn);
            }
            let scaled = col
                .into_iter()
                .map(|v| self.eval(frac(v, n.clone())))
                .collect::<Result<Vec<_>, _>>()?;
            out.push(scaled);
        }
        Ok(from_columns(out))
    }

    /// The cross product of two 3-vectors.
    pub fn cross(&self, u: &Expr, v: &Expr) -> Result<Expr, EvalError> {
        let (ur, uc) = shape(u).map_err(|_| EvalError::ExpectedVector("cross"))?;
        let (vr, vc) = shape(v).map_err(|_| EvalError::ExpectedVector("cross"))?;
        if uc != 1 || vc != 1 {
            return Err(EvalError::ExpectedVector("cross"));
        }
        if ur != 3 || vr != 3 {
            return Err(EvalError::ShapeMismatch {
                op: "cross",
                lhs: (ur, uc),
                rhs: (vr, vc),
            });
        }
        let a = &columns(u, "cross")?[0];
        let b = &columns(v, "cross")?[0];
        let entry = |i: usize, j: usize| a[i].clone() * b[j].clone() - a[j].clone() * b[i].clone();
        let rows = vec![
            vec![self.eval(entry(1, 2))?],
            vec![self.eval(entry(2, 0))?],
            vec![self.eval(entry(0, 1))?],
        ];
        Ok(from_rows(rows))
    }

    /// Gram-Schmidt orthogonalization of the columns of `a`, producing `(Q, R)` with
    /// `a = Q*R` and `R` upper-triangular.
    ///
    /// Without normalization the diagonal of `R` is all ones and the columns of `Q`
    /// are merely orthogonal; with it, each column of `Q` is scaled to norm 1 and the
    /// corresponding row of `R` picks up the norm. Linearly dependent columns are an
    /// error.
    pub fn gram_schmidt(&self, a: &Expr, normalize: bool) -> Result<(Expr, Expr), EvalError> {
        let cols = columns(a, "gram_schmidt")?;
        let n = cols.len();
        let mut q: Vec<Vec<Expr>> = Vec::with_capacity(n);
        let mut r = vec![vec![Expr::from(0); n]; n];

        for (j, col) in cols.iter().enumerate() {
            let mut v = col.clone();
            for k in 0..j {
                let num = dot_terms(&q[k], col);
                let den = dot_terms(&q[k], &q[k]);
                let coef = self.eval(frac(num, den))?;
                for (vt, qt) in v.iter_mut().zip(&q[k]) {
                    *vt = self.eval(vt.clone() - coef.clone() * qt.clone())?;
                }
                r[k][j] = coef;
            }
            if v.iter().all(Expr::is_zero) {
                return Err(EvalError::DependentColumns);
            }
            r[j][j] = Expr::from(1);
            q.push(v);
        }

        if normalize {
            for j in 0..n {
                let nrm = self.eval(sqrt(abs_square_sum(&q[j])))?;
                for vt in q[j].iter_mut() {
                    *vt = self.eval(frac(vt.clone(), nrm.clone()))?;
                }
                for c in 0..n {
                    r[j][c] = self.eval(nrm.clone() * r[j][c].clone())?;
                }
            }
        }

        Ok((from_columns(q), from_rows(r)))
    }
}
