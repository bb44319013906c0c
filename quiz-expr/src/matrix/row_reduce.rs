//! Row reduction and the subspace computations that read off the reduced form.
//!
//! The elimination follows Lay's algorithm: it tracks the boundary between processed
//! rows and the trailing block of unprocessed rows, swaps zero rows to the bottom of
//! that block, scales each pivot to a leading 1, and eliminates below (row-echelon
//! form) and then optionally above (reduced row-echelon form). Every elementary
//! operation can be logged as a [`RowOp`] for step-by-step explanations.

use crate::error::EvalError;
use crate::eval::Engine;
use crate::expr::{frac, var, Expr};
use crate::latex::latex;
use crate::matrix::{entry_rows, from_rows, vector};

/// An elementary row operation, with 1-based row numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOp {
    /// `R_i <-> R_j`.
    Swap(usize, usize),

    /// `c * R_i -> R_i`.
    Scale(usize, Expr),

    /// `R_i + c * R_j -> R_i`.
    Replace(usize, usize, Expr),
}

impl RowOp {
    /// The LaTeX form of the operation, e.g. `R_{1} \leftrightarrow R_{2}`.
    pub fn latex(&self) -> String {
        let r = |i: usize| var(&format!("R_{{{}}}", i));
        match self {
            RowOp::Swap(i, j) => format!(r"R_{{{}}} \leftrightarrow R_{{{}}}", i, j),
            RowOp::Scale(i, c) => {
                format!(r"{} \rightarrow {}", latex(&(c.clone() * r(*i))), latex(&r(*i)))
            },
            RowOp::Replace(i, j, c) => format!(
                r"{} \rightarrow {}",
                latex(&(r(*i) + c.clone() * r(*j))),
                latex(&r(*i)),
            ),
        }
    }
}

struct Reducer<'a> {
    ngin: &'a Engine,
    mat: Vec<Vec<Expr>>,
    steps: &'a mut Vec<RowOp>,
}

impl Reducer<'_> {
    fn swap(&mut self, i: usize, j: usize) {
        self.mat.swap(i, j);
        self.steps.push(RowOp::Swap(i + 1, j + 1));
    }

    fn scale(&mut self, i: usize, c: Expr) -> Result<(), EvalError> {
        for k in 0..self.mat[i].len() {
            self.mat[i][k] = self.ngin.eval(c.clone() * self.mat[i][k].clone())?;
        }
        self.steps.push(RowOp::Scale(i + 1, c));
        Ok(())
    }

    fn replace(&mut self, i: usize, j: usize, c: Expr) -> Result<(), EvalError> {
        for k in 0..self.mat[i].len() {
            let term = c.clone() * self.mat[j][k].clone();
            self.mat[i][k] = self.ngin.eval(self.mat[i][k].clone() + term)?;
        }
        self.steps.push(RowOp::Replace(i + 1, j + 1, c));
        Ok(())
    }

    fn is_zero_row(&self, i: usize) -> bool {
        self.mat[i].iter().all(Expr::is_zero)
    }
}

impl Engine {
    /// Row reduction. With `rref` the result is the reduced row-echelon form,
    /// otherwise plain row-echelon form.
    pub fn row_reduce(&self, e: &Expr, rref: bool) -> Result<Expr, EvalError> {
        self.row_reduce_steps(e, rref, None, &mut Vec::new())
    }

    /// Row reduction with an operation log and an optional column bound. Pivots are
    /// only sought in the first `col_bound` columns (useful for augmented matrices),
    /// though each operation still applies to entire rows.
    pub fn row_reduce_steps(
        &self,
        e: &Expr,
        rref: bool,
        col_bound: Option<usize>,
        steps: &mut Vec<RowOp>,
    ) -> Result<Expr, EvalError> {
        let mat = entry_rows(e).ok_or(EvalError::ExpectedMatrix("row_reduce"))?;
        let (n_rows, n_cols) = (mat.len(), mat[0].len());
        let bound = col_bound.unwrap_or(n_cols).min(n_cols);

        let mut red = Reducer { ngin: self, mat, steps };

        let mut last_nz = n_rows as i64 - 1;
        while last_nz >= 0 && red.is_zero_row(last_nz as usize) {
            last_nz -= 1;
        }

        let mut i = 0;
        let mut j = 0;
        while i < n_rows && j < bound {
            if red.is_zero_row(i) {
                if i as i64 >= last_nz {
                    break;
                }
                red.swap(i, last_nz as usize);
                last_nz -= 1;
            }
            if red.mat[i][j].is_zero() {
                // partial pivoting: bring up a row with a nonzero entry
                for k in (i + 1)..(last_nz as usize + 1) {
                    if !red.mat[k][j].is_zero() {
                        red.swap(i, k);
                        break;
                    }
                }
            }
            if red.mat[i][j].is_zero() {
                j += 1;
                continue;
            }
            if !red.mat[i][j].is_one() {
                let c = self.eval(frac(1, red.mat[i][j].clone()))?;
                red.scale(i, c)?;
            }
            for k in (i + 1)..(last_nz as usize + 1) {
                if !red.mat[k][j].is_zero() {
                    let c = self.eval(-red.mat[k][j].clone())?;
                    red.replace(k, i, c)?;
                }
            }
            i += 1;
            j += 1;
        }

        if rref {
            let mut i = last_nz;
            while i >= 0 {
                let r = i as usize;
                if let Some(p) = (0..bound).find(|&c| !red.mat[r][c].is_zero()) {
                    // the pivot entry is already 1; clear the column above it
                    for k in (0..r).rev() {
                        if !red.mat[k][p].is_zero() {
                            let c = self.eval(-red.mat[k][p].clone())?;
                            red.replace(k, r, c)?;
                        }
                    }
                }
                i -= 1;
            }
        }

        Ok(from_rows(red.mat))
    }

    /// The rank: the number of nonzero rows after row reduction.
    pub fn rank(&self, e: &Expr) -> Result<usize, EvalError> {
        let reduced = self.row_reduce(e, false)?;
        let rows = entry_rows(&reduced).ok_or(EvalError::ExpectedMatrix("rank"))?;
        Ok(rows
            .iter()
            .filter(|row| !row.iter().all(Expr::is_zero))
            .count())
    }

    /// The nullity: `cols - rank`.
    pub fn nullity(&self, e: &Expr) -> Result<usize, EvalError> {
        let (_, c) = super::shape(e)?;
        Ok(c - self.rank(e)?)
    }

    /// The pivot positions of the reduced row-echelon form, as 1-based
    /// `(row, column)` pairs in row order.
    pub fn pivots(&self, e: &Expr) -> Result<Vec<(usize, usize)>, EvalError> {
        let reduced = self.row_reduce(e, true)?;
        let rows = entry_rows(&reduced).ok_or(EvalError::ExpectedMatrix("pivots"))?;
        let mut out = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            if let Some(j) = row.iter().position(|v| !v.is_zero()) {
                out.push((i + 1, j + 1));
            }
        }
        Ok(out)
    }

    /// A basis of the column space: the pivot columns of the original matrix.
    pub fn col_basis(&self, e: &Expr) -> Result<Vec<Expr>, EvalError> {
        let rows = entry_rows(e).ok_or(EvalError::ExpectedMatrix("col_basis"))?;
        self.pivots(e)?
            .into_iter()
            .map(|(_, j)| vector(rows.iter().map(|row| row[j - 1].clone()).collect()))
            .collect()
    }

    /// A basis of the null space: one vector per free column, with coordinate 1 in
    /// the free column and the negated reduced-form entries in the pivot columns.
    pub fn null_basis(&self, e: &Expr) -> Result<Vec<Expr>, EvalError> {
        let reduced = self.row_reduce(e, true)?;
        let rows = entry_rows(&reduced).ok_or(EvalError::ExpectedMatrix("null_basis"))?;
        let n_cols = rows[0].len();
        let pivots = self.pivots(e)?;
        let pivot_cols: Vec<usize> = pivots.iter().map(|&(_, j)| j - 1).collect();

        let mut basis = Vec::new();
        for f in 0..n_cols {
            if pivot_cols.contains(&f) {
                continue;
            }
            let mut v = vec![Expr::from(0); n_cols];
            v[f] = Expr::from(1);
            for &(r, j) in &pivots {
                v[j - 1] = self.eval(-rows[r - 1][f].clone())?;
            }
            basis.push(vector(v)?);
        }
        Ok(basis)
    }
}
