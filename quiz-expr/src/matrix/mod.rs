//! Dense symbolic matrices, represented as ordinary expression nodes.
//!
//! A matrix is a `matrix`-headed node whose arguments are the rows, each row an
//! [`Expr::List`] of entries; a vector is a matrix with one column. All of linear
//! algebra here is exact and symbolic: entries may be any expression, and the
//! operations build expression trees that the evaluator reduces.
//!
//! Matrix addition and scalar multiplication are rules on `Plus` and `Times`
//! specialized for matrix operands. The true matrix product is the distinct `MatTimes`
//! head (built by [`Expr::matmul`]), so scalar and matrix multiplication never alias.
//! Indexing is 1-based through the `Part` head, with separate rules for one-index
//! (vector) and two-index (matrix) access.

pub mod ortho;
pub mod row_reduce;

use crate::error::EvalError;
use crate::eval::Engine;
use crate::expr::{frac, Expr};
use crate::rules::{Rule, RuleTable};

/// `matrix(vec![vec![a, b], vec![c, d]])` builds a 2x2 matrix with rows `[a, b]` and
/// `[c, d]`. Rectangularity and nonemptiness are checked here, at construction.
pub fn matrix(rows: Vec<Vec<Expr>>) -> Result<Expr, EvalError> {
    if rows.is_empty() || rows[0].is_empty() {
        return Err(EvalError::EmptyMatrix);
    }
    if rows.iter().any(|row| row.len() != rows[0].len()) {
        return Err(EvalError::NonRectangular);
    }
    Ok(from_rows(rows))
}

/// `vector(vec![a, b, c])` builds the 3x1 column matrix with entries `a`, `b`, `c`.
pub fn vector(entries: Vec<Expr>) -> Result<Expr, EvalError> {
    if entries.is_empty() {
        return Err(EvalError::EmptyMatrix);
    }
    Ok(from_rows(entries.into_iter().map(|e| vec![e]).collect()))
}

/// The n by n identity matrix.
pub fn identity_matrix(n: usize) -> Result<Expr, EvalError> {
    if n == 0 {
        return Err(EvalError::EmptyMatrix);
    }
    Ok(from_rows(
        (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| Expr::from(usize::from(i == j)))
                    .collect()
            })
            .collect(),
    ))
}

/// The square matrix with the given diagonal and zeroes elsewhere.
pub fn diagonal_matrix(entries: Vec<Expr>) -> Result<Expr, EvalError> {
    if entries.is_empty() {
        return Err(EvalError::EmptyMatrix);
    }
    let n = entries.len();
    Ok(from_rows(
        entries
            .into_iter()
            .enumerate()
            .map(|(i, e)| {
                let mut row = vec![Expr::from(0); n];
                row[i] = e;
                row
            })
            .collect(),
    ))
}

/// Assembles a grid of blocks into a `block` node. The node flattens into a single
/// matrix once every block is a concrete matrix with consistent dimensions; until
/// then it stays symbolic, which is what the renderer wants for worked examples.
pub fn block_matrix(blocks: Vec<Vec<Expr>>) -> Result<Expr, EvalError> {
    if blocks.is_empty() || blocks[0].is_empty() {
        return Err(EvalError::EmptyMatrix);
    }
    if blocks.iter().any(|row| row.len() != blocks[0].len()) {
        return Err(EvalError::NonRectangular);
    }
    Ok(Expr::Node(
        Box::new(Expr::Str("block".to_string())),
        blocks.into_iter().map(Expr::List).collect(),
    ))
}

/// Builds a `matrix` node without validation; callers guarantee rectangularity.
pub(crate) fn from_rows(rows: Vec<Vec<Expr>>) -> Expr {
    Expr::Node(
        Box::new(Expr::Str("matrix".to_string())),
        rows.into_iter().map(Expr::List).collect(),
    )
}

/// Clones the entries of a matrix node out into a row-major grid.
pub(crate) fn entry_rows(e: &Expr) -> Option<Vec<Vec<Expr>>> {
    let args = e.args_of("matrix")?;
    args.iter()
        .map(|row| row.as_list().map(<[Expr]>::to_vec))
        .collect()
}

/// The `(rows, cols)` dimensions of a matrix, or [`EvalError::ExpectedMatrix`].
pub fn shape(e: &Expr) -> Result<(usize, usize), EvalError> {
    let Some(args) = e.args_of("matrix") else {
        return Err(EvalError::ExpectedMatrix("shape"));
    };
    let cols = args[0].as_list().map_or(0, <[Expr]>::len);
    Ok((args.len(), cols))
}

/// The number of rows in a matrix.
pub fn rows(e: &Expr) -> Result<usize, EvalError> {
    shape(e).map(|(r, _)| r)
}

/// The number of columns in a matrix.
pub fn cols(e: &Expr) -> Result<usize, EvalError> {
    shape(e).map(|(_, c)| c)
}

/// A vector is a matrix whose rows each have one entry.
pub fn is_vector(e: &Expr) -> bool {
    shape(e).map_or(false, |(_, c)| c == 1)
}

/// The transpose of a matrix.
pub fn transpose(e: &Expr) -> Result<Expr, EvalError> {
    let Some(rows) = entry_rows(e) else {
        return Err(EvalError::ExpectedMatrix("transpose"));
    };
    let (r, c) = (rows.len(), rows[0].len());
    Ok(from_rows(
        (0..c)
            .map(|j| (0..r).map(|i| rows[i][j].clone()).collect())
            .collect(),
    ))
}

/// Returns a copy of the matrix with entry `(i, j)` (1-based) replaced. The original
/// is untouched; only the touched row is rebuilt, everything else is shared by clone.
pub fn with_entry(e: &Expr, i: i64, j: i64, value: Expr) -> Result<Expr, EvalError> {
    let mut rows = entry_rows(e).ok_or(EvalError::ExpectedMatrix("with_entry"))?;
    let (r, c) = (rows.len(), rows[0].len());
    if i < 1 || i as usize > r {
        return Err(EvalError::IndexOutOfRange { index: i, bound: r });
    }
    if j < 1 || j as usize > c {
        return Err(EvalError::IndexOutOfRange { index: j, bound: c });
    }
    rows[i as usize - 1][j as usize - 1] = value;
    Ok(from_rows(rows))
}

/// Single-index variant of [`with_entry`] for vectors. Errors with
/// [`EvalError::ExpectedVector`] when the matrix has more than one column.
pub fn with_vec_entry(e: &Expr, i: i64, value: Expr) -> Result<Expr, EvalError> {
    if !is_vector(e) {
        return Err(EvalError::ExpectedVector("with_vec_entry"));
    }
    with_entry(e, i, 1, value)
}

/// Removes one row and one column (0-based) from a grid of entries.
fn delete_row_col(rows: &[Vec<Expr>], i0: usize, j0: usize) -> Vec<Vec<Expr>> {
    rows.iter()
        .enumerate()
        .filter(|(i, _)| *i != i0)
        .map(|(_, row)| {
            row.iter()
                .enumerate()
                .filter(|(j, _)| *j != j0)
                .map(|(_, v)| v.clone())
                .collect()
        })
        .collect()
}

/// Cofactor expansion along the first column, as an unevaluated expression tree.
/// Exponential time, which is fine for the matrix sizes quiz problems use.
fn det_expand(rows: &[Vec<Expr>]) -> Expr {
    if rows.len() == 1 {
        return rows[0][0].clone();
    }
    let mut acc = Expr::from(0);
    for i in 0..rows.len() {
        let sub: Vec<Vec<Expr>> = rows
            .iter()
            .enumerate()
            .filter(|(k, _)| *k != i)
            .map(|(_, row)| row[1..].to_vec())
            .collect();
        let sign = if i % 2 == 0 { 1 } else { -1 };
        acc = acc + Expr::from(sign) * rows[i][0].clone() * det_expand(&sub);
    }
    acc
}

/// The adjugate as an unevaluated grid: entry `(i, j)` is the `(j, i)` cofactor. The
/// adjugate of a 1x1 matrix is `[[1]]`.
fn adjugate_rows(rows: &[Vec<Expr>]) -> Vec<Vec<Expr>> {
    let n = rows.len();
    if n == 1 {
        return vec![vec![Expr::from(1)]];
    }
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    let sub = delete_row_col(rows, j, i);
                    let sign = if (i + j) % 2 == 0 { 1 } else { -1 };
                    Expr::from(sign) * det_expand(&sub)
                })
                .collect()
        })
        .collect()
}

impl Engine {
    /// Extracts an entry (1-based). One index for vectors, two for matrices.
    pub fn part(&self, e: &Expr, indices: &[i64]) -> Result<Expr, EvalError> {
        let mut args = vec![e.clone()];
        args.extend(indices.iter().map(|&i| Expr::from(i)));
        self.eval(Expr::node("Part", args))
    }

    /// The determinant of a square matrix, by cofactor expansion.
    pub fn det(&self, e: &Expr) -> Result<Expr, EvalError> {
        self.eval(Expr::node("det", vec![e.clone()]))
    }

    /// The trace of a square matrix.
    pub fn tr(&self, e: &Expr) -> Result<Expr, EvalError> {
        self.eval(Expr::node("tr", vec![e.clone()]))
    }

    /// The adjugate of a square matrix: the transposed matrix of cofactors.
    pub fn adj(&self, e: &Expr) -> Result<Expr, EvalError> {
        self.eval(Expr::node("adj", vec![e.clone()]))
    }

    /// The matrix of minors: entry `(i, j)` is the determinant of the submatrix with
    /// row `i` and column `j` removed (unsigned).
    pub fn minors(&self, e: &Expr) -> Result<Expr, EvalError> {
        self.eval(Expr::node("minors", vec![e.clone()]))
    }

    /// The characteristic polynomial `det(A - t*I)`, collected in `t`.
    pub fn charpoly(&self, e: &Expr, t: &Expr) -> Result<Expr, EvalError> {
        let rows = entry_rows(e).ok_or(EvalError::ExpectedMatrix("charpoly"))?;
        let (r, c) = (rows.len(), rows[0].len());
        if r != c {
            return Err(EvalError::NonSquare { op: "charpoly", rows: r, cols: c });
        }
        let shifted: Vec<Vec<Expr>> = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                row.into_iter()
                    .enumerate()
                    .map(|(j, v)| if i == j { v - t.clone() } else { v })
                    .collect()
            })
            .collect();
        let d = self.eval(det_expand(&shifted))?;
        self.collect(&d, std::slice::from_ref(t))
    }

    /// The inverse of a square matrix via `adjugate/determinant`.
    pub fn inverse(&self, e: &Expr) -> Result<Expr, EvalError> {
        let rows = entry_rows(e).ok_or(EvalError::ExpectedMatrix("inverse"))?;
        let (r, c) = (rows.len(), rows[0].len());
        if r != c {
            return Err(EvalError::NonSquare { op: "inverse", rows: r, cols: c });
        }
        let d = self.eval(det_expand(&rows))?;
        if d.is_zero() {
            return Err(EvalError::SingularMatrix);
        }
        let adj = adjugate_rows(&rows);
        let inv = adj
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|v| self.eval(frac(v, d.clone())))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(from_rows(inv))
    }

    /// Raises a square matrix to an integer power by repeated squaring. A negative
    /// power inverts the positive power.
    fn mat_pow_int(&self, e: &Expr, n: i64) -> Result<Expr, EvalError> {
        let (r, c) = shape(e)?;
        if r != c {
            return Err(EvalError::NonSquare { op: "matrix power", rows: r, cols: c });
        }
        if n < 0 {
            let p = self.mat_pow_int(e, -n)?;
            return self.inverse(&p);
        }
        let mut result = identity_matrix(r)?;
        let mut base = e.clone();
        let mut n = n as u64;
        while n > 0 {
            if n & 1 == 1 {
                result = self.eval(result.matmul(base.clone()))?;
            }
            n >>= 1;
            if n > 0 {
                base = self.eval(base.clone().matmul(base))?;
            }
        }
        Ok(result)
    }
}

/// Guard for indexing a matrix with an unsupported number of indices.
fn part_arity(_ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    if args.first().map_or(false, |e| e.is_tag("matrix")) && !(2..=3).contains(&args.len()) {
        return Err(EvalError::WrongArity {
            head: "Part".to_string(),
            min: 2,
            max: Some(3),
            got: args.len(),
        });
    }
    Ok(None)
}

/// `Part(v, i)`: one-index access, vectors only.
fn part_vector(_ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    let e = &args[0];
    let Some(rows) = entry_rows(e) else {
        return Ok(None);
    };
    let Some(idx) = args[1].as_index() else {
        // symbolic index stays unreduced
        return Ok(None);
    };
    if rows[0].len() != 1 {
        return Err(EvalError::OneIndexOnMatrix);
    }
    if idx < 1 || idx as usize > rows.len() {
        return Err(EvalError::IndexOutOfRange { index: idx, bound: rows.len() });
    }
    Ok(Some(rows[idx as usize - 1][0].clone()))
}

/// `Part(m, i, j)`: two-index access.
fn part_matrix(_ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    let e = &args[0];
    let Some(rows) = entry_rows(e) else {
        return Ok(None);
    };
    let (Some(i), Some(j)) = (args[1].as_index(), args[2].as_index()) else {
        return Ok(None);
    };
    if i < 1 || i as usize > rows.len() {
        return Err(EvalError::IndexOutOfRange { index: i, bound: rows.len() });
    }
    if j < 1 || j as usize > rows[0].len() {
        return Err(EvalError::IndexOutOfRange { index: j, bound: rows[0].len() });
    }
    Ok(Some(rows[i as usize - 1][j as usize - 1].clone()))
}

/// Entrywise sum of matrices. A sum that mixes matrix and scalar terms is an error.
fn plus_matrix(ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    let n_mat = args.iter().filter(|a| a.is_tag("matrix")).count();
    if n_mat == 0 {
        return Ok(None);
    }
    if n_mat != args.len() {
        return Err(EvalError::MatrixScalarSum);
    }
    let first = shape(&args[0])?;
    for a in &args[1..] {
        let s = shape(a)?;
        if s != first {
            return Err(EvalError::ShapeMismatch { op: "Plus", lhs: first, rhs: s });
        }
    }
    let grids: Vec<Vec<Vec<Expr>>> = args.iter().filter_map(entry_rows).collect();
    let mut out = Vec::with_capacity(first.0);
    for i in 0..first.0 {
        let mut row = Vec::with_capacity(first.1);
        for j in 0..first.1 {
            let entries: Vec<Expr> = grids.iter().map(|g| g[i][j].clone()).collect();
            row.push(ngin.eval(Expr::node("Plus", entries))?);
        }
        out.push(row);
    }
    Ok(Some(from_rows(out)))
}

/// Scalar multiplication distributes over the entries of the single matrix factor.
/// Two matrix factors under `Times` is an error; that is what `MatTimes` is for.
fn times_scalar_matrix(ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    let n_mat = args.iter().filter(|a| a.is_tag("matrix")).count();
    if n_mat == 0 {
        return Ok(None);
    }
    if n_mat > 1 {
        return Err(EvalError::AmbiguousMatrixProduct);
    }
    let pos = args
        .iter()
        .position(|a| a.is_tag("matrix"))
        .unwrap_or_default();
    let Some(rows) = entry_rows(&args[pos]) else {
        return Ok(None);
    };
    let scalars: Vec<Expr> = args
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != pos)
        .map(|(_, a)| a.clone())
        .collect();
    let out = rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|v| {
                    let mut factors = scalars.clone();
                    factors.push(v);
                    ngin.eval(Expr::node("Times", factors))
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(from_rows(out)))
}

/// The matrix product, with the inner-dimension check.
fn mat_times(ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    let (Some(a), Some(b)) = (entry_rows(&args[0]), entry_rows(&args[1])) else {
        return Ok(None);
    };
    let (ar, ac) = (a.len(), a[0].len());
    let (br, bc) = (b.len(), b[0].len());
    if ac != br {
        return Err(EvalError::ShapeMismatch {
            op: "MatTimes",
            lhs: (ar, ac),
            rhs: (br, bc),
        });
    }
    let mut out = Vec::with_capacity(ar);
    for i in 0..ar {
        let mut row = Vec::with_capacity(bc);
        for j in 0..bc {
            let terms: Vec<Expr> = (0..ac)
                .map(|k| a[i][k].clone() * b[k][j].clone())
                .collect();
            row.push(ngin.eval(Expr::node("Plus", terms))?);
        }
        out.push(row);
    }
    Ok(Some(from_rows(out)))
}

/// Integer powers of a matrix, including the inverse.
fn mat_pow(ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    if !args[0].is_tag("matrix") {
        return Ok(None);
    }
    let Some(n) = args[1].as_index() else {
        return Ok(None);
    };
    Ok(Some(ngin.mat_pow_int(&args[0], n)?))
}

/// Flattens a block matrix once every block is concrete. Row counts must agree along
/// each block row and column counts along each block column.
fn block_flatten(_ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    let grid: Option<Vec<Vec<Expr>>> = args
        .iter()
        .map(|row| row.as_list().map(<[Expr]>::to_vec))
        .collect();
    let Some(grid) = grid else {
        return Ok(None);
    };
    if grid
        .iter()
        .any(|row| row.iter().any(|b| !b.is_tag("matrix")))
    {
        // some block is still symbolic
        return Ok(None);
    }

    // column widths are fixed by the first block row
    let mut col_widths: Option<Vec<usize>> = None;
    let mut out: Vec<Vec<Expr>> = Vec::new();
    for block_row in &grid {
        let height = rows(&block_row[0])?;
        let mut strips: Vec<Vec<Expr>> = vec![Vec::new(); height];
        let mut widths = Vec::with_capacity(block_row.len());
        for (j, block) in block_row.iter().enumerate() {
            let s = shape(block)?;
            if s.0 != height {
                return Err(EvalError::ShapeMismatch {
                    op: "block",
                    lhs: shape(&block_row[0])?,
                    rhs: s,
                });
            }
            if let Some(ws) = &col_widths {
                let expected = ws.get(j).copied().unwrap_or(0);
                if s.1 != expected {
                    return Err(EvalError::ShapeMismatch {
                        op: "block",
                        lhs: (height, expected),
                        rhs: s,
                    });
                }
            }
            widths.push(s.1);
            let entries = entry_rows(block).ok_or(EvalError::ExpectedMatrix("block"))?;
            for (strip, row) in strips.iter_mut().zip(entries) {
                strip.extend(row);
            }
        }
        match &col_widths {
            None => col_widths = Some(widths),
            Some(ws) if ws.len() != widths.len() => {
                return Err(EvalError::ShapeMismatch {
                    op: "block",
                    lhs: (height, ws.len()),
                    rhs: (height, widths.len()),
                });
            },
            Some(_) => {},
        }
        out.extend(strips);
    }
    Ok(Some(from_rows(out)))
}

fn det_rule(ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    let Some(rows) = entry_rows(&args[0]) else {
        return Ok(None);
    };
    let (r, c) = (rows.len(), rows[0].len());
    if r != c {
        return Err(EvalError::NonSquare { op: "det", rows: r, cols: c });
    }
    Ok(Some(ngin.eval(det_expand(&rows))?))
}

fn tr_rule(ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    let Some(rows) = entry_rows(&args[0]) else {
        return Ok(None);
    };
    let (r, c) = (rows.len(), rows[0].len());
    if r != c {
        return Err(EvalError::NonSquare { op: "tr", rows: r, cols: c });
    }
    let diag: Vec<Expr> = (0..r).map(|i| rows[i][i].clone()).collect();
    Ok(Some(ngin.eval(Expr::node("Plus", diag))?))
}

fn adj_rule(ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    let Some(rows) = entry_rows(&args[0]) else {
        return Ok(None);
    };
    let (r, c) = (rows.len(), rows[0].len());
    if r != c {
        return Err(EvalError::NonSquare { op: "adj", rows: r, cols: c });
    }
    let out = adjugate_rows(&rows)
        .into_iter()
        .map(|row| row.into_iter().map(|v| ngin.eval(v)).collect::<Result<Vec<_>, _>>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(from_rows(out)))
}

fn minors_rule(ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    let Some(rows) = entry_rows(&args[0]) else {
        return Ok(None);
    };
    let (r, c) = (rows.len(), rows[0].len());
    if r != c {
        return Err(EvalError::NonSquare { op: "minors", rows: r, cols: c });
    }
    if r == 1 {
        return Ok(Some(from_rows(vec![vec![Expr::from(1)]])));
    }
    let mut out = Vec::with_capacity(r);
    for i in 0..r {
        let mut row = Vec::with_capacity(c);
        for j in 0..c {
            row.push(ngin.eval(det_expand(&delete_row_col(&rows, i, j)))?);
        }
        out.push(row);
    }
    Ok(Some(from_rows(out)))
}

fn rank_rule(ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    if !args[0].is_tag("matrix") {
        return Ok(None);
    }
    Ok(Some(Expr::from(ngin.rank(&args[0])?)))
}

fn nullity_rule(ngin: &Engine, args: &[Expr]) -> Result<Option<Expr>, EvalError> {
    if !args[0].is_tag("matrix") {
        return Ok(None);
    }
    Ok(Some(Expr::from(ngin.nullity(&args[0])?)))
}

pub(crate) fn register(table: &mut RuleTable) {
    // tried after the two-and-three index rules below
    table.register("Part", Rule {
        name: "part_arity",
        min_args: 0,
        max_args: None,
        apply: part_arity,
    });
    table.register("Part", Rule {
        name: "part_vector",
        min_args: 2,
        max_args: Some(2),
        apply: part_vector,
    });
    table.register("Part", Rule {
        name: "part_matrix",
        min_args: 3,
        max_args: Some(3),
        apply: part_matrix,
    });
    // registered after the scalar collection rules, so matrix operands are
    // intercepted before `Plus`/`Times`/`Pow` treat them as atoms
    table.register("Plus", Rule {
        name: "plus_matrix",
        min_args: 1,
        max_args: None,
        apply: plus_matrix,
    });
    table.register("Times", Rule {
        name: "times_scalar_matrix",
        min_args: 1,
        max_args: None,
        apply: times_scalar_matrix,
    });
    table.register("MatTimes", Rule {
        name: "mat_times",
        min_args: 2,
        max_args: Some(2),
        apply: mat_times,
    });
    table.register("Pow", Rule {
        name: "mat_pow",
        min_args: 2,
        max_args: Some(2),
        apply: mat_pow,
    });
    table.register("block", Rule {
        name: "block_flatten",
        min_args: 1,
        max_args: None,
        apply: block_flatten,
    });
    table.register("det", Rule {
        name: "det",
        min_args: 1,
        max_args: Some(1),
        apply: det_rule,
    });
    table.register("tr", Rule {
        name: "tr",
        min_args: 1,
        max_args: Some(1),
        apply: tr_rule,
    });
    table.register("adj", Rule {
        name: "adj",
        min_args: 1,
        max_args: Some(1),
        apply: adj_rule,
    });
    table.register("minors", Rule {
        name: "minors",
        min_args: 1,
        max_args: Some(1),
        apply: minors_rule,
    });
    table.register("rank", Rule {
        name: "rank",
        min_args: 1,
        max_args: Some(1),
        apply: rank_rule,
    });
    table.register("nullity", Rule {
        name: "nullity",
        min_args: 1,
        max_args: Some(1),
        apply: nullity_rule,
    });
}
