//! Errors reported by the expression engine.
//!
//! There are two user-visible families of failure. *Construction errors* are reported
//! immediately by the call that builds or indexes a malformed node, such as a ragged
//! matrix literal or an out-of-range index. *Domain errors* are mathematically undefined
//! operations, reported at the point of evaluation, such as the logarithm of zero or the
//! inverse of a singular matrix.
//!
//! A rule that simply does not apply to its node is **not** an error; it signals this by
//! returning `Ok(None)` and the evaluator leaves the node unreduced.

/// Any error that can occur while constructing or evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// A matrix literal whose rows do not all have the same length.
    NonRectangular,

    /// A matrix with zero rows or zero columns.
    EmptyMatrix,

    /// A matrix operation was applied to a value that is not a matrix.
    ExpectedMatrix(&'static str),

    /// An operation on vectors was applied to a matrix with more than one column.
    ExpectedVector(&'static str),

    /// A node was constructed with an argument count outside the arity its head accepts.
    WrongArity {
        /// The head tag of the offending node.
        head: String,

        /// The minimum number of arguments the head accepts.
        min: usize,

        /// The maximum number of arguments the head accepts, if bounded.
        max: Option<usize>,

        /// The number of arguments actually supplied.
        got: usize,
    },

    /// A 1-based index fell outside the bounds of the matrix or vector.
    IndexOutOfRange {
        /// The index that was supplied.
        index: i64,

        /// The number of valid positions along that axis.
        bound: usize,
    },

    /// A matrix was indexed with a single index; two are required.
    OneIndexOnMatrix,

    /// Two matrices in an operation have incompatible dimensions.
    ShapeMismatch {
        /// The operation being performed.
        op: &'static str,

        /// Dimensions of the left operand.
        lhs: (usize, usize),

        /// Dimensions of the right operand.
        rhs: (usize, usize),
    },

    /// A sum mixed matrix and scalar terms.
    MatrixScalarSum,

    /// Two matrices appeared under the scalar product; the matrix product is a distinct
    /// operator and never aliases with scalar multiplication.
    AmbiguousMatrixProduct,

    /// An operation that requires a square matrix was given a rectangular one.
    NonSquare {
        /// The operation being performed.
        op: &'static str,

        /// Number of rows.
        rows: usize,

        /// Number of columns.
        cols: usize,
    },

    /// Attempted to invert a matrix whose determinant is zero.
    SingularMatrix,

    /// The columns given to orthogonalization are linearly dependent.
    DependentColumns,

    /// Attempted to normalize a zero column.
    ZeroColumn,

    /// `ln(0)` is undefined.
    LogOfZero,

    /// Division by zero, including a zero base raised to a negative power.
    DivisionByZero,

    /// A derivative was requested with respect to something that is not a variable.
    DerivSpecNotVar,

    /// A derivative specification contained a negative order.
    DerivOrderNegative,

    /// A derivative specification contained a fractional order.
    DerivOrderFractional,

    /// The rewrite loop failed to reach a fixed point within its iteration budget.
    Diverged,
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonRectangular => {
                write!(f, "not all rows in the matrix have the same length")
            },
            Self::EmptyMatrix => {
                write!(f, "matrices must have at least one row and one column")
            },
            Self::ExpectedMatrix(op) => write!(f, "`{}` expects a matrix", op),
            Self::ExpectedVector(op) => {
                write!(f, "`{}` expects a vector (a matrix with one column)", op)
            },
            Self::WrongArity { head, min, max, got } => match max {
                Some(max) if min == max => write!(
                    f,
                    "`{}` expects exactly {} argument(s), got {}",
                    head, min, got
                ),
                Some(max) => write!(
                    f,
                    "`{}` expects between {} and {} arguments, got {}",
                    head, min, max, got
                ),
                None => write!(
                    f,
                    "`{}` expects at least {} argument(s), got {}",
                    head, min, got
                ),
            },
            Self::IndexOutOfRange { index, bound } => {
                write!(f, "index {} is out of bounds for length {}", index, bound)
            },
            Self::OneIndexOnMatrix => {
                write!(f, "need two indices to index a matrix, not one")
            },
            Self::ShapeMismatch { op, lhs, rhs } => write!(
                f,
                "`{}` cannot combine a {}x{} matrix with a {}x{} matrix",
                op, lhs.0, lhs.1, rhs.0, rhs.1
            ),
            Self::MatrixScalarSum => {
                write!(f, "cannot add a scalar to a matrix")
            },
            Self::AmbiguousMatrixProduct => {
                write!(f, "use the matrix product operator to multiply two matrices")
            },
            Self::NonSquare { op, rows, cols } => {
                write!(f, "`{}` requires a square matrix, got {}x{}", op, rows, cols)
            },
            Self::SingularMatrix => write!(f, "the matrix is singular"),
            Self::DependentColumns => {
                write!(f, "the columns of the matrix are linearly dependent")
            },
            Self::ZeroColumn => write!(f, "cannot normalize a zero column"),
            Self::LogOfZero => write!(f, "ln(0) is undefined"),
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::DerivSpecNotVar => {
                write!(f, "can only take derivatives with respect to variables")
            },
            Self::DerivOrderNegative => {
                write!(f, "the derivative specification contains a negative order")
            },
            Self::DerivOrderFractional => {
                write!(f, "the derivative specification contains a fractional order")
            },
            Self::Diverged => {
                write!(f, "evaluation failed to reach a normal form (rewrite budget exhausted)")
            },
        }
    }
}

impl std::error::Error for EvalError {}
