//! A representation of mathematical expressions as trees of typed nodes.
//!
//! Every expression is either a numeric leaf ([`Expr::Integer`], [`Expr::Rational`],
//! [`Expr::Float`]), an opaque text leaf ([`Expr::Str`], used for LaTeX-like fragments),
//! an ordered sequence ([`Expr::List`]), or a compound node ([`Expr::Node`]) consisting
//! of a *head* and an ordered sequence of arguments. The head is itself an expression,
//! but is almost always a text tag such as `Plus`, `Times`, `Pow`, `matrix` or `var`;
//! evaluation rules are keyed on these tags.
//!
//! Like Mathematica, subtraction and division do not exist as heads: `a - b` is
//! `a + (-1)*b` and `a / b` is `a * b^-1`. The [`frac`] constructor takes exact
//! quotients so that dividing two integers yields a rational rather than a float.
//!
//! # Structural equality
//!
//! The [`PartialEq`] implementation is deep, order-sensitive, **structural** equality.
//! `x^2 + 2x + 1` and `(x + 1)^2` are semantically equal but not structurally equal.
//! Structural equality can never report a false positive, is cheap to compute, and does
//! not depend on simplification, which is exactly what the evaluator needs: it is the
//! change-detection oracle that decides whether a rewrite rule "did anything".
//!
//! No expression is ever mutated in place; every rewrite produces a new tree, so
//! distinct trees may freely share structure by cloning.

use crate::primitive::{int, PRECISION};
use rug::{Float, Integer, Rational};

/// A symbolic expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// An arbitrary-precision integer, such as `2` or `144`.
    Integer(Integer),

    /// An exact rational in lowest terms with the sign on the numerator, such as `1/2`.
    ///
    /// The constructors never produce a rational with denominator 1; that value is
    /// always an [`Expr::Integer`].
    Rational(Rational),

    /// A floating-point number. Only ever introduced by explicit approximation.
    Float(Float),

    /// An opaque text leaf, e.g. a LaTeX fragment naming a variable.
    Str(String),

    /// An ordered sequence of expressions, e.g. a matrix row.
    List(Vec<Expr>),

    /// A compound node: a head applied to an ordered argument sequence.
    Node(Box<Expr>, Vec<Expr>),
}

/// [`Eq`] is implemented manually because of [`Expr::Float`]. This crate **must never**
/// produce non-normal [`Float`]s (such as `NaN` or `Infinity`).
impl Eq for Expr {}

/// The coarse classification of an expression, as reported by [`Expr::head`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Head<'a> {
    /// An integer, rational or float leaf.
    Number,

    /// A text leaf.
    Text,

    /// An ordered sequence.
    List,

    /// A compound node whose head is a text tag.
    Tag(&'a str),

    /// A compound node with a non-text head.
    Compound(&'a Expr),
}

impl Expr {
    /// Builds a compound node with a text tag as its head.
    pub fn node(tag: &str, args: Vec<Expr>) -> Expr {
        Expr::Node(Box::new(Expr::Str(tag.to_string())), args)
    }

    /// Classifies the expression by its head.
    pub fn head(&self) -> Head<'_> {
        match self {
            Expr::Integer(_) | Expr::Rational(_) | Expr::Float(_) => Head::Number,
            Expr::Str(_) => Head::Text,
            Expr::List(_) => Head::List,
            Expr::Node(head, _) => match &**head {
                Expr::Str(tag) => Head::Tag(tag),
                other => Head::Compound(other),
            },
        }
    }

    /// If the expression is a compound node with a text tag, returns the tag.
    pub fn tag(&self) -> Option<&str> {
        match self.head() {
            Head::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    /// Returns true if the expression is a compound node with the given tag.
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag() == Some(tag)
    }

    /// If the expression is a compound node, returns its head and arguments.
    pub fn as_node(&self) -> Option<(&Expr, &[Expr])> {
        match self {
            Expr::Node(head, args) => Some((head, args)),
            _ => None,
        }
    }

    /// If the expression is a compound node with the given tag, returns its arguments.
    pub fn args_of(&self, tag: &str) -> Option<&[Expr]> {
        match self {
            Expr::Node(head, args) if head.as_str() == Some(tag) => Some(args),
            _ => None,
        }
    }

    /// Returns true if the expression is a numeric leaf.
    pub fn is_number(&self) -> bool {
        matches!(self, Expr::Integer(_) | Expr::Rational(_) | Expr::Float(_))
    }

    /// If the expression is an [`Expr::Integer`], returns a reference to the integer.
    pub fn as_integer(&self) -> Option<&Integer> {
        match self {
            Expr::Integer(n) => Some(n),
            _ => None,
        }
    }

    /// If the expression is a [`Expr::List`], returns its elements.
    pub fn as_list(&self) -> Option<&[Expr]> {
        match self {
            Expr::List(elts) => Some(elts),
            _ => None,
        }
    }

    /// If the expression is an [`Expr::Str`], returns the text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Expr::Str(s) => Some(s),
            _ => None,
        }
    }

    /// If the expression is an integer that fits in an `i64`, returns it. Used for
    /// 1-based indices.
    pub fn as_index(&self) -> Option<i64> {
        self.as_integer().and_then(|n| n.to_i64())
    }

    /// Returns true if the expression is the literal number 0 (of any numeric type).
    pub fn is_zero(&self) -> bool {
        match self {
            Expr::Integer(n) => *n == 0,
            Expr::Rational(r) => *r == 0,
            Expr::Float(f) => f.is_zero(),
            _ => false,
        }
    }

    /// Returns true if the expression is the literal number 1 (of any numeric type).
    pub fn is_one(&self) -> bool {
        match self {
            Expr::Integer(n) => *n == 1,
            Expr::Rational(r) => *r == 1,
            Expr::Float(f) => *f == 1,
            _ => false,
        }
    }

    /// Raises the expression to a power, building an unevaluated `Pow` node.
    pub fn pow(self, exponent: Expr) -> Expr {
        Expr::node("Pow", vec![self, exponent])
    }

    /// Multiplies by another matrix, building an unevaluated `MatTimes` node. The matrix
    /// product is deliberately a distinct head from the scalar product.
    pub fn matmul(self, rhs: Expr) -> Expr {
        Expr::node("MatTimes", vec![self, rhs])
    }
}

/// `var("a")` creates a variable named "a".
///
/// The name can contain LaTeX code, like `var(r"\lambda")`. In contrast with [`constant`],
/// a variable may depend on other variables when differentiating.
pub fn var(name: &str) -> Expr {
    Expr::node("var", vec![Expr::Str(name.to_string())])
}

/// `constant("c")` creates a constant named "c".
///
/// In contrast with [`var`], a constant is assumed to be a fixed scalar value; its
/// derivative with respect to anything is zero.
pub fn constant(name: &str) -> Expr {
    Expr::node("const", vec![Expr::Str(name.to_string())])
}

/// Divides `a` by `b` exactly, as the unevaluated product `a * b^-1`.
///
/// There is deliberately no division operator: slash-division is how floating-point
/// numbers sneak into a computation that wanted exact ones.
pub fn frac(a: impl Into<Expr>, b: impl Into<Expr>) -> Expr {
    a.into() * b.into().pow(Expr::from(-1))
}

/// Raises `a` to the power `b`, building an unevaluated `Pow` node.
pub fn pow(a: impl Into<Expr>, b: impl Into<Expr>) -> Expr {
    a.into().pow(b.into())
}

impl From<Integer> for Expr {
    fn from(n: Integer) -> Self {
        Expr::Integer(n)
    }
}

/// A rational with denominator 1 is normalized down to an integer, keeping numeric
/// leaves canonical.
impl From<Rational> for Expr {
    fn from(r: Rational) -> Self {
        if r.is_integer() {
            Expr::Integer(r.into_numer_denom().0)
        } else {
            Expr::Rational(r)
        }
    }
}

impl From<Float> for Expr {
    fn from(f: Float) -> Self {
        Expr::Float(f)
    }
}

impl From<i32> for Expr {
    fn from(n: i32) -> Self {
        Expr::Integer(int(n))
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        Expr::Integer(int(n))
    }
}

impl From<usize> for Expr {
    fn from(n: usize) -> Self {
        Expr::Integer(int(n))
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Expr::Str(s.to_string())
    }
}

/// Builds an unevaluated `Plus` node. No flattening or simplification happens here;
/// that is the evaluator's job.
impl std::ops::Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::node("Plus", vec![self, rhs])
    }
}

/// `a - b` builds `a + (-1)*b`; subtraction does not exist as a head.
impl std::ops::Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::node("Plus", vec![self, Expr::from(-1) * rhs])
    }
}

/// Builds an unevaluated `Times` node.
impl std::ops::Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::node("Times", vec![self, rhs])
    }
}

/// `-a` builds `(-1)*a`, except that numeric leaves are negated directly.
impl std::ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        match self {
            Expr::Integer(n) => Expr::Integer(-n),
            Expr::Rational(r) => Expr::Rational(-r),
            Expr::Float(f) => Expr::Float(-f),
            expr => Expr::from(-1) * expr,
        }
    }
}

impl std::fmt::Display for Expr {
    /// A Python-readable-ish form for debugging; the LaTeX form is produced by
    /// [`latex`](crate::latex::latex).
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Integer(n) => write!(f, "{}", n),
            Expr::Rational(r) => write!(f, "{}", r),
            Expr::Float(x) => write!(f, "{}", x.to_f64()),
            Expr::Str(s) => write!(f, "{:?}", s),
            Expr::List(elts) => {
                write!(f, "[")?;
                for (i, e) in elts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", e)?;
                }
                write!(f, "]")
            },
            Expr::Node(head, args) => {
                write!(f, "expr({}", head)?;
                for a in args {
                    write!(f, ", {}", a)?;
                }
                write!(f, ")")
            },
        }
    }
}

/// Adds two numeric leaves exactly. Mixing an exact number with a float yields a float;
/// everything else stays exact. Returns `None` if either side is not a number.
pub(crate) fn num_add(a: &Expr, b: &Expr) -> Option<Expr> {
    use Expr::*;
    Some(match (a, b) {
        (Integer(x), Integer(y)) => Expr::Integer(rug::Integer::from(x + y)),
        (Integer(x), Rational(y)) | (Rational(y), Integer(x)) => {
            Expr::from(rug::Rational::from(y + x))
        },
        (Rational(x), Rational(y)) => Expr::from(rug::Rational::from(x + y)),
        (Float(x), Float(y)) => Expr::Float(rug::Float::with_val(PRECISION, x + y)),
        (Float(x), Integer(y)) | (Integer(y), Float(x)) => {
            Expr::Float(rug::Float::with_val(PRECISION, x + y))
        },
        (Float(x), Rational(y)) | (Rational(y), Float(x)) => {
            Expr::Float(rug::Float::with_val(PRECISION, x + y))
        },
        _ => return None,
    })
}

/// Multiplies two numeric leaves exactly, with the same promotion behavior as
/// [`num_add`].
pub(crate) fn num_mul(a: &Expr, b: &Expr) -> Option<Expr> {
    use Expr::*;
    Some(match (a, b) {
        (Integer(x), Integer(y)) => Expr::Integer(rug::Integer::from(x * y)),
        (Integer(x), Rational(y)) | (Rational(y), Integer(x)) => {
            Expr::from(rug::Rational::from(y * x))
        },
        (Rational(x), Rational(y)) => Expr::from(rug::Rational::from(x * y)),
        (Float(x), Float(y)) => Expr::Float(rug::Float::with_val(PRECISION, x * y)),
        (Float(x), Integer(y)) | (Integer(y), Float(x)) => {
            Expr::Float(rug::Float::with_val(PRECISION, x * y))
        },
        (Float(x), Rational(y)) | (Rational(y), Float(x)) => {
            Expr::Float(rug::Float::with_val(PRECISION, x * y))
        },
        _ => return None,
    })
}

/// The absolute value of a numeric leaf.
pub(crate) fn num_abs(a: &Expr) -> Option<Expr> {
    Some(match a {
        Expr::Integer(n) => Expr::Integer(n.clone().abs()),
        Expr::Rational(r) => Expr::Rational(r.clone().abs()),
        Expr::Float(f) => Expr::Float(f.clone().abs()),
        _ => return None,
    })
}

/// Returns true if the expression is a negative numeric leaf.
pub(crate) fn num_is_negative(a: &Expr) -> bool {
    match a {
        Expr::Integer(n) => *n < 0,
        Expr::Rational(r) => *r < 0,
        Expr::Float(f) => *f < 0,
        _ => false,
    }
}

/// Returns true if the expression is the literal number -1.
pub(crate) fn num_is_minus_one(a: &Expr) -> bool {
    match a {
        Expr::Integer(n) => *n == -1,
        Expr::Rational(r) => *r == -1,
        Expr::Float(f) => *f == -1,
        _ => false,
    }
}
