//! A small symbolic expression engine for authoring parametrized math quiz
//! questions.
//!
//! Everything is an [`Expr`]: a tree of numeric leaves (arbitrary-precision
//! integers and rationals via [`rug`], floats only on request), text leaves, and
//! compound nodes whose heads are text tags like `Plus`, `Times`, `Pow` or
//! `matrix`. An [`Engine`] holds a table of rewrite rules keyed by head tag and
//! [`Engine::eval`] drives them to a fixed point, so a quiz author can build a
//! tree out of randomized parameters, evaluate it to a canonical form, and render
//! the result to LaTeX with [`latex::latex`].
//!
//! All arithmetic stays exact: an integer power of a rational is a rational, the
//! square root of 8 is the radical `2 * 2^(1/2)` rather than `2.828...`, and a
//! negative base under a fractional power factors through the imaginary unit.
//! Floats exist only behind the explicit conversion in [`mod@approx`].
//!
//! ```
//! use quiz_expr::{latex::latex, pow, var, Engine, Expr};
//!
//! let ngin = Engine::new();
//! let x = var("x");
//! let square = ngin.expand(&pow(x + Expr::from(1), Expr::from(2))).unwrap();
//! assert_eq!(latex(&square), "{x}^{2} + 2{x} + 1");
//! ```
//!
//! Beyond arithmetic the engine provides matrix and vector algebra sized for
//! linear-algebra coursework ([`matrix`]), symbolic differentiation ([`mod@deriv`]),
//! polynomial expansion and collection ([`manipulate`]), and a LaTeX renderer
//! with dynamically scoped display policies ([`latex`], [`policy`]).

pub mod approx;
pub mod consts;
pub mod deriv;
pub mod error;
pub mod eval;
pub mod expr;
pub mod latex;
pub mod manipulate;
pub mod matrix;
pub mod policy;
pub mod primitive;
pub mod rules;

pub use approx::approx;
pub use deriv::deriv;
pub use error::EvalError;
pub use eval::Engine;
pub use expr::{constant, frac, pow, var, Expr, Head};
pub use manipulate::free_variables;
pub use policy::{PolicyScope, PolicyStack};
