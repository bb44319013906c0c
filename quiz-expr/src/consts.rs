//! Frequently used expressions, constructed lazily.

use crate::expr::{constant, Expr};
use once_cell::sync::Lazy;

/// Euler's number, the base of the natural logarithm.
pub static E: Lazy<Expr> = Lazy::new(|| constant("e"));

/// The imaginary unit.
pub static I: Lazy<Expr> = Lazy::new(|| constant("i"));
