//! Functions to construct [`Integer`]s, [`Rational`]s, and [`Float`]s from various types.

use rug::{Assign, Float, Integer, Rational};

/// The number of digits of precision to use when computing floating-point values.
pub const PRECISION: u32 = 1 << 9;

/// Creates an [`Integer`] with the given value.
pub fn int<T>(n: T) -> Integer
where
    Integer: From<T>,
{
    Integer::from(n)
}

/// Creates a [`Rational`] with the given value.
///
/// `rug` keeps rationals canonical: the fraction is reduced to lowest terms and the sign
/// lives on the numerator.
pub fn rat<T>(n: T) -> Rational
where
    Rational: From<T>,
{
    Rational::from(n)
}

/// Creates a [`Float`] with the given value.
pub fn float<T>(n: T) -> Float
where
    Float: Assign<T>,
{
    Float::with_val(PRECISION, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rational_is_canonical() {
        let r = rat((4, -6));
        assert_eq!(r.numer(), &int(-2));
        assert_eq!(r.denom(), &int(3));
    }
}
