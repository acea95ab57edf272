//! Arithmetic over GF(2^8), the field underneath secret sharing.
//!
//! Elements are plain `u8`s. The field is built from the AES reduction
//! polynomial `x^8 + x^4 + x^3 + x + 1` (0x11b) with generator `0x03`.
//! Multiplication and division go through log/exp tables computed at compile
//! time. The exp table is long enough to index the sum of any two logarithms
//! directly.
//!
//! The choice of polynomial is internal: shares are only meaningful to the
//! restore routine of this same crate.

use skein_types::constants::{EXP_TABLE_LEN, FIELD_ORDER, FIELD_SIZE};
use skein_types::error::{SkeinError, SkeinResult};

/// Reduction polynomial, including the x^8 term.
const REDUCTION_POLY: u16 = 0x11b;

const fn build_tables() -> ([u8; FIELD_SIZE], [u8; EXP_TABLE_LEN]) {
    let mut log = [0u8; FIELD_SIZE];
    let mut exp = [0u8; EXP_TABLE_LEN];

    let mut x: u16 = 1;
    let mut i = 0;
    while i < FIELD_ORDER {
        exp[i] = x as u8;
        log[x as usize] = i as u8;
        // x * 3 = (x * 2) ^ x
        let mut doubled = x << 1;
        if doubled & 0x100 != 0 {
            doubled ^= REDUCTION_POLY;
        }
        x = doubled ^ x;
        i += 1;
    }

    let mut j = FIELD_ORDER;
    while j < EXP_TABLE_LEN {
        exp[j] = exp[j - FIELD_ORDER];
        j += 1;
    }

    (log, exp)
}

const TABLES: ([u8; FIELD_SIZE], [u8; EXP_TABLE_LEN]) = build_tables();
static LOG: [u8; FIELD_SIZE] = TABLES.0;
static EXP: [u8; EXP_TABLE_LEN] = TABLES.1;

/// Field addition (XOR).
#[inline]
pub fn add(a: u8, b: u8) -> u8 {
    a ^ b
}

/// Field subtraction, identical to addition in characteristic 2.
#[inline]
pub fn sub(a: u8, b: u8) -> u8 {
    add(a, b)
}

/// Field multiplication.
#[inline]
pub fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    EXP[LOG[a as usize] as usize + LOG[b as usize] as usize]
}

/// Field division `a / b`.
///
/// # Errors
/// Returns [`SkeinError::DivisionByZero`] when `b` is zero.
#[inline]
pub fn div(a: u8, b: u8) -> SkeinResult<u8> {
    if b == 0 {
        return Err(SkeinError::DivisionByZero);
    }
    if a == 0 {
        return Ok(0);
    }
    let diff = LOG[a as usize] as usize + FIELD_ORDER - LOG[b as usize] as usize;
    Ok(EXP[diff % FIELD_ORDER])
}

/// Multiplicative inverse of a non-zero element.
pub fn inverse(a: u8) -> SkeinResult<u8> {
    div(1, a)
}

/// Evaluate a polynomial at `x` with Horner's rule.
///
/// Coefficients are ordered low to high: `coeffs[0]` is the constant term.
/// An empty coefficient list is the zero polynomial.
pub fn eval_polynomial(coeffs: &[u8], x: u8) -> u8 {
    coeffs
        .iter()
        .rev()
        .fold(0u8, |acc, &c| add(mul(acc, x), c))
}

/// Lagrange interpolation of `points` evaluated at `x = 0`.
///
/// Each point is `(x, y)`. The x-coordinates must be pairwise distinct; a
/// repeated coordinate makes a denominator vanish and is reported as
/// [`SkeinError::DivisionByZero`].
pub fn interpolate_at_zero(points: &[(u8, u8)]) -> SkeinResult<u8> {
    let mut result = 0u8;

    for (i, &(xi, yi)) in points.iter().enumerate() {
        let mut weight = 1u8;
        for (j, &(xj, _)) in points.iter().enumerate() {
            if i == j {
                continue;
            }
            // (0 - xj) / (xi - xj)
            weight = mul(weight, div(sub(0, xj), sub(xi, xj))?);
        }
        result = add(result, mul(yi, weight));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_consistent() {
        for a in 1..=255u8 {
            assert_eq!(EXP[LOG[a as usize] as usize], a);
        }
        for i in 0..FIELD_ORDER {
            assert_eq!(EXP[i], EXP[i + FIELD_ORDER]);
        }
    }

    #[test]
    fn test_generator_covers_group() {
        let mut seen = [false; FIELD_SIZE];
        for &e in &EXP[..FIELD_ORDER] {
            assert!(!seen[e as usize], "element {e} repeated");
            seen[e as usize] = true;
        }
        assert!(!seen[0]);
    }

    #[test]
    fn test_add_is_xor() {
        assert_eq!(add(0x57, 0x83), 0xd4);
        assert_eq!(sub(0x57, 0x83), 0xd4);
        assert_eq!(add(0xff, 0xff), 0);
    }

    #[test]
    fn test_mul_known_vector() {
        // FIPS-197 section 4.2 example.
        assert_eq!(mul(0x57, 0x83), 0xc1);
        assert_eq!(mul(0x57, 0x13), 0xfe);
    }

    #[test]
    fn test_mul_identities() {
        for a in 0..=255u8 {
            assert_eq!(mul(a, 0), 0);
            assert_eq!(mul(a, 1), a);
        }
    }

    #[test]
    fn test_mul_commutative_and_distributive() {
        for a in (0..=255u8).step_by(7) {
            for b in (0..=255u8).step_by(11) {
                assert_eq!(mul(a, b), mul(b, a));
                for c in [0u8, 1, 2, 0x53, 0xca, 0xff] {
                    assert_eq!(mul(a, add(b, c)), add(mul(a, b), mul(a, c)));
                }
            }
        }
    }

    #[test]
    fn test_every_nonzero_has_inverse() {
        for a in 1..=255u8 {
            let inv = inverse(a).unwrap();
            assert_eq!(mul(a, inv), 1, "inverse of {a:#04x}");
        }
    }

    #[test]
    fn test_div_inverts_mul() {
        for a in 0..=255u8 {
            for b in [1u8, 2, 3, 0x53, 0x8e, 0xff] {
                assert_eq!(div(mul(a, b), b).unwrap(), a);
            }
        }
    }

    #[test]
    fn test_div_by_zero() {
        assert_eq!(div(5, 0), Err(SkeinError::DivisionByZero));
        assert_eq!(div(0, 0), Err(SkeinError::DivisionByZero));
        assert_eq!(div(0, 9), Ok(0));
    }

    #[test]
    fn test_eval_polynomial() {
        assert_eq!(eval_polynomial(&[], 7), 0);
        assert_eq!(eval_polynomial(&[42], 7), 42);
        assert_eq!(eval_polynomial(&[42, 1, 0], 0), 42);
        // 5 + 3x + 2x^2 at x = 4
        let expected = add(add(5, mul(3, 4)), mul(2, mul(4, 4)));
        assert_eq!(eval_polynomial(&[5, 3, 2], 4), expected);
    }

    #[test]
    fn test_interpolate_recovers_constant() {
        let coeffs = [0xa7u8, 0x13, 0x5c, 0xee];
        let points: Vec<(u8, u8)> = (1..=4u8)
            .map(|x| (x, eval_polynomial(&coeffs, x)))
            .collect();
        assert_eq!(interpolate_at_zero(&points).unwrap(), 0xa7);

        // Extra points on the same polynomial do not change the result.
        let more: Vec<(u8, u8)> = [9u8, 200, 3, 17, 255]
            .iter()
            .map(|&x| (x, eval_polynomial(&coeffs, x)))
            .collect();
        assert_eq!(interpolate_at_zero(&more).unwrap(), 0xa7);
    }

    #[test]
    fn test_interpolate_duplicate_x() {
        let result = interpolate_at_zero(&[(1, 10), (1, 11)]);
        assert_eq!(result, Err(SkeinError::DivisionByZero));
    }

    #[test]
    fn test_interpolate_empty_is_zero() {
        assert_eq!(interpolate_at_zero(&[]).unwrap(), 0);
    }
}
