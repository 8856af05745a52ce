//! Full-width multiply/divide and integer square root.
//!
//! `mul_div` mirrors Uniswap V3's `FullMath.mulDiv`: the product of two
//! 256-bit operands is taken at 512-bit width before dividing, so no
//! intermediate overflow is possible. `isqrt` works over `BigUint` because
//! the closed-form solver takes the square root of an 8-factor product
//! (reserves and fee rationals) that can exceed 512 bits.

use alloy::primitives::{U256, U512};
use num_bigint::BigUint;

/// Computes `floor(a * b / denominator)` with a 512-bit intermediate product.
///
/// # Panics
/// Panics if `denominator` is zero or the quotient exceeds 256 bits; both
/// are caller contract violations, matching the on-chain revert.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> U256 {
    let product = U512::from(a) * U512::from(b);
    (product / U512::from(denominator)).to::<U256>()
}

/// Computes `ceil(a * b / denominator)` with a 512-bit intermediate product.
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> U256 {
    let product = U512::from(a) * U512::from(b);
    let denominator = U512::from(denominator);
    let quotient = product / denominator;
    let rounded = if product % denominator > U512::ZERO {
        quotient + U512::from(1u8)
    } else {
        quotient
    };
    rounded.to::<U256>()
}

/// Computes `ceil(a / b)`.
pub fn div_rounding_up(a: U256, b: U256) -> U256 {
    let quotient = a / b;
    if a % b > U256::ZERO {
        quotient + U256::from(1u8)
    } else {
        quotient
    }
}

/// Returns `floor(sqrt(n))` by Newton-Raphson iteration.
///
/// The starting guess `2^ceil(bits/2)` is always at or above the true root,
/// so the iterates decrease monotonically; the loop stops once an iterate
/// stops decreasing, at which point the previous iterate is the floor root.
pub fn isqrt(n: &BigUint) -> BigUint {
    if n.bits() == 0 {
        return BigUint::from(0u8);
    }
    let one = BigUint::from(1u8);
    let mut x = &one << (((n.bits() + 1) / 2) as usize);
    loop {
        let next = (&x + n / &x) >> 1;
        if next >= x {
            return x;
        }
        x = next;
    }
}

/// Widens a `U256` into a `BigUint`.
pub fn u256_to_biguint(value: U256) -> BigUint {
    BigUint::from_bytes_be(&value.to_be_bytes::<32>())
}

/// Narrows a `BigUint` back into a `U256`.
///
/// # Panics
/// Panics if the value needs more than 256 bits; callers only convert
/// quantities that are bounded by pool reserves.
pub fn biguint_to_u256(value: &BigUint) -> U256 {
    let bytes = value.to_bytes_be();
    assert!(bytes.len() <= 32, "value exceeds 256 bits");
    U256::from_be_slice(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_div_survives_overflowing_product() {
        // (2^200 * 2^100) / 2^100 = 2^200; the product alone needs 300 bits.
        let a = U256::from(1u8) << 200;
        let b = U256::from(1u8) << 100;
        assert_eq!(mul_div(a, b, b), a);
    }

    #[test]
    fn mul_div_truncates_and_rounding_up_ceils() {
        let seven = U256::from(7u8);
        let three = U256::from(3u8);
        let two = U256::from(2u8);
        assert_eq!(mul_div(seven, two, three), U256::from(4u8));
        assert_eq!(mul_div_rounding_up(seven, two, three), U256::from(5u8));
        // Exact division must not round up.
        assert_eq!(mul_div_rounding_up(seven, three, three), seven);
    }

    #[test]
    fn div_rounding_up_matches_ceil() {
        assert_eq!(
            div_rounding_up(U256::from(10u8), U256::from(3u8)),
            U256::from(4u8)
        );
        assert_eq!(
            div_rounding_up(U256::from(9u8), U256::from(3u8)),
            U256::from(3u8)
        );
    }

    #[test]
    fn isqrt_floor_property() {
        // isqrt(n)^2 <= n < (isqrt(n)+1)^2 across magnitudes including
        // values wider than 256 bits.
        let samples: Vec<BigUint> = vec![
            BigUint::from(0u8),
            BigUint::from(1u8),
            BigUint::from(2u8),
            BigUint::from(3u8),
            BigUint::from(4u8),
            BigUint::from(99u8),
            BigUint::from(100u8),
            BigUint::from(u128::MAX),
            BigUint::from(1u8) << 255,
            (BigUint::from(1u8) << 300) - 1u8,
            BigUint::from(1u8) << 500,
        ];
        for n in samples {
            let root = isqrt(&n);
            assert!(&root * &root <= n, "root too large for {n}");
            let next = &root + 1u8;
            assert!(&next * &next > n, "root too small for {n}");
        }
    }

    #[test]
    fn isqrt_exact_squares() {
        for k in [1u128, 2, 10, 1_000_000, u64::MAX as u128] {
            let n = BigUint::from(k) * BigUint::from(k);
            assert_eq!(isqrt(&n), BigUint::from(k));
        }
    }

    #[test]
    fn biguint_round_trip() {
        let v = U256::MAX - U256::from(17u8);
        assert_eq!(biguint_to_u256(&u256_to_biguint(v)), v);
    }
}
