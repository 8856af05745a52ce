//! Sqrt-price delta formulas, ported from Uniswap V3 `SqrtPriceMath.sol`.
//!
//! Rounding directions are load-bearing: amounts owed to the pool round up,
//! amounts paid out round down. Getting a single rounding wrong makes the
//! off-chain profit differ from settlement by a few wei, which is enough to
//! flip a marginal opportunity.

use alloy::primitives::{U256, U512};

use crate::full_math::{div_rounding_up, mul_div, mul_div_rounding_up};
use crate::Q96;

/// Amount of token0 between two sqrt prices at constant liquidity:
/// `liquidity * 2^96 * (upper - lower) / (upper * lower)`.
pub fn get_amount0_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> U256 {
    let (lower, upper) = sort_ratios(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if lower.is_zero() {
        return U256::ZERO;
    }
    let numerator1 = U256::from(liquidity) << 96;
    let numerator2 = upper - lower;

    if round_up {
        div_rounding_up(mul_div_rounding_up(numerator1, numerator2, upper), lower)
    } else {
        mul_div(numerator1, numerator2, upper) / lower
    }
}

/// Amount of token1 between two sqrt prices at constant liquidity:
/// `liquidity * (upper - lower) / 2^96`.
pub fn get_amount1_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> U256 {
    let (lower, upper) = sort_ratios(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if round_up {
        mul_div_rounding_up(U256::from(liquidity), upper - lower, Q96)
    } else {
        mul_div(U256::from(liquidity), upper - lower, Q96)
    }
}

/// Price after consuming `amount_in` of the input token.
///
/// token0 in (`zero_for_one`) pushes the price down, token1 in pushes it up.
pub fn get_next_sqrt_price_from_input(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount_in: U256,
    zero_for_one: bool,
) -> U256 {
    if zero_for_one {
        get_next_sqrt_price_from_amount0_rounding_up(sqrt_price_x96, liquidity, amount_in)
    } else {
        // price moves up: sqrtP + amount * 2^96 / liquidity, rounded down so
        // the pool never over-credits the move.
        sqrt_price_x96 + mul_div(amount_in, Q96, U256::from(liquidity))
    }
}

/// Price after paying out `amount_out` of the output token.
///
/// Returns `None` when the pool cannot produce that amount within the
/// current liquidity range.
pub fn get_next_sqrt_price_from_output(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount_out: U256,
    zero_for_one: bool,
) -> Option<U256> {
    if zero_for_one {
        // token1 out: sqrtP - ceil(amount * 2^96 / liquidity).
        let quotient = mul_div_rounding_up(amount_out, Q96, U256::from(liquidity));
        sqrt_price_x96.checked_sub(quotient).filter(|p| !p.is_zero())
    } else {
        // token0 out: liquidity * sqrtP / (liquidity - amount * sqrtP),
        // rounded up; fails when the denominator would go non-positive.
        let numerator1 = U512::from(U256::from(liquidity) << 96);
        let product = U512::from(amount_out) * U512::from(sqrt_price_x96);
        if product >= numerator1 {
            return None;
        }
        let denominator = numerator1 - product;
        Some(mul_div_rounding_up_512(
            numerator1,
            U512::from(sqrt_price_x96),
            denominator,
        ))
    }
}

fn get_next_sqrt_price_from_amount0_rounding_up(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount: U256,
) -> U256 {
    if amount.is_zero() {
        return sqrt_price_x96;
    }
    // liquidity * sqrtP / (liquidity + amount * sqrtP), rounded up. The
    // denominator can exceed 256 bits, so it stays in 512-bit space.
    let numerator1 = U512::from(U256::from(liquidity) << 96);
    let denominator = numerator1 + U512::from(amount) * U512::from(sqrt_price_x96);
    mul_div_rounding_up_512(numerator1, U512::from(sqrt_price_x96), denominator)
}

fn mul_div_rounding_up_512(a: U512, b: U512, denominator: U512) -> U256 {
    // Operands here are bounded by liquidity << 96 (224 bits) and a sqrt
    // price (160 bits), so the product fits in 512 bits.
    let product = a * b;
    let quotient = product / denominator;
    let rounded = if product % denominator > U512::ZERO {
        quotient + U512::from(1u8)
    } else {
        quotient
    };
    rounded.to::<U256>()
}

fn sort_ratios(a: U256, b: U256) -> (U256, U256) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}
