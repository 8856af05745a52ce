//! Single-step swap settlement, ported from Uniswap V3 `SwapMath.sol`.
//!
//! Two variants are exposed. `compute_swap_step` is the amount-limited form
//! used when simulating a pool swap: the step stops at either the target
//! price or the point where the specified amount runs out.
//! `compute_swap_step_to_price` is the price-target form used by the
//! equilibrium walk: it always settles the full move between two sqrt
//! prices and reports what that move costs and yields.

use alloy::primitives::U256;

use crate::full_math::{mul_div, mul_div_rounding_up};
use crate::sqrt_price_math::{
    get_amount0_delta, get_amount1_delta, get_next_sqrt_price_from_input,
    get_next_sqrt_price_from_output,
};
use crate::MAX_FEE_PIPS;

/// Settlement of one price move at constant liquidity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapStep {
    /// Sqrt price after the step.
    pub sqrt_price_next_x96: U256,
    /// Input consumed by the step, fee excluded.
    pub amount_in: U256,
    /// Output produced by the step.
    pub amount_out: U256,
    /// Fee charged on top of `amount_in`.
    pub fee_amount: U256,
}

/// Computes one amount-limited swap step toward `sqrt_price_target_x96`.
///
/// `exact_in` selects whether `amount_remaining` limits the input (fees
/// included) or the output. Direction is implied by the price ordering:
/// a target below the current price is a token0-for-token1 swap.
pub fn compute_swap_step(
    sqrt_price_current_x96: U256,
    sqrt_price_target_x96: U256,
    liquidity: u128,
    amount_remaining: U256,
    exact_in: bool,
    fee_pips: u32,
) -> SwapStep {
    let zero_for_one = sqrt_price_current_x96 >= sqrt_price_target_x96;
    let fee = U256::from(fee_pips);
    let fee_complement = U256::from(MAX_FEE_PIPS - fee_pips);

    let sqrt_price_next_x96;
    let mut amount_in;
    let mut amount_out;

    if exact_in {
        let amount_remaining_less_fee =
            mul_div(amount_remaining, fee_complement, U256::from(MAX_FEE_PIPS));
        amount_in = if zero_for_one {
            get_amount0_delta(sqrt_price_target_x96, sqrt_price_current_x96, liquidity, true)
        } else {
            get_amount1_delta(sqrt_price_current_x96, sqrt_price_target_x96, liquidity, true)
        };
        sqrt_price_next_x96 = if amount_remaining_less_fee >= amount_in {
            sqrt_price_target_x96
        } else {
            get_next_sqrt_price_from_input(
                sqrt_price_current_x96,
                liquidity,
                amount_remaining_less_fee,
                zero_for_one,
            )
        };
    } else {
        amount_out = if zero_for_one {
            get_amount1_delta(sqrt_price_target_x96, sqrt_price_current_x96, liquidity, false)
        } else {
            get_amount0_delta(sqrt_price_current_x96, sqrt_price_target_x96, liquidity, false)
        };
        sqrt_price_next_x96 = if amount_remaining >= amount_out {
            sqrt_price_target_x96
        } else {
            get_next_sqrt_price_from_output(
                sqrt_price_current_x96,
                liquidity,
                amount_remaining,
                zero_for_one,
            )
            // Unreachable by construction: amount_remaining is below the
            // full-range output computed above.
            .unwrap_or(sqrt_price_target_x96)
        };
    }

    let max = sqrt_price_next_x96 == sqrt_price_target_x96;

    if zero_for_one {
        amount_in = if max && exact_in {
            get_amount0_delta(sqrt_price_target_x96, sqrt_price_current_x96, liquidity, true)
        } else {
            get_amount0_delta(sqrt_price_next_x96, sqrt_price_current_x96, liquidity, true)
        };
        amount_out = get_amount1_delta(sqrt_price_next_x96, sqrt_price_current_x96, liquidity, false);
    } else {
        amount_in = if max && exact_in {
            get_amount1_delta(sqrt_price_current_x96, sqrt_price_target_x96, liquidity, true)
        } else {
            get_amount1_delta(sqrt_price_current_x96, sqrt_price_next_x96, liquidity, true)
        };
        amount_out = get_amount0_delta(sqrt_price_current_x96, sqrt_price_next_x96, liquidity, false);
    }

    if !exact_in && amount_out > amount_remaining {
        amount_out = amount_remaining;
    }

    let fee_amount = if exact_in && !max {
        // The input was exhausted mid-range: everything left over is fee.
        amount_remaining - amount_in
    } else {
        mul_div_rounding_up(amount_in, fee, fee_complement)
    };

    SwapStep {
        sqrt_price_next_x96,
        amount_in,
        amount_out,
        fee_amount,
    }
}

/// Settles the full price move from current to target at constant liquidity.
///
/// Amount-in rounds up, amount-out rounds down, and the fee is
/// `ceil(amount_in * fee_pips / (1e6 - fee_pips))`, exactly as the pool
/// contract charges it.
pub fn compute_swap_step_to_price(
    sqrt_price_current_x96: U256,
    sqrt_price_target_x96: U256,
    liquidity: u128,
    fee_pips: u32,
) -> SwapStep {
    let zero_for_one = sqrt_price_current_x96 >= sqrt_price_target_x96;

    let (amount_in, amount_out) = if zero_for_one {
        (
            get_amount0_delta(sqrt_price_target_x96, sqrt_price_current_x96, liquidity, true),
            get_amount1_delta(sqrt_price_target_x96, sqrt_price_current_x96, liquidity, false),
        )
    } else {
        (
            get_amount1_delta(sqrt_price_current_x96, sqrt_price_target_x96, liquidity, true),
            get_amount0_delta(sqrt_price_current_x96, sqrt_price_target_x96, liquidity, false),
        )
    };

    let fee_amount = mul_div_rounding_up(
        amount_in,
        U256::from(fee_pips),
        U256::from(MAX_FEE_PIPS - fee_pips),
    );

    SwapStep {
        sqrt_price_next_x96: sqrt_price_target_x96,
        amount_in,
        amount_out,
        fee_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tick_math::get_sqrt_ratio_at_tick;

    const LIQUIDITY: u128 = 2_000_000_000_000_000_000;
    const FEE: u32 = 3000;

    #[test]
    fn reaches_target_when_input_is_ample() {
        let current = get_sqrt_ratio_at_tick(0);
        let target = get_sqrt_ratio_at_tick(-1);
        let step = compute_swap_step(
            current,
            target,
            LIQUIDITY,
            U256::from(u128::MAX),
            true,
            FEE,
        );
        assert_eq!(step.sqrt_price_next_x96, target);
        assert!(step.amount_in > U256::ZERO);
        assert!(step.amount_out > U256::ZERO);
        assert!(step.fee_amount > U256::ZERO);
    }

    #[test]
    fn stops_short_when_input_is_small() {
        let current = get_sqrt_ratio_at_tick(0);
        let target = get_sqrt_ratio_at_tick(-100);
        let amount = U256::from(1_000u32);
        let step = compute_swap_step(current, target, LIQUIDITY, amount, true, FEE);
        assert!(step.sqrt_price_next_x96 > target);
        assert!(step.sqrt_price_next_x96 < current);
        // Fee plus input consume exactly the specified amount.
        assert_eq!(step.amount_in + step.fee_amount, amount);
    }

    #[test]
    fn exact_out_never_exceeds_request() {
        let current = get_sqrt_ratio_at_tick(0);
        let target = get_sqrt_ratio_at_tick(-100);
        let requested = U256::from(12_345u32);
        let step = compute_swap_step(current, target, LIQUIDITY, requested, false, FEE);
        assert!(step.amount_out <= requested);
    }

    #[test]
    fn price_target_step_matches_amount_limited_step_at_target() {
        let current = get_sqrt_ratio_at_tick(0);
        let target = get_sqrt_ratio_at_tick(-1);
        let to_price = compute_swap_step_to_price(current, target, LIQUIDITY, FEE);
        let limited = compute_swap_step(
            current,
            target,
            LIQUIDITY,
            U256::from(u128::MAX),
            true,
            FEE,
        );
        assert_eq!(to_price, limited);
    }

    #[test]
    fn zero_fee_charges_nothing() {
        let current = get_sqrt_ratio_at_tick(0);
        let target = get_sqrt_ratio_at_tick(-1);
        let step = compute_swap_step_to_price(current, target, LIQUIDITY, 0);
        assert_eq!(step.fee_amount, U256::ZERO);
    }
}
