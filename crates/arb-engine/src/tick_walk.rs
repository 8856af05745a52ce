//! Iterative equilibrium between a constant-product pair and a
//! concentrated-liquidity pool.
//!
//! The walk moves the concentrated pool one tick at a time toward the
//! pair's price, settling each price move with the price-target swap step
//! and re-quoting the pair after every step. Profit as a function of the
//! walked distance is concave (fees turn the curve down past the optimum),
//! so the walk stops the first time a step's profit drops below the
//! previous step's, and reports the previous step's amounts.
//!
//! When one more tick crossing would push the pair's price past the
//! concentrated pool's, the walk instead snaps the pair directly onto the
//! tick price by solving the pair's fixed-point quadratic for the exact
//! input, and settles the final amounts from that.

use alloy::primitives::{U256, U512};
use arb_math::liquidity_math::add_delta;
use arb_math::swap_math::compute_swap_step_to_price;
use arb_math::tick_math::{get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio, MAX_TICK, MIN_TICK};
use arb_math::{biguint_to_u256, isqrt, u256_to_biguint};
use arb_pool::price::{price_to_best_tick, tick_to_price, Price};
use arb_pool::{ConcentratedLiquidityPool, ConstantProductPool, Token};
use num_bigint::BigInt;
use tracing::debug;

use crate::error::BalanceError;
use crate::result::EquilibriumResult;

/// Unit-tick stepping: the bound is the whole tick span.
const MAX_WALK_ITERATIONS: u64 = (MAX_TICK - MIN_TICK) as u64 + 2;

/// Whether `previous` profit beats `current`, with each profit given as
/// `(amount_out, amount_in)`. Cross-adding keeps everything unsigned even
/// when either profit is negative.
fn profit_decreased(previous: (U256, U256), current: (U256, U256)) -> bool {
    U512::from(previous.0) + U512::from(current.1)
        > U512::from(current.0) + U512::from(previous.1)
}

/// Input of the reserve-in token that moves a constant-product pair's
/// marginal price to `target_price` (quoted as output token per input
/// token). Larger root of the quadratic from
/// `(reserveOut - out(x)) / (reserveIn + x) = target`; zero when the pair
/// already sits at or past the target.
fn input_to_reach_price(
    reserve_in: U256,
    reserve_out: U256,
    target_price: &Price,
    fee_numerator: u32,
    fee_denominator: u32,
) -> U256 {
    let r_in = BigInt::from(u256_to_biguint(reserve_in));
    let r_out = BigInt::from(u256_to_biguint(reserve_out));
    let t_num = BigInt::from(target_price.numerator().clone());
    let t_den = BigInt::from(target_price.denominator().clone());
    let fee_num = BigInt::from(fee_numerator);
    let fee_den = BigInt::from(fee_denominator);

    let left = &r_in * (-(&fee_num) - &fee_den) * &t_num;
    let discriminant = &t_num
        * &r_in
        * (&t_num * &r_in * (&fee_num * &fee_num + &fee_den * &fee_den)
            + &fee_num
                * &fee_den
                * (BigInt::from(4u8) * &r_out * &t_den - BigInt::from(2u8) * &r_in * &t_num));
    let root_term = match discriminant.to_biguint() {
        Some(d) => BigInt::from(isqrt(&d)),
        None => return U256::ZERO,
    };
    let denominator = BigInt::from(2u8) * fee_num * t_num;
    // The larger of the two roots; division truncates toward zero.
    let root = (left + root_term) / denominator;
    match root.to_biguint() {
        Some(x) => biguint_to_u256(&x),
        None => U256::ZERO,
    }
}

/// Balances reference token `token_a` through the constant-product `pair`
/// first, selling the intermediate token into the concentrated `pool`.
pub fn balance_constant_product_to_concentrated(
    pair: &ConstantProductPool,
    pool: &ConcentratedLiquidityPool,
    token_a: &Token,
) -> Result<EquilibriumResult, BalanceError> {
    let token_b = pool.other_token(token_a)?.clone();
    // Selling token B into the pool pushes its token-B price down; if B is
    // token0 that means walking toward lower ticks.
    let walking_left = token_b == *pool.token0();

    let pair_price = pair.price_of(&token_b)?;
    let tick_best =
        price_to_best_tick(&pair_price, walking_left, pool.tick_spacing(), walking_left);
    let sqrt_price_final_x96 = get_sqrt_ratio_at_tick(tick_best);
    if sqrt_price_final_x96 == pool.sqrt_price_x96() {
        // The pools already agree on the price: nothing to walk.
        return Err(BalanceError::NotProfitable);
    }

    debug!(
        from = %pair.address(),
        to = %pool.address(),
        pool_tick = pool.tick(),
        target_tick = tick_best,
        "balancing constant-product into concentrated-liquidity"
    );

    let mut amount_a = U256::ZERO;
    let mut amount_b = U256::ZERO;
    let mut amount_c = U256::ZERO;
    let mut sqrt_price_x96 = pool.sqrt_price_x96();
    let mut tick = pool.tick();
    let mut liquidity = pool.liquidity();
    let mut previous = (U256::ZERO, U256::ZERO);
    let mut iterations = 0u64;

    loop {
        iterations += 1;
        if iterations > MAX_WALK_ITERATIONS {
            return Err(BalanceError::MaxIterationsExceeded(MAX_WALK_ITERATIONS));
        }

        let sqrt_price_start_x96 = sqrt_price_x96;
        let tick_next = (tick + if walking_left { -1 } else { 1 }).clamp(MIN_TICK, MAX_TICK);
        let sqrt_price_next_x96 = get_sqrt_ratio_at_tick(tick_next);
        let next_pool_price = tick_to_price(tick_next, walking_left);

        // Do not step past the pair's price: clamp the target to the tick
        // closest to it when the next tick would overshoot.
        let target_sqrt_x96 = if next_pool_price < pair_price {
            sqrt_price_final_x96
        } else {
            sqrt_price_next_x96
        };

        let step =
            compute_swap_step_to_price(sqrt_price_x96, target_sqrt_x96, liquidity, pool.fee_pips());
        sqrt_price_x96 = step.sqrt_price_next_x96;
        amount_b += step.amount_in + step.fee_amount;
        amount_c += step.amount_out;
        let (required_a, pair_updated) = pair.get_input_amount(&token_b, amount_b)?;
        amount_a = required_a;

        if profit_decreased(previous, (amount_c, amount_a)) {
            let (amount_c_prev, amount_a_prev) = previous;
            if amount_c_prev <= amount_a_prev {
                return Err(BalanceError::NotProfitable);
            }
            debug!(iterations, "profit turned down, keeping previous step");
            return Ok(EquilibriumResult {
                from: pair.into(),
                to: pool.into(),
                amount_in: amount_a_prev,
                profit: amount_c_prev - amount_a_prev,
            });
        }
        previous = (amount_c, amount_a);

        // Crossing the whole tick would push the pair past the pool: snap
        // the pair onto the tick price and settle the final amounts.
        if pair_updated.price_of(&token_b)? > next_pool_price
            && target_sqrt_x96 != sqrt_price_final_x96
        {
            debug!(iterations, "pool boundary reached, snapping pair to tick price");
            amount_a = input_to_reach_price(
                pair.reserve_of(token_a)?,
                pair.reserve_of(&token_b)?,
                &next_pool_price.invert(),
                pair.fee_numerator(),
                pair.fee_denominator(),
            );
            if amount_a.is_zero() {
                return Err(BalanceError::NotProfitable);
            }
            let (out_b, _) = pair.get_output_amount(token_a, amount_a)?;
            amount_b = out_b;
            let (out_c, _) = pool.get_output_amount(&token_b, amount_b)?;
            amount_c = out_c;
            break;
        }

        if sqrt_price_final_x96 == sqrt_price_x96 {
            debug!(iterations, "equilibrium met");
            break;
        }

        if sqrt_price_x96 == sqrt_price_next_x96 {
            let net = pool.ticks().liquidity_net(tick_next);
            if net != 0 {
                // Leftward crossings apply the net with the opposite sign.
                let net = if walking_left { -net } else { net };
                liquidity = add_delta(liquidity, net)
                    .ok_or(BalanceError::InvalidPool("tick table contradicts liquidity"))?;
            }
            tick = tick_next;
        } else if sqrt_price_x96 != sqrt_price_start_x96 {
            tick = get_tick_at_sqrt_ratio(sqrt_price_x96);
        }
    }

    if amount_c <= amount_a {
        return Err(BalanceError::NotProfitable);
    }
    let profit = amount_c - amount_a;
    debug!(amount_in = %amount_a, %profit, "walk finished");
    Ok(EquilibriumResult {
        from: pair.into(),
        to: pool.into(),
        amount_in: amount_a,
        profit,
    })
}

/// Balances reference token `token_a` through the concentrated `pool`
/// first, selling the intermediate token into the constant-product `pair`.
pub fn balance_concentrated_to_constant_product(
    pool: &ConcentratedLiquidityPool,
    pair: &ConstantProductPool,
    token_a: &Token,
) -> Result<EquilibriumResult, BalanceError> {
    let token_b = pool.other_token(token_a)?.clone();
    // Buying token B out of the pool with token A; if A is token0 the
    // price walks toward lower ticks.
    let walking_left = *token_a == *pool.token0();

    let pair_price = pair.price_of(&token_b)?;
    let tick_best =
        price_to_best_tick(&pair_price, !walking_left, pool.tick_spacing(), walking_left);
    let sqrt_price_final_x96 = get_sqrt_ratio_at_tick(tick_best);
    if sqrt_price_final_x96 == pool.sqrt_price_x96() {
        // The pools already agree on the price: nothing to walk.
        return Err(BalanceError::NotProfitable);
    }

    debug!(
        from = %pool.address(),
        to = %pair.address(),
        pool_tick = pool.tick(),
        target_tick = tick_best,
        "balancing concentrated-liquidity into constant-product"
    );

    let mut amount_a = U256::ZERO;
    let mut amount_b = U256::ZERO;
    let mut amount_c = U256::ZERO;
    let mut sqrt_price_x96 = pool.sqrt_price_x96();
    let mut tick = pool.tick();
    let mut liquidity = pool.liquidity();
    let mut previous = (U256::ZERO, U256::ZERO);
    let mut iterations = 0u64;

    loop {
        iterations += 1;
        if iterations > MAX_WALK_ITERATIONS {
            return Err(BalanceError::MaxIterationsExceeded(MAX_WALK_ITERATIONS));
        }

        let sqrt_price_start_x96 = sqrt_price_x96;
        let tick_next = (tick + if walking_left { -1 } else { 1 }).clamp(MIN_TICK, MAX_TICK);
        let sqrt_price_next_x96 = get_sqrt_ratio_at_tick(tick_next);
        let next_pool_price = tick_to_price(tick_next, !walking_left);

        let target_sqrt_x96 = if next_pool_price > pair_price {
            sqrt_price_final_x96
        } else {
            sqrt_price_next_x96
        };

        let step =
            compute_swap_step_to_price(sqrt_price_x96, target_sqrt_x96, liquidity, pool.fee_pips());
        sqrt_price_x96 = step.sqrt_price_next_x96;
        amount_a += step.amount_in + step.fee_amount;
        amount_b += step.amount_out;
        let (out_c, pair_updated) = pair.get_output_amount(&token_b, amount_b)?;
        amount_c = out_c;

        if profit_decreased(previous, (amount_c, amount_a)) {
            let (amount_c_prev, amount_a_prev) = previous;
            if amount_c_prev <= amount_a_prev {
                return Err(BalanceError::NotProfitable);
            }
            debug!(iterations, "profit turned down, keeping previous step");
            return Ok(EquilibriumResult {
                from: pool.into(),
                to: pair.into(),
                amount_in: amount_a_prev,
                profit: amount_c_prev - amount_a_prev,
            });
        }
        previous = (amount_c, amount_a);

        if pair_updated.price_of(&token_b)? < next_pool_price {
            debug!(iterations, "pool boundary reached, snapping pair to tick price");
            let target_price = tick_to_price(tick, !walking_left);
            amount_b = input_to_reach_price(
                pair.reserve_of(&token_b)?,
                pair.reserve_of(token_a)?,
                &target_price,
                pair.fee_numerator(),
                pair.fee_denominator(),
            );
            if amount_b.is_zero() {
                return Err(BalanceError::NotProfitable);
            }
            let (out_c, _) = pair.get_output_amount(&token_b, amount_b)?;
            amount_c = out_c;
            let (in_a, _) = pool.get_input_amount(&token_b, amount_b)?;
            amount_a = in_a;
            break;
        }

        if sqrt_price_final_x96 == sqrt_price_x96 {
            debug!(iterations, "equilibrium met");
            break;
        }

        if sqrt_price_x96 == sqrt_price_next_x96 {
            let net = pool.ticks().liquidity_net(tick_next);
            if net != 0 {
                let net = if walking_left { -net } else { net };
                liquidity = add_delta(liquidity, net)
                    .ok_or(BalanceError::InvalidPool("tick table contradicts liquidity"))?;
            }
            tick = tick_next;
        } else if sqrt_price_x96 != sqrt_price_start_x96 {
            tick = get_tick_at_sqrt_ratio(sqrt_price_x96);
        }
    }

    if amount_c <= amount_a {
        return Err(BalanceError::NotProfitable);
    }
    let profit = amount_c - amount_a;
    debug!(amount_in = %amount_a, %profit, "walk finished");
    Ok(EquilibriumResult {
        from: pool.into(),
        to: pair.into(),
        amount_in: amount_a,
        profit,
    })
}
