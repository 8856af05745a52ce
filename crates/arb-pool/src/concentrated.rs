//! Concentrated-liquidity pool: tick-ranged liquidity over a Q64.96 sqrt
//! price, settled step by step with the `SwapMath` kernels.

use alloy::primitives::{Address, U256};

use arb_math::liquidity_math::add_delta;
use arb_math::swap_math::compute_swap_step;
use arb_math::tick_math::{
    get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio, MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO,
    MIN_TICK,
};
use arb_math::MAX_FEE_PIPS;

use crate::error::PoolError;
use crate::price::Price;
use crate::tick_table::TickTable;
use crate::token::Token;

/// Immutable snapshot of a concentrated-liquidity pool.
///
/// Trades return a fresh pool value carrying the post-trade price, tick and
/// in-range liquidity; the tick table is shared unchanged.
#[derive(Clone, Debug)]
pub struct ConcentratedLiquidityPool {
    address: Address,
    token0: Token,
    token1: Token,
    fee_pips: u32,
    tick_spacing: i32,
    sqrt_price_x96: U256,
    tick: i32,
    liquidity: u128,
    ticks: TickTable,
}

/// Running state of one multi-tick swap.
struct SwapState {
    amount_remaining: U256,
    amount_calculated: U256,
    sqrt_price_x96: U256,
    tick: i32,
    liquidity: u128,
}

impl ConcentratedLiquidityPool {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        address: Address,
        token0: Token,
        token1: Token,
        fee_pips: u32,
        tick_spacing: i32,
        sqrt_price_x96: U256,
        tick: i32,
        liquidity: u128,
        ticks: TickTable,
    ) -> Result<Self, PoolError> {
        if !token0.sorts_before(&token1) {
            return Err(PoolError::InvalidPool("tokens not in canonical order"));
        }
        if fee_pips >= MAX_FEE_PIPS {
            return Err(PoolError::InvalidPool("fee at or above 100%"));
        }
        if tick_spacing <= 0 {
            return Err(PoolError::InvalidPool("non-positive tick spacing"));
        }
        if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
            return Err(PoolError::InvalidPool("sqrt price out of range"));
        }
        if !(MIN_TICK..=MAX_TICK).contains(&tick) {
            return Err(PoolError::InvalidPool("tick out of range"));
        }
        // The stored tick must bracket the stored price.
        if sqrt_price_x96 < get_sqrt_ratio_at_tick(tick)
            || (tick < MAX_TICK && sqrt_price_x96 > get_sqrt_ratio_at_tick(tick + 1))
        {
            return Err(PoolError::InvalidPool("tick inconsistent with sqrt price"));
        }
        Ok(Self {
            address,
            token0,
            token1,
            fee_pips,
            tick_spacing,
            sqrt_price_x96,
            tick,
            liquidity,
            ticks,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn token0(&self) -> &Token {
        &self.token0
    }

    pub fn token1(&self) -> &Token {
        &self.token1
    }

    pub fn fee_pips(&self) -> u32 {
        self.fee_pips
    }

    pub fn tick_spacing(&self) -> i32 {
        self.tick_spacing
    }

    pub fn sqrt_price_x96(&self) -> U256 {
        self.sqrt_price_x96
    }

    pub fn tick(&self) -> i32 {
        self.tick
    }

    pub fn liquidity(&self) -> u128 {
        self.liquidity
    }

    pub fn ticks(&self) -> &TickTable {
        &self.ticks
    }

    pub fn involves(&self, token: &Token) -> bool {
        *token == self.token0 || *token == self.token1
    }

    pub fn other_token(&self, token: &Token) -> Result<&Token, PoolError> {
        if *token == self.token0 {
            Ok(&self.token1)
        } else if *token == self.token1 {
            Ok(&self.token0)
        } else {
            Err(PoolError::InvalidPool("token not in pool"))
        }
    }

    /// Mid price of `token` in units of the other token, taken from the
    /// current sqrt price.
    pub fn price_of(&self, token: &Token) -> Result<Price, PoolError> {
        let price0 = Price::from_sqrt_ratio_x96(self.sqrt_price_x96);
        if *token == self.token0 {
            Ok(price0)
        } else if *token == self.token1 {
            Ok(price0.invert())
        } else {
            Err(PoolError::InvalidPool("token not in pool"))
        }
    }

    /// Output for an exact input of `amount_in` units of `input_token`.
    ///
    /// Walks ticks until the input is fully consumed; if the pool runs out
    /// of price range first the swap fails rather than filling partially.
    pub fn get_output_amount(
        &self,
        input_token: &Token,
        amount_in: U256,
    ) -> Result<(U256, ConcentratedLiquidityPool), PoolError> {
        if !self.involves(input_token) {
            return Err(PoolError::InvalidPool("token not in pool"));
        }
        let zero_for_one = *input_token == self.token0;
        self.swap(zero_for_one, amount_in, true)
    }

    /// Input required for an exact output of `amount_out` units of
    /// `output_token`, fee included.
    pub fn get_input_amount(
        &self,
        output_token: &Token,
        amount_out: U256,
    ) -> Result<(U256, ConcentratedLiquidityPool), PoolError> {
        if !self.involves(output_token) {
            return Err(PoolError::InvalidPool("token not in pool"));
        }
        let zero_for_one = *output_token == self.token1;
        self.swap(zero_for_one, amount_out, false)
    }

    fn swap(
        &self,
        zero_for_one: bool,
        amount_specified: U256,
        exact_in: bool,
    ) -> Result<(U256, ConcentratedLiquidityPool), PoolError> {
        if amount_specified.is_zero() {
            return Err(PoolError::InsufficientLiquidity);
        }
        let sqrt_price_limit_x96 = if zero_for_one {
            MIN_SQRT_RATIO + U256::from(1u8)
        } else {
            MAX_SQRT_RATIO - U256::from(1u8)
        };

        let mut state = SwapState {
            amount_remaining: amount_specified,
            amount_calculated: U256::ZERO,
            sqrt_price_x96: self.sqrt_price_x96,
            tick: self.tick,
            liquidity: self.liquidity,
        };

        // Every iteration either exhausts the amount or crosses toward the
        // price limit, so the tick span bounds the loop; running past it
        // means the snapshot's tick table is corrupt.
        let max_iterations =
            (i64::from(MAX_TICK - MIN_TICK) / i64::from(self.tick_spacing) + 2) as u64;
        let mut iterations = 0u64;

        while !state.amount_remaining.is_zero() && state.sqrt_price_x96 != sqrt_price_limit_x96 {
            iterations += 1;
            if iterations > max_iterations {
                return Err(PoolError::MaxIterationsExceeded(max_iterations));
            }

            let next = self.ticks.next_initialized_tick(state.tick, zero_for_one);
            let (tick_next, initialized) = match next {
                Some(record) => (record.index.clamp(MIN_TICK, MAX_TICK), true),
                None => (if zero_for_one { MIN_TICK } else { MAX_TICK }, false),
            };

            let sqrt_price_next_x96 = get_sqrt_ratio_at_tick(tick_next);
            let target = if zero_for_one {
                sqrt_price_next_x96.max(sqrt_price_limit_x96)
            } else {
                sqrt_price_next_x96.min(sqrt_price_limit_x96)
            };

            let step = compute_swap_step(
                state.sqrt_price_x96,
                target,
                state.liquidity,
                state.amount_remaining,
                exact_in,
                self.fee_pips,
            );
            let prev_sqrt_price = state.sqrt_price_x96;
            state.sqrt_price_x96 = step.sqrt_price_next_x96;

            if exact_in {
                state.amount_remaining = state
                    .amount_remaining
                    .saturating_sub(step.amount_in + step.fee_amount);
                state.amount_calculated += step.amount_out;
            } else {
                state.amount_remaining = state.amount_remaining.saturating_sub(step.amount_out);
                state.amount_calculated += step.amount_in + step.fee_amount;
            }

            if state.sqrt_price_x96 == sqrt_price_next_x96 {
                if initialized {
                    let liquidity_net = if zero_for_one {
                        -self.ticks.liquidity_net(tick_next)
                    } else {
                        self.ticks.liquidity_net(tick_next)
                    };
                    state.liquidity = add_delta(state.liquidity, liquidity_net)
                        .ok_or(PoolError::InvalidPool("tick table contradicts liquidity"))?;
                }
                state.tick = if zero_for_one { tick_next - 1 } else { tick_next };
            } else if state.sqrt_price_x96 != prev_sqrt_price {
                state.tick = get_tick_at_sqrt_ratio(state.sqrt_price_x96);
            }
        }

        if !state.amount_remaining.is_zero() {
            return Err(PoolError::InsufficientLiquidity);
        }

        let mut next_pool = self.clone();
        next_pool.sqrt_price_x96 = state.sqrt_price_x96;
        next_pool.tick = state.tick.clamp(MIN_TICK, MAX_TICK);
        next_pool.liquidity = state.liquidity;
        Ok((state.amount_calculated, next_pool))
    }
}
