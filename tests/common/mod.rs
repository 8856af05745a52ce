//! Shared pool factories for the integration tests.

#![allow(dead_code)]

use alloy::primitives::{address, Address, U256};
use arb_engine::Pool;
use arb_math::tick_math::{get_sqrt_ratio_at_tick, MAX_TICK, MIN_TICK};
use arb_pool::{ConcentratedLiquidityPool, ConstantProductPool, TickRecord, TickTable, Token};

pub fn usdc() -> Token {
    Token::new(
        1,
        address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
        6,
        "USDC",
    )
}

pub fn weth() -> Token {
    Token::new(
        1,
        address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
        18,
        "WETH",
    )
}

pub fn dai() -> Token {
    Token::new(
        1,
        address!("6B175474E89094C44Da98b954EedeAC495271d0F"),
        18,
        "DAI",
    )
}

/// A 0.3% USDC/WETH constant-product pair. USDC sorts first, so
/// `reserve0` is the USDC side.
pub fn pair(tag: u8, reserve0: u64, reserve1: u64) -> ConstantProductPool {
    pair_with_fee(tag, reserve0, reserve1, 997, 1000)
}

pub fn pair_with_fee(
    tag: u8,
    reserve0: u64,
    reserve1: u64,
    fee_numerator: u32,
    fee_denominator: u32,
) -> ConstantProductPool {
    ConstantProductPool::new(
        Address::repeat_byte(tag),
        usdc(),
        weth(),
        U256::from(reserve0),
        U256::from(reserve1),
        fee_numerator,
        fee_denominator,
    )
    .expect("valid test pair")
}

/// A 0.3% USDC/WETH concentrated-liquidity pool with all of `liquidity`
/// spread across the full tick range.
pub fn concentrated(tag: u8, tick: i32, liquidity: u128) -> ConcentratedLiquidityPool {
    let ticks = TickTable::new(vec![
        TickRecord {
            index: MIN_TICK,
            liquidity_net: liquidity as i128,
            liquidity_gross: liquidity,
        },
        TickRecord {
            index: MAX_TICK,
            liquidity_net: -(liquidity as i128),
            liquidity_gross: liquidity,
        },
    ]);
    ConcentratedLiquidityPool::new(
        Address::repeat_byte(tag),
        usdc(),
        weth(),
        3000,
        60,
        get_sqrt_ratio_at_tick(tick),
        tick,
        liquidity,
        ticks,
    )
    .expect("valid test pool")
}

pub fn cp(pool: ConstantProductPool) -> Pool {
    Pool::ConstantProduct(pool)
}

pub fn cl(pool: ConcentratedLiquidityPool) -> Pool {
    Pool::ConcentratedLiquidity(pool)
}
