//! Balancing a constant-product pair against a concentrated-liquidity
//! pool, in both directions.

mod common;

use alloy::primitives::U256;
use arb_engine::{balance, BalanceError};
use arb_pool::PoolKind;
use common::{cl, concentrated, cp, pair, usdc};

const DEEP_LIQUIDITY: u128 = 20_000_000_000;

#[test]
fn enters_through_the_pair_when_it_quotes_cheaper() {
    // WETH at ~0.98 USDC on the pair against 1.0 on the pool.
    let pool_cp = pair(0x11, 1_000_000_000, 1_020_000_000);
    let pool_cl = concentrated(0x22, 0, DEEP_LIQUIDITY);

    let result = balance(&cp(pool_cp.clone()), &cl(pool_cl), &usdc()).unwrap();
    assert_eq!(result.from.address(), pool_cp.address());
    assert_eq!(result.from.kind(), PoolKind::ConstantProduct);
    assert_eq!(result.to.kind(), PoolKind::ConcentratedLiquidity);
    assert!(result.amount_in > U256::ZERO);
    assert!(result.profit > U256::ZERO);
}

#[test]
fn enters_through_the_pool_when_it_quotes_cheaper() {
    // WETH at ~1.02 USDC on the pair against 1.0 on the pool.
    let pool_cp = pair(0x11, 1_000_000_000, 980_000_000);
    let pool_cl = concentrated(0x22, 0, DEEP_LIQUIDITY);

    let result = balance(&cp(pool_cp), &cl(pool_cl.clone()), &usdc()).unwrap();
    assert_eq!(result.from.address(), pool_cl.address());
    assert_eq!(result.from.kind(), PoolKind::ConcentratedLiquidity);
    assert_eq!(result.to.kind(), PoolKind::ConstantProduct);
    assert!(result.amount_in > U256::ZERO);
    assert!(result.profit > U256::ZERO);
}

#[test]
fn argument_order_does_not_matter() {
    let pool_cp = cp(pair(0x11, 1_000_000_000, 1_020_000_000));
    let pool_cl = cl(concentrated(0x22, 0, DEEP_LIQUIDITY));

    let forward = balance(&pool_cp, &pool_cl, &usdc()).unwrap();
    let reversed = balance(&pool_cl, &pool_cp, &usdc()).unwrap();
    assert_eq!(forward, reversed);
}

#[test]
fn equal_prices_terminate_on_the_first_iteration() {
    // Pair priced exactly at the pool's tick-0 price: no distance to walk.
    let pool_cp = cp(pair(0x11, 1_000_000, 1_000_000));
    let pool_cl = cl(concentrated(0x22, 0, DEEP_LIQUIDITY));

    let err = balance(&pool_cp, &pool_cl, &usdc()).unwrap_err();
    assert_eq!(err, BalanceError::NotProfitable);
}

#[test]
fn spread_inside_the_fee_band_is_not_profitable() {
    // A 0.1% price gap cannot pay for two 0.3% fees.
    let pool_cp = cp(pair(0x11, 1_000_000_000, 999_000_000));
    let pool_cl = cl(concentrated(0x22, 0, DEEP_LIQUIDITY));

    let err = balance(&pool_cp, &pool_cl, &usdc()).unwrap_err();
    assert_eq!(err, BalanceError::NotProfitable);
}

#[test]
fn two_concentrated_pools_are_rejected() {
    let pool_x = cl(concentrated(0x11, 0, DEEP_LIQUIDITY));
    let pool_y = cl(concentrated(0x22, 100, DEEP_LIQUIDITY));

    let err = balance(&pool_x, &pool_y, &usdc()).unwrap_err();
    assert!(matches!(err, BalanceError::UnsupportedPair(_, _)));
}
