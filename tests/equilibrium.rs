//! End-to-end balancing of two constant-product pools.

mod common;

use alloy::primitives::{Address, U256};
use arb_engine::{balance, BalanceError};
use arb_pool::ConstantProductPool;
use common::{cp, dai, pair, usdc, weth};

#[test]
fn enters_through_the_pool_where_the_intermediate_is_cheaper() {
    // Pool 0x22 gives more WETH per USDC, so the round trip starts there.
    let pool_x = pair(0x11, 1_000_000, 500_000);
    let pool_y = pair(0x22, 1_000_000, 520_000);

    let result = balance(&cp(pool_x.clone()), &cp(pool_y.clone()), &usdc()).unwrap();
    assert_eq!(result.from.address(), pool_y.address());
    assert_eq!(result.to.address(), pool_x.address());
    assert!(result.amount_in > U256::ZERO);
    assert!(result.profit > U256::ZERO);

    // The sized trade must re-simulate to exactly the reported profit.
    let (intermediate, _) = pool_y.get_output_amount(&usdc(), result.amount_in).unwrap();
    let (back, _) = pool_x.get_output_amount(&weth(), intermediate).unwrap();
    assert_eq!(back - result.amount_in, result.profit);
}

#[test]
fn argument_order_does_not_matter() {
    let pool_x = cp(pair(0x11, 1_000_000, 500_000));
    let pool_y = cp(pair(0x22, 1_000_000, 520_000));

    let forward = balance(&pool_x, &pool_y, &usdc()).unwrap();
    let reversed = balance(&pool_y, &pool_x, &usdc()).unwrap();
    assert_eq!(forward, reversed);
}

#[test]
fn identical_pools_are_not_profitable() {
    let pool_x = cp(pair(0x11, 1_000_000, 500_000));
    let pool_y = cp(pair(0x22, 1_000_000, 500_000));

    let err = balance(&pool_x, &pool_y, &usdc()).unwrap_err();
    assert_eq!(err, BalanceError::NotProfitable);
}

#[test]
fn pools_must_share_the_token_pair() {
    let pool_x = cp(pair(0x11, 1_000_000, 500_000));
    let other_pair = ConstantProductPool::new(
        Address::repeat_byte(0x22),
        dai(),
        weth(),
        U256::from(1_000_000u64),
        U256::from(500_000u64),
        997,
        1000,
    )
    .unwrap();

    let err = balance(&pool_x, &cp(other_pair), &usdc()).unwrap_err();
    assert!(matches!(err, BalanceError::InvalidPool(_)));
}

#[test]
fn reference_token_outside_the_pools_is_rejected() {
    let pool_x = cp(pair(0x11, 1_000_000, 500_000));
    let pool_y = cp(pair(0x22, 1_000_000, 520_000));

    let err = balance(&pool_x, &pool_y, &dai()).unwrap_err();
    assert!(matches!(err, BalanceError::InvalidPool(_)));
}
