//! Kind dispatch: picks the trade direction and the matching solver.

use alloy::primitives::Address;
use arb_pool::price::Price;
use arb_pool::{ConcentratedLiquidityPool, ConstantProductPool, PoolError, PoolKind, Token};
use tracing::info;

use crate::error::BalanceError;
use crate::result::EquilibriumResult;
use crate::{closed_form, tick_walk};

/// A pool of either supported kind. Closed union: the dispatcher matches
/// exhaustively, so an unhandled combination cannot slip through at runtime.
#[derive(Clone, Debug)]
pub enum Pool {
    ConstantProduct(ConstantProductPool),
    ConcentratedLiquidity(ConcentratedLiquidityPool),
}

impl Pool {
    pub fn kind(&self) -> PoolKind {
        match self {
            Pool::ConstantProduct(_) => PoolKind::ConstantProduct,
            Pool::ConcentratedLiquidity(_) => PoolKind::ConcentratedLiquidity,
        }
    }

    pub fn address(&self) -> Address {
        match self {
            Pool::ConstantProduct(pool) => pool.address(),
            Pool::ConcentratedLiquidity(pool) => pool.address(),
        }
    }

    pub fn involves(&self, token: &Token) -> bool {
        match self {
            Pool::ConstantProduct(pool) => pool.involves(token),
            Pool::ConcentratedLiquidity(pool) => pool.involves(token),
        }
    }

    pub fn other_token(&self, token: &Token) -> Result<&Token, PoolError> {
        match self {
            Pool::ConstantProduct(pool) => pool.other_token(token),
            Pool::ConcentratedLiquidity(pool) => pool.other_token(token),
        }
    }

    pub fn price_of(&self, token: &Token) -> Result<Price, PoolError> {
        match self {
            Pool::ConstantProduct(pool) => pool.price_of(token),
            Pool::ConcentratedLiquidity(pool) => pool.price_of(token),
        }
    }
}

/// Balances two pools trading the same pair, entering with `reference`.
///
/// The pool quoting the intermediate token cheaper is the entry side; the
/// direction comes from the price comparison alone, so swapping the
/// arguments yields the same result.
pub fn balance(
    pool_x: &Pool,
    pool_y: &Pool,
    reference: &Token,
) -> Result<EquilibriumResult, BalanceError> {
    let intermediate = pool_x.other_token(reference)?;
    if !pool_y.involves(intermediate) || !pool_y.involves(reference) {
        return Err(BalanceError::InvalidPool("pools do not share a token pair"));
    }

    let price_x = pool_x.price_of(intermediate)?;
    let price_y = pool_y.price_of(intermediate)?;
    let (from, to) = if price_x < price_y {
        (pool_x, pool_y)
    } else {
        (pool_y, pool_x)
    };
    info!(
        from = %from.address(),
        to = %to.address(),
        reference = %reference.symbol,
        "balancing pool pair"
    );

    match (from, to) {
        (Pool::ConstantProduct(from), Pool::ConstantProduct(to)) => {
            closed_form::balance(from, to, reference)
        }
        (Pool::ConstantProduct(from), Pool::ConcentratedLiquidity(to)) => {
            tick_walk::balance_constant_product_to_concentrated(from, to, reference)
        }
        (Pool::ConcentratedLiquidity(from), Pool::ConstantProduct(to)) => {
            tick_walk::balance_concentrated_to_constant_product(from, to, reference)
        }
        (Pool::ConcentratedLiquidity(_), Pool::ConcentratedLiquidity(_)) => {
            Err(BalanceError::UnsupportedPair(from.kind(), to.kind()))
        }
    }
}
