//! arb-pool: immutable pool snapshots and their state-transition functions.
//!
//! Two pool designs are modeled: constant-product (x*y=k with a rational
//! input fee) and concentrated-liquidity (tick-ranged liquidity with Q64.96
//! sqrt prices). Every simulated trade returns a fresh pool value instead of
//! mutating, so speculative branches can hold pre- and post-trade states at
//! the same time.

pub mod concentrated;
pub mod constant_product;
pub mod error;
pub mod price;
pub mod tick_table;
pub mod token;

pub use concentrated::ConcentratedLiquidityPool;
pub use constant_product::ConstantProductPool;
pub use error::PoolError;
pub use price::Price;
pub use tick_table::{TickRecord, TickTable};
pub use token::Token;

/// Pool design tag; drives solver dispatch, never inheritance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PoolKind {
    ConstantProduct,
    ConcentratedLiquidity,
}

impl PoolKind {
    /// Numeric tag used by the settlement contract's packed calldata.
    pub fn as_u8(self) -> u8 {
        match self {
            PoolKind::ConcentratedLiquidity => 0,
            PoolKind::ConstantProduct => 1,
        }
    }
}

impl std::fmt::Display for PoolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolKind::ConstantProduct => write!(f, "constant-product"),
            PoolKind::ConcentratedLiquidity => write!(f, "concentrated-liquidity"),
        }
    }
}
