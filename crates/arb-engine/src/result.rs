//! Solver output consumed by the calldata encoder.

use alloy::primitives::{Address, U256};
use arb_pool::{ConcentratedLiquidityPool, ConstantProductPool, PoolKind};

/// Per-leg pool metadata.
///
/// A tagged union rather than optional fee fields: constant-product legs
/// always carry their fee rational, concentrated legs never do, and the
/// encoder has to match on the kind instead of unwrapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolLegInfo {
    ConstantProduct {
        address: Address,
        fee_numerator: u32,
        fee_denominator: u32,
    },
    ConcentratedLiquidity {
        address: Address,
    },
}

impl PoolLegInfo {
    pub fn address(&self) -> Address {
        match self {
            PoolLegInfo::ConstantProduct { address, .. } => *address,
            PoolLegInfo::ConcentratedLiquidity { address } => *address,
        }
    }

    pub fn kind(&self) -> PoolKind {
        match self {
            PoolLegInfo::ConstantProduct { .. } => PoolKind::ConstantProduct,
            PoolLegInfo::ConcentratedLiquidity { .. } => PoolKind::ConcentratedLiquidity,
        }
    }
}

impl From<&ConstantProductPool> for PoolLegInfo {
    fn from(pool: &ConstantProductPool) -> Self {
        PoolLegInfo::ConstantProduct {
            address: pool.address(),
            fee_numerator: pool.fee_numerator(),
            fee_denominator: pool.fee_denominator(),
        }
    }
}

impl From<&ConcentratedLiquidityPool> for PoolLegInfo {
    fn from(pool: &ConcentratedLiquidityPool) -> Self {
        PoolLegInfo::ConcentratedLiquidity {
            address: pool.address(),
        }
    }
}

/// A balanced arbitrage: trade `amount_in` of the reference token into
/// `from`, route the proceeds through `to`, and keep `profit` on top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EquilibriumResult {
    pub from: PoolLegInfo,
    pub to: PoolLegInfo,
    pub amount_in: U256,
    pub profit: U256,
}
