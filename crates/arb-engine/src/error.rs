//! Solver failures; every variant is an expected, droppable outcome.

use arb_pool::{PoolError, PoolKind};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BalanceError {
    /// The maximum achievable profit is not positive; drop the candidate.
    #[error("maximum achievable profit is not positive")]
    NotProfitable,

    /// No solver exists for this pool-kind combination.
    #[error("no solver for pool kinds {0} / {1}")]
    UnsupportedPair(PoolKind, PoolKind),

    /// A simulated swap ran out of reserve or in-range liquidity.
    #[error("insufficient liquidity while simulating the trade")]
    InsufficientLiquidity,

    /// A pool snapshot violated its own invariants mid-simulation.
    #[error("invalid pool state: {0}")]
    InvalidPool(&'static str),

    /// The equilibrium walk overran its tick-span bound.
    #[error("equilibrium walk exceeded {0} iterations")]
    MaxIterationsExceeded(u64),
}

impl From<PoolError> for BalanceError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::InsufficientLiquidity => BalanceError::InsufficientLiquidity,
            PoolError::InvalidPool(what) => BalanceError::InvalidPool(what),
            PoolError::MaxIterationsExceeded(bound) => BalanceError::MaxIterationsExceeded(bound),
        }
    }
}
