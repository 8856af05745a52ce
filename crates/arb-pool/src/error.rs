//! Pool simulation failures, all recoverable values.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PoolError {
    /// A requested output meets or exceeds what the pool can pay out.
    #[error("insufficient liquidity for requested amount")]
    InsufficientLiquidity,

    /// Snapshot data violates a pool invariant (empty reserves, fee >= 1,
    /// tick inconsistent with price, tick table contradicting liquidity).
    #[error("invalid pool state: {0}")]
    InvalidPool(&'static str),

    /// The tick walk ran past its safety bound; with a monotonic stopping
    /// rule this indicates corrupt snapshot data, not a slow pool.
    #[error("swap simulation exceeded {0} tick iterations")]
    MaxIterationsExceeded(u64),
}
