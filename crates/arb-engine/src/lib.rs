//! arb-engine: two-pool arbitrage equilibrium solvers.
//!
//! Given snapshots of two pools trading the same token pair, finds the
//! input size that pushes both pools to the same price and reports the
//! integer profit the round trip leaves behind. Constant-product pairs
//! settle with a closed-form optimum; a constant-product against a
//! concentrated-liquidity pool settles with a tick-by-tick walk. All math
//! is integer-exact against on-chain settlement.

pub mod balancer;
pub mod calldata;
pub mod closed_form;
pub mod error;
pub mod result;
pub mod tick_walk;

pub use balancer::{balance, Pool};
pub use calldata::{encode, EncodeError, SettlementCall};
pub use error::BalanceError;
pub use result::{EquilibriumResult, PoolLegInfo};
