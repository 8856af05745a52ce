//! arb-math: integer-exact AMM settlement math.
//!
//! Ports the fixed-point kernels that on-chain pools settle with so that
//! off-chain profit simulation matches on-chain results to the wei:
//! full-width mul/div, Newton integer square root, tick <-> sqrt-price
//! conversion, sqrt-price delta formulas, and the single-step swap
//! primitives. All computation is unsigned integer arithmetic; no floats
//! anywhere.

pub mod full_math;
pub mod liquidity_math;
pub mod sqrt_price_math;
pub mod swap_math;
pub mod tick_math;

pub use full_math::{biguint_to_u256, isqrt, mul_div, mul_div_rounding_up, u256_to_biguint};
pub use swap_math::{compute_swap_step, compute_swap_step_to_price, SwapStep};

use alloy::primitives::U256;

/// 2^96, the Q64.96 fixed-point scale of `sqrtPriceX96`.
pub const Q96: U256 = U256::from_limbs([0, 0x1_0000_0000, 0, 0]);

/// Fee denominator for concentrated-liquidity pools: fees are in pips (1e6).
pub const MAX_FEE_PIPS: u32 = 1_000_000;
