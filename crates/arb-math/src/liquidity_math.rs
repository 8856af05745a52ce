//! Signed liquidity deltas applied on tick crossings.

/// Applies a signed liquidity change to the active liquidity.
///
/// Returns `None` on underflow or overflow, which means the tick table is
/// inconsistent with the pool's liquidity; callers surface that as an
/// invalid-pool error rather than continuing with a corrupt walk.
pub fn add_delta(liquidity: u128, delta: i128) -> Option<u128> {
    if delta < 0 {
        liquidity.checked_sub(delta.unsigned_abs())
    } else {
        liquidity.checked_add(delta as u128)
    }
}
