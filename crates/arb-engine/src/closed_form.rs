//! Closed-form equilibrium for two constant-product pools.
//!
//! The profit of routing `x` reference tokens through both pools is
//! `f(x) = out_to(out_from(x)) - x`; the root of `f'(x) = 0` has a closed
//! algebraic form in the four reserves and two fee rationals. The raw root
//! is then corrected through the pools' own rounding, since the truncated
//! division systematically overstates what the pair can actually settle.

use alloy::primitives::U256;
use arb_math::{biguint_to_u256, isqrt, u256_to_biguint};
use arb_pool::{ConstantProductPool, Token};
use num_bigint::BigUint;
use tracing::debug;

use crate::error::BalanceError;
use crate::result::EquilibriumResult;

/// Balances two constant-product pools: `token_in` enters `from`, the
/// intermediate token moves to `to`, and `token_in` comes back out.
pub fn balance(
    from: &ConstantProductPool,
    to: &ConstantProductPool,
    token_in: &Token,
) -> Result<EquilibriumResult, BalanceError> {
    let intermediate = from.other_token(token_in)?.clone();

    let reserves_in0 = u256_to_biguint(from.reserve_of(token_in)?);
    let reserves_out0 = u256_to_biguint(from.reserve_of(&intermediate)?);
    let reserves_in1 = u256_to_biguint(to.reserve_of(&intermediate)?);
    let reserves_out1 = u256_to_biguint(to.reserve_of(token_in)?);
    let fee_num0 = BigUint::from(from.fee_numerator());
    let fee_den0 = BigUint::from(from.fee_denominator());
    let fee_num1 = BigUint::from(to.fee_numerator());
    let fee_den1 = BigUint::from(to.fee_denominator());

    let product = &reserves_in0
        * &reserves_out0
        * &reserves_in1
        * &reserves_out1
        * &fee_num0
        * &fee_den0
        * &fee_num1
        * &fee_den1;
    let root = isqrt(&product);
    let offset = &reserves_in0 * &reserves_in1 * &fee_den0 * &fee_den1;
    if root <= offset {
        // The derivative is negative at x = 0: no input size is profitable.
        return Err(BalanceError::NotProfitable);
    }
    let denominator = &fee_num0 * (&reserves_out0 * &fee_num1 + &reserves_in1 * &fee_den1);
    let x_raw = biguint_to_u256(&((root - offset) / denominator));
    if x_raw.is_zero() {
        return Err(BalanceError::NotProfitable);
    }

    // Round-trip the raw root through the first pool so the sized amount is
    // one its own rounding can reproduce on chain.
    let (intermediate_out, _) = from.get_output_amount(token_in, x_raw)?;
    let (amount_in, _) = from.get_input_amount(&intermediate, intermediate_out)?;

    let (amount_b, _) = from.get_output_amount(token_in, amount_in)?;
    let (amount_c, _) = to.get_output_amount(&intermediate, amount_b)?;
    if amount_c <= amount_in {
        debug!(%amount_in, %amount_c, "fees eat the spread");
        return Err(BalanceError::NotProfitable);
    }
    let profit = amount_c - amount_in;
    debug!(
        from = %from.address(),
        to = %to.address(),
        %amount_in,
        %profit,
        "constant-product pair balanced"
    );

    Ok(EquilibriumResult {
        from: from.into(),
        to: to.into(),
        amount_in,
        profit,
    })
}
