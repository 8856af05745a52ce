//! Packed calldata for the on-chain settlement contract.
//!
//! The contract takes one word carrying the reference token address, both
//! pool kind tags and both fee rationals, bit-packed to fixed offsets:
//!
//! ```text
//! bits   0..160  reference token address
//! bits 160..164  `to` pool kind tag
//! bits 164..168  `from` pool kind tag
//! bits 168..184  `to` fee denominator
//! bits 184..200  `to` fee numerator
//! bits 200..216  `from` fee denominator
//! bits 216..232  `from` fee numerator
//! ```
//!
//! Concentrated-liquidity legs carry zero fee fields; their fee lives in
//! the pool contract itself.

use alloy::primitives::{Address, U256};
use thiserror::Error;

use crate::result::{EquilibriumResult, PoolLegInfo};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// A fee component exceeds its 16-bit calldata field. Refusing to
    /// encode beats silently truncating the fee the contract will charge.
    #[error("fee component {value} does not fit a 16-bit calldata field")]
    FeeFieldOverflow { value: u32 },
}

/// Arguments of one settlement call, ready for ABI encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettlementCall {
    pub block_number: u64,
    pub amount_in: U256,
    pub packed_word: U256,
    pub from_address: Address,
    pub to_address: Address,
}

fn fee_fields(leg: &PoolLegInfo) -> Result<(u32, u32), EncodeError> {
    match leg {
        PoolLegInfo::ConstantProduct {
            fee_numerator,
            fee_denominator,
            ..
        } => {
            for value in [*fee_numerator, *fee_denominator] {
                if value > u32::from(u16::MAX) {
                    return Err(EncodeError::FeeFieldOverflow { value });
                }
            }
            Ok((*fee_numerator, *fee_denominator))
        }
        PoolLegInfo::ConcentratedLiquidity { .. } => Ok((0, 0)),
    }
}

/// Encodes a balanced result into the settlement call arguments.
pub fn encode(
    result: &EquilibriumResult,
    reference_token: Address,
    block_number: u64,
) -> Result<SettlementCall, EncodeError> {
    let (fee_num_from, fee_den_from) = fee_fields(&result.from)?;
    let (fee_num_to, fee_den_to) = fee_fields(&result.to)?;

    let packed_word = U256::from_be_slice(reference_token.as_slice())
        | U256::from(result.to.kind().as_u8()) << 160
        | U256::from(result.from.kind().as_u8()) << 164
        | U256::from(fee_den_to) << 168
        | U256::from(fee_num_to) << 184
        | U256::from(fee_den_from) << 200
        | U256::from(fee_num_from) << 216;

    Ok(SettlementCall {
        block_number,
        amount_in: result.amount_in,
        packed_word,
        from_address: result.from.address(),
        to_address: result.to.address(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    fn result() -> EquilibriumResult {
        EquilibriumResult {
            from: PoolLegInfo::ConstantProduct {
                address: address!("0d4a11d5EEaaC28EC3F61d100daF4d40471f1852"),
                fee_numerator: 997,
                fee_denominator: 1000,
            },
            to: PoolLegInfo::ConcentratedLiquidity {
                address: address!("8ad599c3A0ff1De082011EFDDc58f1908eb6e6D8"),
            },
            amount_in: U256::from(123_456_789u64),
            profit: U256::from(42u8),
        }
    }

    #[test]
    fn packing_is_lossless() {
        let reference = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
        let call = encode(&result(), reference, 17_000_000).unwrap();

        let word = call.packed_word;
        let mask16 = U256::from(0xffffu32);
        let mask4 = U256::from(0xfu32);
        let addr_mask = (U256::from(1u8) << 160) - U256::from(1u8);

        assert_eq!(word & addr_mask, U256::from_be_slice(reference.as_slice()));
        // to = concentrated (tag 0), from = constant-product (tag 1).
        assert_eq!((word >> 160) & mask4, U256::ZERO);
        assert_eq!((word >> 164) & mask4, U256::from(1u8));
        // `to` is a concentrated pool: zero fee fields.
        assert_eq!((word >> 168) & mask16, U256::ZERO);
        assert_eq!((word >> 184) & mask16, U256::ZERO);
        assert_eq!((word >> 200) & mask16, U256::from(1000u16));
        assert_eq!((word >> 216) & mask16, U256::from(997u16));
        // Nothing stray above the last field.
        assert_eq!(word >> 232, U256::ZERO);
    }

    #[test]
    fn oversized_fee_component_is_rejected() {
        let mut oversized = result();
        oversized.from = PoolLegInfo::ConstantProduct {
            address: Address::ZERO,
            fee_numerator: 99_700,
            fee_denominator: 100_000,
        };
        let err = encode(&oversized, Address::ZERO, 1).unwrap_err();
        assert_eq!(err, EncodeError::FeeFieldOverflow { value: 99_700 });
    }
}
