//! Constant-product pool (x * y = k) with a rational input fee.
//!
//! Settlement matches the on-chain pair exactly: output amounts floor, input
//! amounts round up by one wei, and the fee is taken from the input side as
//! `fee_numerator / fee_denominator` (997/1000 for the canonical 0.3% pair).

use alloy::primitives::{Address, U256, U512};

use crate::error::PoolError;
use crate::price::Price;
use crate::token::Token;

/// Reserves are stored on chain as uint112.
const MAX_RESERVE_BITS: usize = 112;

/// Immutable snapshot of a constant-product pool.
///
/// Trades return a fresh pool value carrying the post-trade reserves.
#[derive(Clone, Debug)]
pub struct ConstantProductPool {
    address: Address,
    token0: Token,
    token1: Token,
    reserve0: U256,
    reserve1: U256,
    fee_numerator: u32,
    fee_denominator: u32,
}

impl ConstantProductPool {
    pub fn new(
        address: Address,
        token0: Token,
        token1: Token,
        reserve0: U256,
        reserve1: U256,
        fee_numerator: u32,
        fee_denominator: u32,
    ) -> Result<Self, PoolError> {
        if !token0.sorts_before(&token1) {
            return Err(PoolError::InvalidPool("tokens not in canonical order"));
        }
        if reserve0.is_zero() || reserve1.is_zero() {
            return Err(PoolError::InvalidPool("empty reserves"));
        }
        if reserve0.bit_len() > MAX_RESERVE_BITS || reserve1.bit_len() > MAX_RESERVE_BITS {
            return Err(PoolError::InvalidPool("reserve exceeds uint112"));
        }
        if fee_denominator == 0 || fee_numerator >= fee_denominator {
            return Err(PoolError::InvalidPool("fee at or above 100%"));
        }
        Ok(Self {
            address,
            token0,
            token1,
            reserve0,
            reserve1,
            fee_numerator,
            fee_denominator,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn token0(&self) -> &Token {
        &self.token0
    }

    pub fn token1(&self) -> &Token {
        &self.token1
    }

    pub fn fee_numerator(&self) -> u32 {
        self.fee_numerator
    }

    pub fn fee_denominator(&self) -> u32 {
        self.fee_denominator
    }

    pub fn involves(&self, token: &Token) -> bool {
        *token == self.token0 || *token == self.token1
    }

    pub fn other_token(&self, token: &Token) -> Result<&Token, PoolError> {
        if *token == self.token0 {
            Ok(&self.token1)
        } else if *token == self.token1 {
            Ok(&self.token0)
        } else {
            Err(PoolError::InvalidPool("token not in pair"))
        }
    }

    pub fn reserve_of(&self, token: &Token) -> Result<U256, PoolError> {
        if *token == self.token0 {
            Ok(self.reserve0)
        } else if *token == self.token1 {
            Ok(self.reserve1)
        } else {
            Err(PoolError::InvalidPool("token not in pair"))
        }
    }

    /// Mid price of `token` in units of the other token: the ratio of the
    /// opposite reserve over the token's own reserve.
    pub fn price_of(&self, token: &Token) -> Result<Price, PoolError> {
        let own = self.reserve_of(token)?;
        let other = self.reserve_of(self.other_token(token)?)?;
        Ok(Price::from_u256_ratio(other, own))
    }

    /// Output for an exact input of `amount_in` units of `input_token`.
    ///
    /// `out = in * feeNum * reserveOut / (reserveIn * feeDen + in * feeNum)`,
    /// floored. Returns the output amount and the post-trade pool.
    pub fn get_output_amount(
        &self,
        input_token: &Token,
        amount_in: U256,
    ) -> Result<(U256, ConstantProductPool), PoolError> {
        if amount_in.is_zero() {
            return Err(PoolError::InsufficientLiquidity);
        }
        let output_token = self.other_token(input_token)?.clone();
        let reserve_in = self.reserve_of(input_token)?;
        let reserve_out = self.reserve_of(&output_token)?;

        let fee_num = U512::from(self.fee_numerator);
        let fee_den = U512::from(self.fee_denominator);
        let amount_in_with_fee = U512::from(amount_in) * fee_num;
        let numerator = amount_in_with_fee * U512::from(reserve_out);
        let denominator = U512::from(reserve_in) * fee_den + amount_in_with_fee;
        let amount_out = (numerator / denominator).to::<U256>();

        if amount_out.is_zero() {
            return Err(PoolError::InsufficientLiquidity);
        }
        Ok((amount_out, self.with_trade(input_token, amount_in, amount_out)))
    }

    /// Input required for an exact output of `amount_out` units of
    /// `output_token`.
    ///
    /// `in = reserveIn * out * feeDen / ((reserveOut - out) * feeNum) + 1`;
    /// the trailing wei makes the quote always sufficient on chain.
    pub fn get_input_amount(
        &self,
        output_token: &Token,
        amount_out: U256,
    ) -> Result<(U256, ConstantProductPool), PoolError> {
        let input_token = self.other_token(output_token)?.clone();
        let reserve_in = self.reserve_of(&input_token)?;
        let reserve_out = self.reserve_of(output_token)?;
        if amount_out >= reserve_out {
            return Err(PoolError::InsufficientLiquidity);
        }

        let numerator =
            U512::from(reserve_in) * U512::from(amount_out) * U512::from(self.fee_denominator);
        let denominator =
            U512::from(reserve_out - amount_out) * U512::from(self.fee_numerator);
        let amount_in = (numerator / denominator).to::<U256>() + U256::from(1u8);

        Ok((amount_in, self.with_trade(&input_token, amount_in, amount_out)))
    }

    fn with_trade(
        &self,
        input_token: &Token,
        amount_in: U256,
        amount_out: U256,
    ) -> ConstantProductPool {
        let mut next = self.clone();
        if *input_token == self.token0 {
            next.reserve0 = self.reserve0 + amount_in;
            next.reserve1 = self.reserve1 - amount_out;
        } else {
            next.reserve1 = self.reserve1 + amount_in;
            next.reserve0 = self.reserve0 - amount_out;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    fn tokens() -> (Token, Token) {
        (
            Token::new(
                1,
                address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
                6,
                "USDC",
            ),
            Token::new(
                1,
                address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
                18,
                "WETH",
            ),
        )
    }

    fn pool(reserve0: u128, reserve1: u128) -> ConstantProductPool {
        let (t0, t1) = tokens();
        ConstantProductPool::new(
            Address::ZERO,
            t0,
            t1,
            U256::from(reserve0),
            U256::from(reserve1),
            997,
            1000,
        )
        .unwrap()
    }

    #[test]
    fn rejects_invalid_snapshots() {
        let (t0, t1) = tokens();
        assert!(matches!(
            ConstantProductPool::new(
                Address::ZERO,
                t1.clone(),
                t0.clone(),
                U256::from(1u8),
                U256::from(1u8),
                997,
                1000
            ),
            Err(PoolError::InvalidPool(_))
        ));
        assert!(matches!(
            ConstantProductPool::new(
                Address::ZERO,
                t0.clone(),
                t1.clone(),
                U256::ZERO,
                U256::from(1u8),
                997,
                1000
            ),
            Err(PoolError::InvalidPool(_))
        ));
        assert!(matches!(
            ConstantProductPool::new(
                Address::ZERO,
                t0,
                t1,
                U256::from(1u8),
                U256::from(1u8),
                1000,
                1000
            ),
            Err(PoolError::InvalidPool(_))
        ));
    }

    #[test]
    fn output_amount_matches_reference_values() {
        // 100 in against 1000/1000 reserves at 0.3%:
        // floor(100*997*1000 / (1000*1000 + 100*997)) = 90.
        let p = pool(1000, 1000);
        let (t0, _) = tokens();
        let (out, next) = p.get_output_amount(&t0, U256::from(100u8)).unwrap();
        assert_eq!(out, U256::from(90u8));
        assert_eq!(next.reserve0, U256::from(1100u16));
        assert_eq!(next.reserve1, U256::from(910u16));
    }

    #[test]
    fn input_amount_rounds_up_one_wei() {
        let p = pool(1000, 1000);
        let (_, t1) = tokens();
        // floor(1000*90*1000 / (910*997)) + 1 = 99 + 1 = 100.
        let (inp, _) = p.get_input_amount(&t1, U256::from(90u8)).unwrap();
        assert_eq!(inp, U256::from(100u8));
        // A zero-output request still quotes the one-wei round-up.
        let (inp, _) = p.get_input_amount(&t1, U256::ZERO).unwrap();
        assert_eq!(inp, U256::from(1u8));
    }

    #[test]
    fn input_quote_always_covers_the_requested_output() {
        let p = pool(1_000_000_000, 500_000_000);
        let (_, t1) = tokens();
        for want in [1u64, 7, 1_000, 123_456, 400_000_000] {
            let want = U256::from(want);
            let (inp, _) = p.get_input_amount(&t1, want).unwrap();
            let (t0, _) = tokens();
            let (got, _) = p.get_output_amount(&t0, inp).unwrap();
            assert!(got >= want, "quote {inp} undershoots {want}: {got}");
        }
    }

    #[test]
    fn exact_output_at_reserve_is_rejected() {
        let p = pool(1000, 1000);
        let (_, t1) = tokens();
        assert_eq!(
            p.get_input_amount(&t1, U256::from(1000u16)).unwrap_err(),
            PoolError::InsufficientLiquidity
        );
    }

    #[test]
    fn price_of_is_opposite_over_own_reserve() {
        let p = pool(2000, 1000);
        let (t0, t1) = tokens();
        let p0 = p.price_of(&t0).unwrap();
        let p1 = p.price_of(&t1).unwrap();
        assert_eq!(p0, Price::from_u256_ratio(U256::from(1000u16), U256::from(2000u16)));
        assert_eq!(p1, p0.invert());
    }
}
