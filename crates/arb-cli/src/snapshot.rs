//! JSON snapshot format: the on-disk stand-in for a live pool fetcher.

use alloy::primitives::{Address, U256};
use arb_pool::{
    ConcentratedLiquidityPool, ConstantProductPool, TickRecord, TickTable, Token,
};
use eyre::{eyre, Result, WrapErr};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Snapshot {
    pub chain_id: u64,
    pub tokens: Vec<TokenDef>,
    pub pools: Vec<PoolDef>,
}

#[derive(Debug, Deserialize)]
pub struct TokenDef {
    pub address: Address,
    pub decimals: u8,
    pub symbol: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PoolDef {
    ConstantProduct {
        address: Address,
        token0: Address,
        token1: Address,
        reserve0: U256,
        reserve1: U256,
        fee_numerator: u32,
        fee_denominator: u32,
    },
    ConcentratedLiquidity {
        address: Address,
        token0: Address,
        token1: Address,
        fee_pips: u32,
        tick_spacing: i32,
        sqrt_price_x96: U256,
        tick: i32,
        liquidity: u128,
        ticks: Vec<TickDef>,
    },
}

impl PoolDef {
    pub fn address(&self) -> Address {
        match self {
            PoolDef::ConstantProduct { address, .. } => *address,
            PoolDef::ConcentratedLiquidity { address, .. } => *address,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TickDef {
    pub index: i32,
    pub liquidity_net: i128,
    pub liquidity_gross: u128,
}

pub fn load(path: &Path) -> Result<Snapshot> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .wrap_err_with(|| format!("invalid snapshot in {}", path.display()))
}

impl Snapshot {
    pub fn token_index(&self) -> HashMap<Address, Token> {
        self.tokens
            .iter()
            .map(|def| {
                (
                    def.address,
                    Token::new(self.chain_id, def.address, def.decimals, def.symbol.clone()),
                )
            })
            .collect()
    }

    /// Finds a token by symbol (case-insensitive) or 0x-address.
    pub fn resolve_token(&self, wanted: &str) -> Result<Token> {
        let tokens = self.token_index();
        if let Ok(address) = wanted.parse::<Address>() {
            return tokens
                .get(&address)
                .cloned()
                .ok_or_else(|| eyre!("token {wanted} is not in the snapshot"));
        }
        tokens
            .values()
            .find(|t| t.symbol.eq_ignore_ascii_case(wanted))
            .cloned()
            .ok_or_else(|| eyre!("token {wanted} is not in the snapshot"))
    }

    /// Builds the engine pool for one snapshot entry.
    pub fn build_pool(&self, def: &PoolDef) -> Result<arb_engine::Pool> {
        let tokens = self.token_index();
        let token = |address: &Address| -> Result<Token> {
            tokens
                .get(address)
                .cloned()
                .ok_or_else(|| eyre!("pool references unknown token {address}"))
        };
        match def {
            PoolDef::ConstantProduct {
                address,
                token0,
                token1,
                reserve0,
                reserve1,
                fee_numerator,
                fee_denominator,
            } => {
                let pool = ConstantProductPool::new(
                    *address,
                    token(token0)?,
                    token(token1)?,
                    *reserve0,
                    *reserve1,
                    *fee_numerator,
                    *fee_denominator,
                )
                .wrap_err_with(|| format!("invalid constant-product pool {address}"))?;
                Ok(arb_engine::Pool::ConstantProduct(pool))
            }
            PoolDef::ConcentratedLiquidity {
                address,
                token0,
                token1,
                fee_pips,
                tick_spacing,
                sqrt_price_x96,
                tick,
                liquidity,
                ticks,
            } => {
                let records = ticks
                    .iter()
                    .map(|t| TickRecord {
                        index: t.index,
                        liquidity_net: t.liquidity_net,
                        liquidity_gross: t.liquidity_gross,
                    })
                    .collect();
                let pool = ConcentratedLiquidityPool::new(
                    *address,
                    token(token0)?,
                    token(token1)?,
                    *fee_pips,
                    *tick_spacing,
                    *sqrt_price_x96,
                    *tick,
                    *liquidity,
                    TickTable::new(records),
                )
                .wrap_err_with(|| format!("invalid concentrated-liquidity pool {address}"))?;
                Ok(arb_engine::Pool::ConcentratedLiquidity(pool))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "chain_id": 1,
        "tokens": [
            {"address": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", "decimals": 18, "symbol": "WETH"},
            {"address": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "decimals": 6, "symbol": "USDC"}
        ],
        "pools": [
            {
                "kind": "constant-product",
                "address": "0x0d4a11d5eeaac28ec3f61d100daf4d40471f1852",
                "token0": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
                "token1": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
                "reserve0": "1000000",
                "reserve1": "500000",
                "fee_numerator": 997,
                "fee_denominator": 1000
            },
            {
                "kind": "concentrated-liquidity",
                "address": "0x8ad599c3a0ff1de082011efddc58f1908eb6e6d8",
                "token0": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
                "token1": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
                "fee_pips": 3000,
                "tick_spacing": 60,
                "sqrt_price_x96": "79228162514264337593543950336",
                "tick": 0,
                "liquidity": 2000000000000,
                "ticks": [
                    {"index": -887272, "liquidity_net": 2000000000000, "liquidity_gross": 2000000000000},
                    {"index": 887272, "liquidity_net": -2000000000000, "liquidity_gross": 2000000000000}
                ]
            }
        ]
    }"#;

    #[test]
    fn sample_snapshot_parses_and_builds() {
        let snapshot: Snapshot = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(snapshot.pools.len(), 2);
        for def in &snapshot.pools {
            snapshot.build_pool(def).unwrap();
        }
        let weth = snapshot.resolve_token("weth").unwrap();
        assert_eq!(weth.decimals, 18);
        assert!(snapshot.resolve_token("DAI").is_err());
    }
}
