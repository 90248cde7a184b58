//! Seams to the two upstream services.

use async_trait::async_trait;

use crate::chain::Chain;
use crate::error::ApiError;
use crate::types::TokenHolding;

/// Indexing service returning the ERC-20 holdings of an account.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn token_balances(
        &self,
        address: &str,
        chain: Option<Chain>,
    ) -> Result<Vec<TokenHolding>, ApiError>;
}

/// Price oracle quoting a token contract in USD.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn token_price(&self, token_address: &str, chain: Option<Chain>) -> Result<f64, ApiError>;
}
