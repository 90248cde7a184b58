use std::sync::Arc;

use tracing::{info, warn};

use crate::chain::Chain;
use crate::error::PipelineError;
use crate::provider::PriceOracle;
use crate::throttle::Throttle;
use crate::types::TokenHolding;

/// Looks up USD prices one holding at a time, throttled before every lookup.
pub struct PriceEnricher {
    oracle: Arc<dyn PriceOracle>,
    throttle: Throttle,
}

impl PriceEnricher {
    pub fn new(oracle: Arc<dyn PriceOracle>, throttle: Throttle) -> Self {
        Self { oracle, throttle }
    }

    /// Returns `None` when no usable price could be obtained. Failures never escape.
    pub async fn price_for(&self, holding: &TokenHolding, chain: Option<Chain>) -> Option<f64> {
        self.throttle.wait().await;
        info!("Fetching price data for: {}", holding.name);
        match self.lookup(holding, chain).await {
            Ok(price) => Some(price),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    async fn lookup(&self, holding: &TokenHolding, chain: Option<Chain>) -> Result<f64, PipelineError> {
        let no_price = |reason: String| PipelineError::NoPriceAvailable {
            token: holding.token_address.clone(),
            reason,
        };
        let price = self
            .oracle
            .token_price(&holding.token_address, chain)
            .await
            .map_err(|e| no_price(e.to_string()))?;
        // the oracle reports 0 for tokens it has no market for
        if !price.is_finite() || price <= 0.0 {
            return Err(no_price(format!("unusable quote {}", price)));
        }
        Ok(price)
    }

    /// Prices for `holdings`, index-aligned. Lookups run strictly in order;
    /// the next one starts only after the previous one (delay included) is done.
    pub async fn enrich_all(&self, holdings: &[TokenHolding], chain: Option<Chain>) -> Vec<Option<f64>> {
        let mut prices = Vec::with_capacity(holdings.len());
        for holding in holdings {
            prices.push(self.price_for(holding, chain).await);
        }
        prices
    }
}
