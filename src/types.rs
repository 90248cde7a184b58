use serde::{Deserialize, Serialize};

/// One ERC-20 holding as the indexer reports it. Numeric fields stay strings,
/// balances routinely exceed any native integer width.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TokenHolding {
    pub token_address: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    pub decimals: String,
    pub balance: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPrice {
    pub usd_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedBalance {
    pub token_address: String,
    pub name: String,
    pub symbol: String,
    pub balance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Set when the raw balance could not be read; `balance` is then a 0 placeholder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_error: Option<String>,
}

impl EnrichedBalance {
    /// Record with the scaled balance only; price and value are filled by the assembler.
    pub fn unpriced(holding: &TokenHolding, balance: f64) -> Self {
        Self {
            token_address: holding.token_address.clone(),
            name: holding.name.clone(),
            symbol: holding.symbol.clone(),
            balance,
            price: None,
            value: None,
            balance_error: None,
        }
    }

    pub fn unreadable(holding: &TokenHolding, reason: String) -> Self {
        Self {
            balance_error: Some(reason),
            ..Self::unpriced(holding, 0.0)
        }
    }
}
