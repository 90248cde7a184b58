use std::collections::HashMap;

use serde::{Serialize, Serializer};
use tracing::warn;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{EnrichedBalance, TokenHolding};

/// Enriched balances keyed by contract address, kept in fetch order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    entries: Vec<EnrichedBalance>,
    index: HashMap<String, usize>,
}

impl ResultSet {
    /// Inserts `entry`; a repeated address overwrites the earlier entry in place.
    fn upsert(&mut self, entry: EnrichedBalance) {
        match self.index.get(&entry.token_address) {
            Some(&pos) => self.entries[pos] = entry,
            None => {
                self.index.insert(entry.token_address.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, token_address: &str) -> Option<&EnrichedBalance> {
        self.index.get(token_address).map(|&pos| &self.entries[pos])
    }

    fn get_mut(&mut self, token_address: &str) -> Option<&mut EnrichedBalance> {
        let pos = *self.index.get(token_address)?;
        self.entries.get_mut(pos)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EnrichedBalance> {
        self.entries.iter()
    }

    /// Sum of the USD values of the priced entries.
    pub fn total_value(&self) -> f64 {
        self.entries.iter().filter_map(|e| e.value).sum()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a EnrichedBalance;
    type IntoIter = std::slice::Iter<'a, EnrichedBalance>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.entries)
    }
}

/// Merges holdings with their index-aligned prices. Anomalies on one token
/// are logged and leave that token unpriced; the rest still merge.
///
/// A repeated address keeps its first position and its last balance. Prices
/// are applied afterwards, so a later failed lookup never erases a price an
/// earlier duplicate already found.
pub fn assemble(holdings: &[TokenHolding], prices: &[Option<f64>]) -> ResultSet {
    let mut result = ResultSet::default();
    for holding in holdings {
        let entry = match scaled_balance(holding) {
            Ok(balance) => EnrichedBalance::unpriced(holding, balance),
            Err(e) => {
                warn!("{}, reporting a placeholder balance of 0", e);
                EnrichedBalance::unreadable(holding, e.to_string())
            }
        };
        result.upsert(entry);
    }

    for (i, holding) in holdings.iter().enumerate() {
        let Some(entry) = result.get_mut(&holding.token_address) else {
            continue;
        };
        if entry.balance_error.is_some() {
            continue;
        }
        match price_entry(holding, entry.balance, prices.get(i)) {
            Ok(Some((price, value))) => {
                entry.price = Some(price);
                entry.value = Some(value);
            }
            Ok(None) => {}
            Err(e) => warn!("{}", e),
        }
    }
    result
}

/// Raw base-unit balance divided by `10^decimals`.
pub fn scaled_balance(holding: &TokenHolding) -> PipelineResult<f64> {
    let decimals: u8 = holding
        .decimals
        .trim()
        .parse()
        .map_err(|_| anomaly(holding, format!("malformed decimals `{}`", holding.decimals)))?;
    let raw: f64 = holding
        .balance
        .trim()
        .parse()
        .map_err(|_| anomaly(holding, format!("malformed balance `{}`", holding.balance)))?;
    if !raw.is_finite() || raw < 0.0 {
        return Err(anomaly(holding, format!("balance `{}` out of range", holding.balance)));
    }
    Ok(raw / 10f64.powi(i32::from(decimals)))
}

fn price_entry(
    holding: &TokenHolding,
    balance: f64,
    price: Option<&Option<f64>>,
) -> PipelineResult<Option<(f64, f64)>> {
    let price = match price {
        Some(Some(price)) => *price,
        Some(None) => return Ok(None),
        None => return Err(anomaly(holding, "no enrichment result".to_string())),
    };
    let value = balance * price;
    if !value.is_finite() {
        return Err(anomaly(holding, format!("value of {} at {} is not finite", balance, price)));
    }
    Ok(Some((price, value)))
}

fn anomaly(holding: &TokenHolding, reason: String) -> PipelineError {
    PipelineError::MergeAnomaly {
        token: holding.token_address.clone(),
        reason,
    }
}
