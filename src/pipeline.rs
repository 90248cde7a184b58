use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::assembler::{assemble, ResultSet};
use crate::chain::{self, Chain};
use crate::enricher::PriceEnricher;
use crate::error::{PipelineError, PipelineResult};
use crate::provider::BalanceSource;
use crate::slot::{BalanceSlot, SlotState};

/// Where an invocation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Fetching,
    FetchFailed,
    Enriching,
    Assembled,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Fetching => "fetching",
            Stage::FetchFailed => "fetch-failed",
            Stage::Enriching => "enriching",
            Stage::Assembled => "assembled",
        };
        f.write_str(name)
    }
}

/// Fetch, then price each holding in order, then assemble.
pub struct Pipeline {
    source: Arc<dyn BalanceSource>,
    enricher: PriceEnricher,
    chain: Option<Chain>,
}

impl Pipeline {
    pub fn new(source: Arc<dyn BalanceSource>, enricher: PriceEnricher, chain: Option<Chain>) -> Self {
        Self {
            source,
            enricher,
            chain,
        }
    }

    /// One full invocation. `Err` means the result is unavailable; per-token
    /// problems never surface here.
    pub async fn run(&self, address: &str) -> PipelineResult<ResultSet> {
        let address = address.trim();
        let mut stage = Stage::Idle;
        if address.is_empty() {
            let e = PipelineError::InvalidAddress;
            error!("{}", e);
            return Err(e);
        }

        advance(&mut stage, Stage::Fetching);
        let holdings = match self.source.token_balances(address, self.chain).await {
            Ok(holdings) => holdings,
            Err(source) => {
                advance(&mut stage, Stage::FetchFailed);
                let e = PipelineError::FetchFailure {
                    address: address.to_string(),
                    chain: chain::describe(self.chain),
                    source,
                };
                error!("{}", e);
                return Err(e);
            }
        };
        info!(
            "Fetched {} ERC20 balances for chain: {}",
            holdings.len(),
            chain::describe(self.chain)
        );

        advance(&mut stage, Stage::Enriching);
        let prices = self.enricher.enrich_all(&holdings, self.chain).await;

        let result = assemble(&holdings, &prices);
        advance(&mut stage, Stage::Assembled);
        Ok(result)
    }

    /// Runs an invocation and publishes it to `slot` unless a newer one started
    /// in the meantime. Returns whether the result was committed.
    pub async fn refresh(&self, slot: &BalanceSlot, address: &str) -> bool {
        let generation = slot.begin();
        let state = match self.run(address).await {
            Ok(result) => SlotState::Available(Arc::new(result)),
            Err(_) => SlotState::Unavailable,
        };
        slot.commit(generation, state).await
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!("pipeline {} -> {}", stage, next);
    *stage = next;
}
