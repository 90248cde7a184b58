use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use erc20_balance_enricher::enricher::PriceEnricher;
use erc20_balance_enricher::moralis::MoralisClient;
use erc20_balance_enricher::settings::Settings;
use erc20_balance_enricher::throttle::Throttle;
use erc20_balance_enricher::{BalanceSlot, Chain, Pipeline, SlotState};
use tracing_subscriber::EnvFilter;

/// Lists the ERC-20 balances of an account with their USD prices.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Account address; prompted for when omitted
    address: Option<String>,

    /// Chain name or hex id, e.g. `eth`, `0x89`, `bsc testnet`
    #[arg(short, long)]
    chain: Option<Chain>,

    /// Config file name, without extension
    #[arg(long, default_value = "config")]
    config: String,

    /// Pause before each price lookup, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();
    let settings = get_settings(&args)?;
    let address = match args.address {
        Some(address) => address,
        None => prompt_address()?,
    };

    let client = Arc::new(MoralisClient::new(&settings).context("building http client")?);
    let enricher = PriceEnricher::new(client.clone(), Throttle::new(settings.price_delay()));
    let pipeline = Pipeline::new(client, enricher, settings.chain);

    let slot = BalanceSlot::new();
    pipeline.refresh(&slot, &address).await;

    match slot.read().await {
        SlotState::Available(result) => {
            println!("{}", serde_json::to_string_pretty(result.as_ref())?);
            println!("Total value: ${:.2}", result.total_value());
            Ok(())
        }
        SlotState::Unavailable => bail!("balances for {} are unavailable", address),
        SlotState::NotYetRun => bail!("pipeline did not run"),
    }
}

fn get_settings(args: &Args) -> anyhow::Result<Settings> {
    let mut settings = Settings::load(&args.config).context("loading settings")?;
    if args.chain.is_some() {
        settings.chain = args.chain;
    }
    if let Some(delay_ms) = args.delay_ms {
        settings.price_delay_ms = delay_ms;
    }
    Ok(settings)
}

fn prompt_address() -> anyhow::Result<String> {
    print!("Please enter account address: ");
    io::stdout().flush()?;
    let mut address = String::new();
    io::stdin().read_line(&mut address)?;
    Ok(address.trim().to_string())
}
