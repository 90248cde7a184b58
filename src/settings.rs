use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::chain::Chain;
use crate::error::SettingsError;

pub const DEFAULT_API_URL: &str = "https://deep-index.moralis.io/api/v2";
pub const DEFAULT_PRICE_DELAY_MS: u64 = 1200;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub chain: Option<Chain>,
    #[serde(default = "default_price_delay_ms")]
    pub price_delay_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_price_delay_ms() -> u64 {
    DEFAULT_PRICE_DELAY_MS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            chain: None,
            price_delay_ms: DEFAULT_PRICE_DELAY_MS,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Reads `<name>.toml` (optional) and then `ENRICHER_*` environment variables,
    /// the latter taking precedence.
    pub fn load(name: &str) -> Result<Self, SettingsError> {
        let config = Config::builder()
            .add_source(File::with_name(name).required(false))
            .add_source(Environment::with_prefix("ENRICHER").try_parsing(true))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn price_delay(&self) -> Duration {
        Duration::from_millis(self.price_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
