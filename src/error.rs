pub use thiserror::Error;

/// Failure talking to the indexer or the price oracle.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http error:{0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {status} for {url}: {body}")]
    Status { status: u16, url: String, body: String },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unknown chain `{0}`")]
    UnknownChain(String),

    #[error("account address must not be empty")]
    InvalidAddress,

    #[error("fetching balances for {address} on {chain} failed: {source}")]
    FetchFailure {
        address: String,
        chain: String,
        #[source]
        source: ApiError,
    },

    #[error("no price available for {token}: {reason}")]
    NoPriceAvailable { token: String, reason: String },

    #[error("cannot merge {token}: {reason}")]
    MergeAnomaly { token: String, reason: String },
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("config error:{0}")]
    Config(#[from] config::ConfigError),
}
