use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::chain::Chain;
use crate::error::ApiError;
use crate::provider::{BalanceSource, PriceOracle};
use crate::settings::Settings;
use crate::types::{TokenHolding, TokenPrice};

/// Moralis Web3 API client. Serves both the balance and the price endpoints.
#[derive(Clone)]
pub struct MoralisClient {
    http: Client,
    api_url: String,
    api_key: Option<String>,
}

impl MoralisClient {
    pub fn new(settings: &Settings) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(settings.request_timeout()).build()?;
        Ok(Self {
            http,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    fn balances_url(&self, address: &str) -> String {
        format!("{}/{}/erc20", self.api_url, address)
    }

    fn price_url(&self, token_address: &str) -> String {
        format!("{}/erc20/{}/price", self.api_url, token_address)
    }

    fn get(&self, url: &str, chain: Option<Chain>) -> RequestBuilder {
        let mut request = self.http.get(url);
        if let Some(chain) = chain {
            request = request.query(&[("chain", chain.name())]);
        }
        if let Some(key) = &self.api_key {
            request = request.header("X-API-Key", key);
        }
        request
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let url = response.url().to_string();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status: status.as_u16(), url, body });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl BalanceSource for MoralisClient {
    async fn token_balances(
        &self,
        address: &str,
        chain: Option<Chain>,
    ) -> Result<Vec<TokenHolding>, ApiError> {
        let url = self.balances_url(address);
        debug!("GET {}", url);
        let response = self.get(&url, chain).send().await?;
        Self::json(response).await
    }
}

#[async_trait]
impl PriceOracle for MoralisClient {
    async fn token_price(&self, token_address: &str, chain: Option<Chain>) -> Result<f64, ApiError> {
        let url = self.price_url(token_address);
        debug!("GET {}", url);
        let response = self.get(&url, chain).send().await?;
        let price: TokenPrice = Self::json(response).await?;
        Ok(price.usd_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_url: &str) -> MoralisClient {
        let settings = Settings {
            api_url: api_url.to_string(),
            api_key: Some("key".to_string()),
            ..Settings::default()
        };
        MoralisClient::new(&settings).unwrap()
    }

    #[test]
    fn builds_endpoint_urls() {
        let client = client("https://example.test/api/v2/");
        assert_eq!(client.balances_url("0xabc"), "https://example.test/api/v2/0xabc/erc20");
        assert_eq!(client.price_url("0xdef"), "https://example.test/api/v2/erc20/0xdef/price");
    }

    #[test]
    fn sends_chain_and_api_key() {
        let client = client("https://example.test/api/v2");
        let request = client
            .get(&client.price_url("0xdef"), Some(Chain::BscTestnet))
            .build()
            .unwrap();
        assert_eq!(request.url().query(), Some("chain=bsc+testnet"));
        assert_eq!(request.headers()["X-API-Key"], "key");
    }

    #[test]
    fn omits_chain_when_absent() {
        let client = client("https://example.test/api/v2");
        let request = client.get(&client.balances_url("0xabc"), None).build().unwrap();
        assert_eq!(request.url().query(), None);
    }

    /// Serves one canned HTTP response on a local port and returns a client pointed at it.
    async fn serve_once(status_line: &'static str, body: &'static str) -> MoralisClient {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request: Vec<u8> = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        MoralisClient {
            http: Client::builder().no_proxy().build().unwrap(),
            api_url: format!("http://{}/api/v2", addr),
            api_key: None,
        }
    }

    #[tokio::test]
    async fn non_success_status_becomes_status_error() {
        let client = serve_once("429 Too Many Requests", "Too many requests").await;
        let err = client.token_price("0xdef", Some(Chain::Eth)).await.unwrap_err();
        match err {
            ApiError::Status { status, url, body } => {
                assert_eq!(status, 429);
                assert!(url.contains("/erc20/0xdef/price"));
                assert_eq!(body, "Too many requests");
            }
            other => panic!("expected a status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn undecodable_price_body_is_an_http_error() {
        let client = serve_once("200 OK", r#"{"nativePrice":null}"#).await;
        let err = client.token_price("0xdef", None).await.unwrap_err();
        assert!(matches!(err, ApiError::Http(_)));
    }

    #[tokio::test]
    async fn decodes_balances_from_success_response() {
        let client = serve_once(
            "200 OK",
            r#"[{"token_address":"0xa","name":"Foo","symbol":"FOO","decimals":"18","balance":"1"}]"#,
        )
        .await;
        let holdings = client.token_balances("0xowner", Some(Chain::Polygon)).await.unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].token_address, "0xa");
        assert!(holdings[0].logo.is_none());
    }
}
