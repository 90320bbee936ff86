//! Fetches plugin sources over plain HTTP(S).

use async_trait::async_trait;
use plugup_core::host::{RemoteSource, SourceError, SourceResult};
use plugup_core::HttpConfig;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum HttpSourceError {
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(config: &HttpConfig) -> Result<Self, HttpSourceError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteSource for HttpSource {
    async fn fetch_text(&self, url: &str) -> SourceResult<String> {
        let parsed = Url::parse(url).map_err(|e| SourceError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SourceError::InvalidUrl {
                url: url.to_string(),
                message: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        tracing::trace!(%url, "fetching plugin source");
        let resp = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| SourceError::Network {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(|e| SourceError::Network {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
