use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use crate::error::{AuditError, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Issues a single GET and hands back the raw body.
///
/// Implementations never retry; failures go straight back to the caller,
/// which decides whether they are fatal.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/// `reqwest`-backed transport with a fixed per-request timeout.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ci-audit/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| AuditError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Fetch: {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuditError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| classify(url, e))?;
        Ok(body.to_vec())
    }
}

fn classify(url: &str, error: reqwest::Error) -> AuditError {
    if error.is_timeout() {
        AuditError::Timeout {
            url: url.to_string(),
        }
    } else {
        AuditError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}
