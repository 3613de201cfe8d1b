//! HTTP probe client
//!
//! Issues bare `GET /` requests and reports either the response or the
//! connection-level reason it could not be obtained.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::redirect::Policy;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::types::{Endpoint, ProbeResponse};

/// Redirect hops followed before giving up
pub const MAX_REDIRECTS: usize = 10;

/// Connection-level failures
///
/// A response with an error status is not a `ProbeError`; it comes back as
/// a normal `ProbeResponse`.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Result type for probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Capability to fetch `GET /` from an endpoint
#[async_trait]
pub trait HttpProbe: Send + Sync {
    async fn get(&self, endpoint: &Endpoint) -> ProbeResult<ProbeResponse>;
}

/// `HttpProbe` backed by reqwest
///
/// # Example
/// ```no_run
/// use readyprobe::client::{Endpoint, HttpProbe, ProbeClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ProbeClient::new(None)?;
/// let response = client.get(&Endpoint::new("localhost", 8080)).await?;
/// println!("status: {}", response.status_code);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ProbeClient {
    client: Client,
    timeout: Option<Duration>,
}

impl ProbeClient {
    /// Create a client; `timeout` bounds each request when set
    pub fn new(timeout: Option<Duration>) -> ProbeResult<Self> {
        // Every probe gets its own connection; redirects are followed and the
        // final response is the one judged.
        let mut builder = Client::builder()
            .redirect(Policy::limited(MAX_REDIRECTS))
            .pool_max_idle_per_host(0);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| ProbeError::Request {
            url: String::new(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, timeout })
    }

    /// Create a client around an existing reqwest client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Per-request timeout, if any
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl HttpProbe for ProbeClient {
    async fn get(&self, endpoint: &Endpoint) -> ProbeResult<ProbeResponse> {
        let url = endpoint.url()?;
        debug!(endpoint = %endpoint, "GET");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify(url.as_str(), e))?;

        let status_code = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify(url.as_str(), e))?;
        let body = decode_body(&bytes);

        debug!(endpoint = %endpoint, status = status_code, body_len = body.len(), "Response");
        Ok(ProbeResponse { status_code, body })
    }
}

/// Decode as UTF-8, dropping invalid bytes rather than replacing them
fn decode_body(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

fn classify(url: &str, err: reqwest::Error) -> ProbeError {
    let url = url.to_string();
    if err.is_timeout() {
        ProbeError::Timeout { url }
    } else if err.is_connect() {
        ProbeError::Connect {
            url,
            reason: root_cause(&err),
        }
    } else {
        ProbeError::Request {
            url,
            reason: root_cause(&err),
        }
    }
}

/// reqwest wraps the io error a few levels deep; the innermost one is the
/// useful part ("Connection refused", "failed to lookup address").
fn root_cause(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}
