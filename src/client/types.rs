//! Probe types
//!
//! An `Endpoint` names an HTTP target, a `ProbeResponse` is what one GET
//! against it returned.

use serde::{Deserialize, Serialize};
use url::Url;

/// An HTTP target identified by host and port
///
/// Every probe is a plain `GET /` against the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Build the URL for `GET /` on this endpoint
    pub fn url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("http://{}:{}/", self.host, self.port))
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "http://{}:{}/", self.host, self.port)
    }
}

/// Status and body of a single HTTP response
///
/// Any status code ends up here, including 4xx and 5xx.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResponse {
    pub status_code: u16,
    pub body: String,
}

impl ProbeResponse {
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }
}
