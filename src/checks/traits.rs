//! Check trait and supporting types
//!
//! The `Check` trait defines the interface for all endpoint checks.
//! Each check can be configured via `CheckOptions` and returns a `CheckResult`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::client::{Endpoint, HttpProbe, ProbeError};

/// Errors that stop a check from producing a verdict
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("{0}")]
    Probe(#[from] ProbeError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Verdict of one check against one endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Name of the check
    pub check_name: String,
    /// URL that was probed
    pub endpoint: String,
    pub passed: bool,
    /// Status the endpoint answered with, if it answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// What passed or what went wrong
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}

impl CheckResult {
    pub fn passed(check_name: impl Into<String>, endpoint: &Endpoint, duration: Duration) -> Self {
        Self {
            check_name: check_name.into(),
            endpoint: endpoint.to_string(),
            passed: true,
            status_code: None,
            message: None,
            duration,
        }
    }

    pub fn failed(check_name: impl Into<String>, endpoint: &Endpoint, duration: Duration) -> Self {
        Self {
            passed: false,
            ..Self::passed(check_name, endpoint, duration)
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Add a summary message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Configuration options for a check
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckOptions {
    /// Check-specific options (arbitrary key-value pairs)
    #[serde(default, flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl CheckOptions {
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.extra.insert(key.into(), v);
        }
        self
    }

    /// Get an extra option as a specific type
    pub fn get_extra<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.extra
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Like `get_extra`, but a present value of the wrong type is an error
    pub fn require<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<T, CheckError> {
        let value = self
            .extra
            .get(key)
            .ok_or_else(|| CheckError::Config(format!("missing option `{key}`")))?;
        serde_json::from_value(value.clone())
            .map_err(|e| CheckError::Config(format!("invalid option `{key}`: {e}")))
    }
}

/// Context provided to checks during execution
#[derive(Clone)]
pub struct CheckContext {
    pub probe: Arc<dyn HttpProbe>,
    /// Server expected to answer 200 with the welcome page
    pub success_endpoint: Endpoint,
    /// Server expected to answer 500
    pub error_endpoint: Endpoint,
}

impl CheckContext {
    pub fn new(probe: Arc<dyn HttpProbe>, success_endpoint: Endpoint, error_endpoint: Endpoint) -> Self {
        Self {
            probe,
            success_endpoint,
            error_endpoint,
        }
    }
}

/// Trait for implementing endpoint checks
///
/// Checks are registered in the `CHECKS` registry and can be invoked by name.
/// A check that gets a response always returns `Ok`; `passed` carries the
/// verdict. `Err` is reserved for not getting a response at all.
#[async_trait]
pub trait Check: Send + Sync {
    /// Unique name for this check (used in CLI and config)
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// The endpoint this check probes
    fn endpoint<'a>(&self, ctx: &'a CheckContext) -> &'a Endpoint;

    async fn run(&self, ctx: &CheckContext, opts: &CheckOptions)
    -> Result<CheckResult, CheckError>;

    fn default_options(&self) -> CheckOptions {
        CheckOptions::default()
    }

    /// Reject options `run` would fail to read
    fn validate_options(&self, _opts: &CheckOptions) -> Result<(), CheckError> {
        Ok(())
    }
}
