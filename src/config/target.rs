//! Target configuration types
//!
//! Defines the structure of the configuration file and how it resolves into
//! a `RunnerConfig`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::checks::{CHECKS, Check, CheckOptions};
use crate::client::Endpoint;
use crate::readiness::ReadinessPoller;
use crate::runner::{RunnerConfig, ScheduledCheck};

/// Environment variable overriding the target host
pub const TARGET_HOST_ENV: &str = "TARGET_HOST";

/// Host used when neither the config file nor the environment names one
pub const DEFAULT_HOST: &str = "nginx";

pub const DEFAULT_SUCCESS_PORT: u16 = 8080;
pub const DEFAULT_ERROR_PORT: u16 = 8081;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Errors that can occur during configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Unknown check: {0}")]
    UnknownCheck(String),
}

/// Where the service under test lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Hostname shared by both endpoints
    #[serde(default = "default_host")]
    pub host: String,

    /// Port of the server expected to answer 200
    #[serde(default = "default_success_port")]
    pub success_port: u16,

    /// Port of the server expected to answer 500
    #[serde(default = "default_error_port")]
    pub error_port: u16,

    /// Per-request timeout; unset means the HTTP client's default
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_timeout: Option<Duration>,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_success_port() -> u16 {
    DEFAULT_SUCCESS_PORT
}

fn default_error_port() -> u16 {
    DEFAULT_ERROR_PORT
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            success_port: DEFAULT_SUCCESS_PORT,
            error_port: DEFAULT_ERROR_PORT,
            request_timeout: None,
        }
    }
}

impl TargetConfig {
    pub fn success_endpoint(&self) -> Endpoint {
        Endpoint::new(&self.host, self.success_port)
    }

    pub fn error_endpoint(&self) -> Endpoint {
        Endpoint::new(&self.host, self.error_port)
    }
}

/// Readiness polling budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessConfig {
    /// Attempts before giving up (at least 1)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause between attempts
    #[serde(default = "default_retry_delay", with = "humantime_serde")]
    pub delay: Duration,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_retry_delay() -> Duration {
    DEFAULT_RETRY_DELAY
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Configuration for a single check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Whether this check is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Check-specific options (`expected_status`, `expected_text`)
    #[serde(default, flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

fn default_enabled() -> bool {
    true
}

impl CheckConfig {
    /// Merge over a check's defaults; keys set here win
    pub fn to_check_options(&self, defaults: &CheckOptions) -> CheckOptions {
        let mut extra = defaults.extra.clone();
        extra.extend(self.extra.clone());
        CheckOptions { extra }
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            extra: HashMap::new(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub readiness: ReadinessConfig,

    /// Check configurations (check_name -> config)
    #[serde(default)]
    pub checks: HashMap<String, CheckConfig>,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply environment overrides
    ///
    /// Only `TARGET_HOST` is read; ports are never taken from the environment.
    /// Takes a lookup so callers can pass `std::env::var` or a fixed map.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(TARGET_HOST_ENV).filter(|h| !h.trim().is_empty()) {
            self.target.host = host;
        }
    }

    /// Reject values the runner cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target.host.trim().is_empty() {
            return Err(ConfigError::Invalid("target.host must not be empty".into()));
        }
        if self.target.success_port == 0 || self.target.error_port == 0 {
            return Err(ConfigError::Invalid("target ports must be non-zero".into()));
        }
        if self.readiness.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "readiness.max_attempts must be at least 1".into(),
            ));
        }
        for (name, check_config) in &self.checks {
            let check = CHECKS
                .get(name.as_str())
                .ok_or_else(|| ConfigError::UnknownCheck(name.clone()))?;
            let options = check_config.to_check_options(&check.default_options());
            check
                .validate_options(&options)
                .map_err(|e| ConfigError::Invalid(format!("checks.{name}: {e}")))?;
        }
        Ok(())
    }

    /// Get configuration for a specific check
    pub fn check_config(&self, name: &str) -> Option<&CheckConfig> {
        self.checks.get(name)
    }

    /// Check if a specific check is enabled
    pub fn is_check_enabled(&self, name: &str) -> bool {
        self.checks.get(name).map(|c| c.enabled).unwrap_or(true)
    }

    /// Resolve into what the runner executes
    ///
    /// With a `filter`, exactly the named checks run (enabled or not); without
    /// one, every enabled check runs. Either way in registry order.
    pub fn to_runner_config(&self, filter: Option<&[String]>) -> Result<RunnerConfig, ConfigError> {
        self.validate()?;

        if let Some(names) = filter
            && let Some(unknown) = names.iter().find(|n| !CHECKS.contains_key(n.as_str()))
        {
            return Err(ConfigError::UnknownCheck(unknown.clone()));
        }

        let checks: Vec<ScheduledCheck> = CHECKS
            .iter()
            .filter(|(name, _)| match filter {
                Some(names) => names.iter().any(|n| n == *name),
                None => self.is_check_enabled(name),
            })
            .map(|(name, check)| {
                let options = self
                    .check_config(name)
                    .map(|c| c.to_check_options(&check.default_options()))
                    .unwrap_or_else(|| check.default_options());
                ScheduledCheck {
                    check: Arc::clone(check),
                    options,
                }
            })
            .collect();

        if checks.is_empty() {
            return Err(ConfigError::Invalid("no checks selected".into()));
        }

        Ok(RunnerConfig {
            success_endpoint: self.target.success_endpoint(),
            error_endpoint: self.target.error_endpoint(),
            readiness: ReadinessPoller::new(self.readiness.max_attempts, self.readiness.delay),
            checks,
        })
    }

    /// Generate a default configuration
    pub fn default_config() -> Self {
        Config {
            target: TargetConfig::default(),
            readiness: ReadinessConfig::default(),
            checks: CHECKS
                .keys()
                .map(|name| (name.to_string(), CheckConfig::default()))
                .collect(),
        }
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
