//! Configuration parsing
//!
//! Handles the optional configuration file and its resolution into a
//! `RunnerConfig`. Values are layered: built-in defaults, then the file,
//! then `TARGET_HOST` from the environment, then command-line flags.
//!
//! ## Configuration Format
//!
//! ```yaml
//! target:
//!   host: nginx
//!   success_port: 8080
//!   error_port: 8081
//!   request_timeout: 10s
//!
//! readiness:
//!   max_attempts: 10
//!   delay: 2s
//!
//! checks:
//!   success:
//!     expected_text: Welcome from Nginx on port 8080
//!   error:
//!     expected_status: 500
//! ```

mod target;

pub use target::{
    CheckConfig, Config, ConfigError, DEFAULT_ERROR_PORT, DEFAULT_HOST, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_RETRY_DELAY, DEFAULT_SUCCESS_PORT, ReadinessConfig, TARGET_HOST_ENV, TargetConfig,
};
