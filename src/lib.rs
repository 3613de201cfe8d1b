//! Readyprobe - HTTP readiness and status checks
//!
//! Waits for an HTTP service to start answering, then verifies two of its
//! endpoints: a success server that must answer 200 with a known welcome
//! text, and an error server that must answer 500. The result is a single
//! pass/fail outcome suitable for a process exit code.
//!
//! ## Modules
//!
//! - [`client`] - HTTP probe capability and the reqwest-backed client
//! - [`readiness`] - Bounded readiness polling
//! - [`checks`] - Check implementations (success, error) and registry
//! - [`runner`] - Sequential run and result aggregation
//! - [`config`] - Configuration file, environment and defaults
//! - [`report`] - Tagged console lines

pub mod checks;
pub mod client;
pub mod config;
pub mod readiness;
pub mod report;
pub mod runner;
