//! Readyprobe Test Kit
//!
//! Test infrastructure for exercising readyprobe against real HTTP servers.
//!
//! This crate provides:
//! - Mock success/error servers standing in for the nginx pair
//! - A helper for a port nothing listens on
//!
//! # Example
//!
//! ```no_run
//! use readyprobe_testkit::MockSite;
//!
//! # async fn example() {
//! // Success server answers 200 + welcome page, error server answers 500
//! let site = MockSite::new().start().await;
//! assert_ne!(site.success_port(), site.error_port());
//! # }
//! ```

pub mod mock;

// Re-exports for convenience
pub use mock::{MockResponse, MockSite, RunningSite, WELCOME_TEXT, unused_port};
