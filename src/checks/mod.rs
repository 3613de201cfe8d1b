//! Endpoint checks
//!
//! This module provides the `Check` trait and the two checks run after the
//! service is up:
//!
//! - **success**: the success server answers 200 with the welcome text
//! - **error**: the error server answers 500
//!
//! ## Adding New Checks
//!
//! 1. Create a new file in `src/checks/` (e.g., `mycheck.rs`)
//! 2. Implement the `Check` trait
//! 3. Register in `registry.rs`
//! 4. Add to `mod.rs` exports

mod error_page;
pub mod registry;
mod success;
mod traits;

pub use error_page::ErrorCheck;
pub use registry::CHECKS;
pub use success::SuccessCheck;
pub use traits::*;
