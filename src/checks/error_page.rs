//! Error Check
//!
//! Validates that the error server fails the way it is configured to.
//!
//! ## What it checks
//!
//! One `GET /` on the error endpoint must answer with exactly the expected
//! status (500). The body is ignored.
//!
//! The error endpoint gets no readiness poll of its own; it is assumed to
//! come up together with the success endpoint.
//!
//! ## Options
//!
//! - `expected_status`: status to require (default: 500)

use async_trait::async_trait;
use std::time::Instant;
use tracing::{info, warn};

use super::traits::{Check, CheckContext, CheckError, CheckOptions, CheckResult};
use crate::client::Endpoint;
use crate::report::{Tag, say};

pub const DEFAULT_EXPECTED_STATUS: u16 = 500;

/// Error status check
pub struct ErrorCheck;

#[async_trait]
impl Check for ErrorCheck {
    fn name(&self) -> &'static str {
        "error"
    }

    fn description(&self) -> &'static str {
        "Error server answers with status 500"
    }

    fn endpoint<'a>(&self, ctx: &'a CheckContext) -> &'a Endpoint {
        &ctx.error_endpoint
    }

    async fn run(
        &self,
        ctx: &CheckContext,
        opts: &CheckOptions,
    ) -> Result<CheckResult, CheckError> {
        let expected_status: u16 = opts.require("expected_status")?;
        let endpoint = self.endpoint(ctx);

        say(Tag::Test, format!("Checking error server at {endpoint}"));
        let start = Instant::now();
        let response = ctx.probe.get(endpoint).await?;
        let duration = start.elapsed();

        let result = if response.status_code == expected_status {
            info!(endpoint = %endpoint, status = response.status_code, "Error check passed");
            CheckResult::passed(self.name(), endpoint, duration).with_message(format!(
                "Error server returned expected status {expected_status}"
            ))
        } else {
            warn!(
                endpoint = %endpoint,
                status = response.status_code,
                expected_status = expected_status,
                "Error check failed"
            );
            CheckResult::failed(self.name(), endpoint, duration).with_message(format!(
                "Expected status {expected_status} but got {}",
                response.status_code
            ))
        };

        Ok(result.with_status(response.status_code))
    }

    fn default_options(&self) -> CheckOptions {
        CheckOptions::default().with_extra("expected_status", DEFAULT_EXPECTED_STATUS)
    }

    fn validate_options(&self, opts: &CheckOptions) -> Result<(), CheckError> {
        opts.require::<u16>("expected_status").map(|_| ())
    }
}
