//! Success Check
//!
//! Validates that the success server serves its welcome page.
//!
//! ## What it checks
//!
//! 1. One `GET /` on the success endpoint
//! 2. Status is exactly the expected status (200)
//! 3. Body contains the expected text, case-sensitive
//!
//! The status is checked first; a body is only inspected on the right status.
//!
//! ## Options
//!
//! - `expected_status`: status to require (default: 200)
//! - `expected_text`: substring the body must contain
//!   (default: "Welcome from Nginx on port 8080")

use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::traits::{Check, CheckContext, CheckError, CheckOptions, CheckResult};
use crate::client::{Endpoint, ProbeResponse};
use crate::report::{Tag, say};

pub const DEFAULT_EXPECTED_STATUS: u16 = 200;
pub const DEFAULT_EXPECTED_TEXT: &str = "Welcome from Nginx on port 8080";

/// Welcome page check
pub struct SuccessCheck;

/// Decide pass/fail for a response; `Err` carries the failure message
pub(crate) fn evaluate(
    response: &ProbeResponse,
    expected_status: u16,
    expected_text: &str,
) -> Result<String, String> {
    if response.status_code != expected_status {
        return Err(format!(
            "Expected status {expected_status} but got {}",
            response.status_code
        ));
    }
    if !response.body.contains(expected_text) {
        return Err("Expected text not found in response body".to_string());
    }
    Ok(format!(
        "Success server returned {expected_status} and expected content"
    ))
}

#[async_trait]
impl Check for SuccessCheck {
    fn name(&self) -> &'static str {
        "success"
    }

    fn description(&self) -> &'static str {
        "Success server answers 200 with the expected welcome text"
    }

    fn endpoint<'a>(&self, ctx: &'a CheckContext) -> &'a Endpoint {
        &ctx.success_endpoint
    }

    async fn run(
        &self,
        ctx: &CheckContext,
        opts: &CheckOptions,
    ) -> Result<CheckResult, CheckError> {
        let expected_status: u16 = opts.require("expected_status")?;
        let expected_text: String = opts.require("expected_text")?;
        let endpoint = self.endpoint(ctx);

        say(Tag::Test, format!("Checking success server at {endpoint}"));
        let start = Instant::now();
        let response = ctx.probe.get(endpoint).await?;
        let duration = start.elapsed();

        debug!(
            endpoint = %endpoint,
            status = response.status_code,
            body_len = response.body.len(),
            "Got response"
        );

        let result = match evaluate(&response, expected_status, &expected_text) {
            Ok(message) => {
                info!(endpoint = %endpoint, status = response.status_code, "Success check passed");
                CheckResult::passed(self.name(), endpoint, duration).with_message(message)
            }
            Err(message) => {
                warn!(
                    endpoint = %endpoint,
                    status = response.status_code,
                    expected_status = expected_status,
                    reason = %message,
                    "Success check failed"
                );
                CheckResult::failed(self.name(), endpoint, duration).with_message(message)
            }
        };

        Ok(result.with_status(response.status_code))
    }

    fn default_options(&self) -> CheckOptions {
        CheckOptions::default()
            .with_extra("expected_status", DEFAULT_EXPECTED_STATUS)
            .with_extra("expected_text", DEFAULT_EXPECTED_TEXT)
    }

    fn validate_options(&self, opts: &CheckOptions) -> Result<(), CheckError> {
        opts.require::<u16>("expected_status")?;
        opts.require::<String>("expected_text")?;
        Ok(())
    }
}
