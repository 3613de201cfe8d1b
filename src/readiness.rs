//! Readiness polling
//!
//! Waits for an endpoint to answer at all before any check runs. Any HTTP
//! response counts as "up", whatever its status; only connection-level
//! failures are retried.
//!
//! The budget is exact: `max_attempts` requests with a fixed `delay` between
//! consecutive ones, and no sleep after the last attempt.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::client::{Endpoint, HttpProbe, ProbeError};
use crate::report::{Tag, say};

#[derive(Debug, Error)]
pub enum ReadinessError {
    #[error("Service at {url} did not become ready after {attempts} attempts")]
    Exhausted {
        url: String,
        attempts: u32,
        #[source]
        last_error: ProbeError,
    },
}

/// The endpoint answered
#[derive(Debug, Clone, Serialize)]
pub struct Readiness {
    pub endpoint: Endpoint,
    /// Attempts used, including the successful one
    pub attempts: u32,
    /// Status of the response that ended the wait
    pub status_code: u16,
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
}

/// Bounded retry loop with a fixed delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPoller {
    max_attempts: u32,
    delay: Duration,
}

impl ReadinessPoller {
    /// `max_attempts` below 1 is treated as 1
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Poll `GET /` on `endpoint` until it responds or the budget runs out
    pub async fn wait(
        &self,
        probe: &dyn HttpProbe,
        endpoint: &Endpoint,
    ) -> Result<Readiness, ReadinessError> {
        let start = Instant::now();
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                debug!(
                    endpoint = %endpoint,
                    delay_ms = self.delay.as_millis(),
                    "Waiting before next attempt"
                );
                tokio::time::sleep(self.delay).await;
            }

            match probe.get(endpoint).await {
                Ok(response) => {
                    say(
                        Tag::Info,
                        format!(
                            "Service at {endpoint} is up (received status {})",
                            response.status_code
                        ),
                    );
                    info!(
                        endpoint = %endpoint,
                        attempt = attempt,
                        status = response.status_code,
                        "Service is up"
                    );
                    return Ok(Readiness {
                        endpoint: endpoint.clone(),
                        attempts: attempt,
                        status_code: response.status_code,
                        elapsed: start.elapsed(),
                    });
                }
                Err(e) => {
                    say(
                        Tag::Info,
                        format!("Attempt {attempt}/{} failed: {e}", self.max_attempts),
                    );
                    warn!(
                        endpoint = %endpoint,
                        attempt = attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Service not ready"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(ReadinessError::Exhausted {
            url: endpoint.to_string(),
            attempts: self.max_attempts,
            last_error: last_error.unwrap_or_else(|| ProbeError::Connect {
                url: endpoint.to_string(),
                reason: "no attempt made".into(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::scripted::{Scripted, ScriptedProbe};

    const PORT: u16 = 8080;

    fn endpoint() -> Endpoint {
        Endpoint::new("nginx", PORT)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_on_first_attempt() {
        let probe = ScriptedProbe::new().on(PORT, vec![Scripted::respond(200, "ok")]);
        let poller = ReadinessPoller::new(10, Duration::from_secs(2));

        let readiness = poller.wait(&probe, &endpoint()).await.unwrap();
        assert_eq!(readiness.attempts, 1);
        assert_eq!(readiness.status_code, 200);
        assert_eq!(readiness.elapsed, Duration::ZERO);
        assert_eq!(probe.calls_to(PORT), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_any_status_counts_as_ready() {
        let probe = ScriptedProbe::new().on(PORT, vec![Scripted::respond(503, "starting")]);
        let poller = ReadinessPoller::new(3, Duration::from_secs(2));

        let readiness = poller.wait(&probe, &endpoint()).await.unwrap();
        assert_eq!(readiness.status_code, 503);
        assert_eq!(readiness.attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_after_connection_failures() {
        let probe = ScriptedProbe::new().on(
            PORT,
            vec![
                Scripted::Refuse,
                Scripted::Refuse,
                Scripted::respond(200, "ok"),
            ],
        );
        let poller = ReadinessPoller::new(10, Duration::from_secs(2));

        let readiness = poller.wait(&probe, &endpoint()).await.unwrap();
        assert_eq!(readiness.attempts, 3);
        assert_eq!(readiness.elapsed, Duration::from_secs(4));
        assert_eq!(probe.calls_to(PORT), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_exact_budget() {
        let probe = ScriptedProbe::new().on(PORT, vec![Scripted::Refuse]);
        let poller = ReadinessPoller::new(10, Duration::from_secs(2));
        let start = Instant::now();

        let err = poller.wait(&probe, &endpoint()).await.unwrap_err();
        let ReadinessError::Exhausted { attempts, url, .. } = &err;
        assert_eq!(*attempts, 10);
        assert_eq!(url, "http://nginx:8080/");
        assert_eq!(probe.calls_to(PORT), 10);

        // N-1 delays, none after the final attempt
        assert_eq!(start.elapsed(), Duration::from_secs(18));
        let times = probe.call_times(PORT);
        for pair in times.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::from_secs(2));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_budget_never_sleeps() {
        let probe = ScriptedProbe::new().on(PORT, vec![Scripted::Refuse]);
        let poller = ReadinessPoller::new(1, Duration::from_secs(30));
        let start = Instant::now();

        assert!(poller.wait(&probe, &endpoint()).await.is_err());
        assert_eq!(probe.calls_to(PORT), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let poller = ReadinessPoller::new(0, Duration::from_secs(1));
        assert_eq!(poller.max_attempts(), 1);
    }

    #[test]
    fn test_exhausted_message() {
        let err = ReadinessError::Exhausted {
            url: "http://nginx:8080/".into(),
            attempts: 10,
            last_error: ProbeError::Timeout {
                url: "http://nginx:8080/".into(),
            },
        };
        assert_eq!(
            err.to_string(),
            "Service at http://nginx:8080/ did not become ready after 10 attempts"
        );
    }
}
