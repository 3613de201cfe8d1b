//! Test runner
//!
//! Waits for the success endpoint, then runs every scheduled check in order
//! and folds the verdicts into one outcome.
//!
//! Everything is sequential: one request at a time, each check after the
//! previous one finished. A failing check never stops the ones after it.
//! A readiness failure stops the run before any check.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::checks::{Check, CheckContext, CheckOptions, CheckResult};
use crate::client::{Endpoint, HttpProbe};
use crate::readiness::{Readiness, ReadinessPoller};
use crate::report::{Tag, say};

/// A check together with the options it runs with
#[derive(Clone)]
pub struct ScheduledCheck {
    pub check: Arc<dyn Check>,
    pub options: CheckOptions,
}

/// Everything a run needs, resolved up front
#[derive(Clone)]
pub struct RunnerConfig {
    pub success_endpoint: Endpoint,
    pub error_endpoint: Endpoint,
    pub readiness: ReadinessPoller,
    /// Checks in execution order
    pub checks: Vec<ScheduledCheck>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    Pass,
    Fail,
}

impl RunOutcome {
    /// Process exit status: 0 when everything passed, 1 otherwise
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Pass => 0,
            RunOutcome::Fail => 1,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, RunOutcome::Pass)
    }
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunOutcome::Pass => write!(f, "pass"),
            RunOutcome::Fail => write!(f, "fail"),
        }
    }
}

/// What happened during one run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Present when the success endpoint came up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness: Option<Readiness>,
    /// Why the run was aborted before any check
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatal: Option<String>,
    pub results: Vec<CheckResult>,
}

impl RunReport {
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.passed_count()
    }

    pub fn exit_code(&self) -> u8 {
        self.outcome.exit_code()
    }
}

pub struct Runner {
    config: RunnerConfig,
    probe: Arc<dyn HttpProbe>,
}

impl Runner {
    pub fn new(config: RunnerConfig, probe: Arc<dyn HttpProbe>) -> Self {
        Self { config, probe }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub async fn run(&self) -> RunReport {
        let config = &self.config;

        info!(
            success_endpoint = %config.success_endpoint,
            error_endpoint = %config.error_endpoint,
            max_attempts = config.readiness.max_attempts(),
            delay_ms = config.readiness.delay().as_millis(),
            "Waiting for service"
        );

        // Only the success endpoint is polled; the error endpoint is assumed
        // to come up with it.
        let readiness = match config
            .readiness
            .wait(self.probe.as_ref(), &config.success_endpoint)
            .await
        {
            Ok(readiness) => readiness,
            Err(e) => {
                say(Tag::Fatal, &e);
                error!(error = %e, "Service never became ready");
                return RunReport {
                    outcome: RunOutcome::Fail,
                    readiness: None,
                    fatal: Some(e.to_string()),
                    results: Vec::new(),
                };
            }
        };

        let ctx = CheckContext::new(
            Arc::clone(&self.probe),
            config.success_endpoint.clone(),
            config.error_endpoint.clone(),
        );

        let mut results = Vec::with_capacity(config.checks.len());
        for scheduled in &config.checks {
            results.push(run_check(&ctx, scheduled).await);
        }

        let outcome = if results.iter().all(|r| r.passed) {
            RunOutcome::Pass
        } else {
            RunOutcome::Fail
        };

        let report = RunReport {
            outcome,
            readiness: Some(readiness),
            fatal: None,
            results,
        };

        info!(
            outcome = %outcome,
            passed = report.passed_count(),
            failed = report.failed_count(),
            "Run complete"
        );

        if outcome.is_pass() {
            say(Tag::Result, "All tests passed ✅");
        } else {
            say(Tag::Result, "Some tests failed ❌");
        }

        report
    }
}

async fn run_check(ctx: &CheckContext, scheduled: &ScheduledCheck) -> CheckResult {
    let check = &scheduled.check;
    let start = Instant::now();

    match check.run(ctx, &scheduled.options).await {
        Ok(result) => {
            let message = result.message.as_deref().unwrap_or(check.name());
            if result.passed {
                say(Tag::Ok, message);
            } else {
                say(Tag::Error, message);
            }
            result
        }
        Err(e) => {
            // No response at all; still only this check fails.
            say(Tag::Error, &e);
            error!(check = check.name(), error = %e, "Check error");
            CheckResult::failed(check.name(), check.endpoint(ctx), start.elapsed())
                .with_message(e.to_string())
        }
    }
}
