use std::sync::Arc;
use std::time::Duration;

use provisioner_client::ProvisionerApi;
use slipway_core::{ResultStatus, TaskState};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::{OrchestratorError, Result};

/// Interval and total wall-clock budget for one poll.
///
/// The budget is total, not per attempt: the attempt count is fixed at
/// construction and transient retries never extend it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSettings {
    pub fn new(interval: Duration, timeout: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(OrchestratorError::Validation(
                "poll interval must be positive".to_string(),
            ));
        }
        if timeout.is_zero() {
            return Err(OrchestratorError::Validation(
                "poll timeout must be positive".to_string(),
            ));
        }
        Ok(Self { interval, timeout })
    }

    /// Number of queries the budget allows. The last attempt may land
    /// exactly on the budget boundary.
    pub fn attempts(&self) -> u32 {
        (self.timeout.as_millis() / self.interval.as_millis()) as u32 + 1
    }
}

/// Result of a polling cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The service reported a terminal state.
    Terminal {
        status: TaskState,
        result: ResultStatus,
    },
    /// Budget exhausted without a terminal state. `last_seen` is `None`
    /// when no query succeeded at all.
    TimedOut { last_seen: Option<TaskState> },
}

/// Polls one task until it reaches a terminal state or the budget runs out.
pub struct TaskPoller {
    client: Arc<dyn ProvisionerApi>,
    cancel: CancellationToken,
}

impl TaskPoller {
    pub fn new(client: Arc<dyn ProvisionerApi>) -> Self {
        Self {
            client,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Query the task every `interval` until terminal or out of budget.
    ///
    /// Transient query failures are logged and retried on the next
    /// scheduled attempt; a definitive rejection by the service aborts the
    /// poll immediately.
    pub async fn poll(&self, task_id: &str, settings: &PollSettings) -> Result<PollOutcome> {
        let attempts = settings.attempts();
        let mut last_seen: Option<TaskState> = None;

        info!(
            task_id,
            attempts,
            interval_secs = settings.interval.as_secs(),
            timeout_secs = settings.timeout.as_secs(),
            "Polling task until terminal state"
        );

        for attempt in 1..=attempts {
            if self.cancel.is_cancelled() {
                return Err(OrchestratorError::Cancelled);
            }

            match self.client.get_task(task_id).await {
                Ok(record) => {
                    info!(
                        task_id,
                        attempt,
                        status = record.status.as_str(),
                        "Observed task status"
                    );
                    last_seen = Some(record.status);

                    if record.status.is_terminal() {
                        info!(
                            task_id,
                            status = record.status.as_str(),
                            result = record.result.status.as_str(),
                            "Task reached terminal state"
                        );
                        return Ok(PollOutcome::Terminal {
                            status: record.status,
                            result: record.result.status,
                        });
                    }
                }
                Err(e) if e.is_transient() => {
                    warn!(
                        task_id,
                        attempt,
                        error = %e,
                        "Unable to retrieve task state, retrying"
                    );
                }
                Err(e) => {
                    error!(task_id, error = %e, "Task query rejected, aborting poll");
                    return Err(OrchestratorError::RemoteService(e));
                }
            }

            // No trailing sleep once the budget is spent.
            if attempt < attempts {
                tokio::select! {
                    _ = self.cancel.cancelled() => return Err(OrchestratorError::Cancelled),
                    _ = tokio::time::sleep(settings.interval) => {}
                }
            }
        }

        warn!(
            task_id,
            last_seen = ?last_seen.map(|s| s.as_str()),
            timeout_secs = settings.timeout.as_secs(),
            "Time budget exhausted before a terminal state"
        );
        Ok(PollOutcome::TimedOut { last_seen })
    }
}
