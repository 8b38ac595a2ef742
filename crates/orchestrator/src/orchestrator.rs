use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use provisioner_client::ProvisionerApi;
use slipway_core::{DesignRef, NodeFilter, ResultStatus};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use uuid::Uuid;

use crate::diagnostics::FailureDiagnostician;
use crate::error::OrchestratorError;
use crate::poller::{PollOutcome, PollSettings, TaskPoller};
use crate::report::{FailureCause, FailureReport};
use crate::state_machine::{OrchestrationState, OrchestrationStateMachine};
use crate::submitter::TaskSubmitter;

/// One unit of orchestration work.
#[derive(Debug, Clone)]
pub struct OrchestrationRequest {
    pub design_ref: DesignRef,
    pub action: String,
    pub node_filter: Option<NodeFilter>,
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestrationSuccess {
    pub task_id: String,
}

/// Terminal failure of an orchestration, with the diagnostic report when
/// one could be produced.
#[derive(Debug)]
pub struct OrchestrationFailure {
    pub cause: OrchestratorError,
    pub report: Option<FailureReport>,
}

impl OrchestrationFailure {
    fn bare(cause: OrchestratorError) -> Self {
        Self {
            cause,
            report: None,
        }
    }
}

impl fmt::Display for OrchestrationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cause)
    }
}

impl std::error::Error for OrchestrationFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

pub type OrchestrationResult = std::result::Result<OrchestrationSuccess, OrchestrationFailure>;

/// Drives one task to completion: submit, poll, and on failure diagnose.
///
/// The client handle and credentials behind it are inputs; one instance
/// orchestrates one task per `run` call and holds no state between calls.
pub struct TaskOrchestrator {
    client: Arc<dyn ProvisionerApi>,
    cancel: CancellationToken,
}

impl TaskOrchestrator {
    pub fn new(client: Arc<dyn ProvisionerApi>) -> Self {
        Self {
            client,
            cancel: CancellationToken::new(),
        }
    }

    /// Attach a caller-supplied cancellation signal, checked at every poll
    /// iteration and before each diagnostic fetch.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub async fn run(&self, request: OrchestrationRequest) -> OrchestrationResult {
        let run_id = Uuid::new_v4();
        let mut state = OrchestrationState::Created;

        info!(
            run_id = %run_id,
            action = %request.action,
            design_ref = %request.design_ref,
            "Starting task orchestration"
        );

        let settings = PollSettings::new(request.poll_interval, request.poll_timeout)
            .map_err(OrchestrationFailure::bare)?;

        let submitter = TaskSubmitter::new(Arc::clone(&self.client));
        let task_id = match submitter
            .submit(&request.design_ref, &request.action, request.node_filter.as_ref())
            .await
        {
            Ok(task_id) => task_id,
            Err(cause) => {
                self.advance(&mut state, OrchestrationState::SubmissionFailed)?;
                return Err(OrchestrationFailure::bare(cause));
            }
        };
        self.advance(&mut state, OrchestrationState::Submitted)?;

        self.advance(&mut state, OrchestrationState::Polling)?;
        let poller = TaskPoller::new(Arc::clone(&self.client))
            .with_cancellation(self.cancel.clone());
        let outcome = poller
            .poll(&task_id, &settings)
            .await
            .map_err(OrchestrationFailure::bare)?;

        match outcome {
            PollOutcome::Terminal {
                result: ResultStatus::Success,
                ..
            } => {
                self.advance(&mut state, OrchestrationState::Succeeded)?;
                info!(run_id = %run_id, %task_id, "Task completed successfully");
                Ok(OrchestrationSuccess { task_id })
            }
            PollOutcome::Terminal { status, result } => {
                error!(
                    run_id = %run_id,
                    %task_id,
                    status = status.as_str(),
                    result = result.as_str(),
                    "Task terminated unsuccessfully"
                );
                self.advance(&mut state, OrchestrationState::Failed)?;
                let cause = OrchestratorError::TaskFailed {
                    task_id: task_id.clone(),
                    action: request.action.clone(),
                };
                self.report_failure(&mut state, &task_id, FailureCause::RemoteFailure, cause)
                    .await
            }
            PollOutcome::TimedOut { last_seen } => {
                error!(
                    run_id = %run_id,
                    %task_id,
                    last_seen = ?last_seen.map(|s| s.as_str()),
                    "Task did not reach a terminal state within the time budget"
                );
                self.advance(&mut state, OrchestrationState::TimedOut)?;
                let cause = OrchestratorError::TimedOut {
                    task_id: task_id.clone(),
                    budget_secs: settings.timeout.as_secs(),
                };
                self.report_failure(&mut state, &task_id, FailureCause::TimedOut, cause)
                    .await
            }
        }
    }

    async fn report_failure(
        &self,
        state: &mut OrchestrationState,
        task_id: &str,
        failure_cause: FailureCause,
        cause: OrchestratorError,
    ) -> OrchestrationResult {
        let diagnostician = FailureDiagnostician::new(Arc::clone(&self.client))
            .with_cancellation(self.cancel.clone());

        let report = diagnostician
            .diagnose(task_id, failure_cause)
            .await
            .map_err(OrchestrationFailure::bare)?;
        self.advance(state, OrchestrationState::Reported)?;

        // A snapshot inconsistency outranks the original cause: the report
        // is partial and the caller has to know.
        let cause = match report.incomplete() {
            Some(detail) => OrchestratorError::InconsistentState(detail.to_string()),
            None => cause,
        };

        Err(OrchestrationFailure {
            cause,
            report: Some(report),
        })
    }

    fn advance(
        &self,
        state: &mut OrchestrationState,
        to: OrchestrationState,
    ) -> std::result::Result<(), OrchestrationFailure> {
        OrchestrationStateMachine::validate_transition(state, &to)
            .map_err(OrchestrationFailure::bare)?;
        *state = to;
        Ok(())
    }
}
