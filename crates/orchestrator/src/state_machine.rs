use crate::error::{OrchestratorError, Result};

/// Phases of a single task orchestration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestrationState {
    Created,
    Submitted,
    Polling,
    Succeeded,
    Failed,
    TimedOut,
    Reported,
    SubmissionFailed,
}

impl OrchestrationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Submitted => "submitted",
            Self::Polling => "polling",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
            Self::Reported => "reported",
            Self::SubmissionFailed => "submission_failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Reported | Self::SubmissionFailed
        )
    }
}

pub struct OrchestrationStateMachine;

impl OrchestrationStateMachine {
    pub fn validate_transition(from: &OrchestrationState, to: &OrchestrationState) -> Result<()> {
        let allowed = Self::allowed_transitions(from);

        if allowed.contains(to) {
            Ok(())
        } else {
            Err(OrchestratorError::InvalidTransition {
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
            })
        }
    }

    fn allowed_transitions(from: &OrchestrationState) -> Vec<OrchestrationState> {
        match from {
            OrchestrationState::Created => vec![
                OrchestrationState::Submitted,
                OrchestrationState::SubmissionFailed,
            ],
            OrchestrationState::Submitted => vec![OrchestrationState::Polling],
            OrchestrationState::Polling => vec![
                OrchestrationState::Succeeded,
                OrchestrationState::Failed,
                OrchestrationState::TimedOut,
            ],
            OrchestrationState::Failed => vec![OrchestrationState::Reported],
            OrchestrationState::TimedOut => vec![OrchestrationState::Reported],
            OrchestrationState::Succeeded
            | OrchestrationState::Reported
            | OrchestrationState::SubmissionFailed => vec![],
        }
    }

    pub fn can_transition(from: &OrchestrationState, to: &OrchestrationState) -> bool {
        Self::validate_transition(from, to).is_ok()
    }
}
