use provisioner_client::ClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Task submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Provisioning service error: {0}")]
    RemoteService(#[source] ClientError),

    #[error("Task {task_id} ({action}) terminated unsuccessfully")]
    TaskFailed { task_id: String, action: String },

    #[error("Task {task_id} not terminal after {budget_secs}s time budget")]
    TimedOut { task_id: String, budget_secs: u64 },

    #[error("Inconsistent inventory snapshot: {0}")]
    InconsistentState(String),

    #[error("Orchestration cancelled")]
    Cancelled,

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid poll settings: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_the_task() {
        let error = OrchestratorError::TaskFailed {
            task_id: "t-1".to_string(),
            action: "deploy_nodes".to_string(),
        };
        let rendered = error.to_string();
        assert!(rendered.contains("t-1"));
        assert!(rendered.contains("deploy_nodes"));
    }

    #[test]
    fn test_timeout_display_carries_budget() {
        let error = OrchestratorError::TimedOut {
            task_id: "t-1".to_string(),
            budget_secs: 1800,
        };
        assert!(error.to_string().contains("1800"));
    }
}
