//! Task orchestration for the provisioning service
//!
//! Drives one provisioning task from submission to a terminal state:
//! submit, poll within a wall-clock budget, and on failure or timeout walk
//! the task's sub-task hierarchy into an operator-facing report.

pub mod diagnostics;
pub mod error;
pub mod orchestrator;
pub mod poller;
pub mod report;
pub mod state_machine;
pub mod submitter;

#[cfg(test)]
mod test_support;

pub use diagnostics::FailureDiagnostician;
pub use error::{OrchestratorError, Result};
pub use orchestrator::{
    OrchestrationFailure, OrchestrationRequest, OrchestrationResult, OrchestrationSuccess,
    TaskOrchestrator,
};
pub use poller::{PollOutcome, PollSettings, TaskPoller};
pub use report::{FailureCause, FailureReport, ReportEntry};
pub use state_machine::{OrchestrationState, OrchestrationStateMachine};
pub use submitter::TaskSubmitter;
