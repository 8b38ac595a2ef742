use std::collections::HashMap;
use std::sync::Arc;

use provisioner_client::ProvisionerApi;
use slipway_core::TaskRecord;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::{OrchestratorError, Result};
use crate::report::{FailureCause, FailureReport, ReportEntry};

/// Walks a failed task's sub-task hierarchy into a linear report.
///
/// Works from a single inventory snapshot: the service models failures
/// hierarchically, and a task or sub-task missing from a snapshot taken
/// right after the failure is a consistency problem that must be surfaced,
/// not hidden.
pub struct FailureDiagnostician {
    client: Arc<dyn ProvisionerApi>,
    cancel: CancellationToken,
}

impl FailureDiagnostician {
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

    /// Build the failure report for `task_id`.
    ///
    /// Returns `Ok` even when the snapshot is inconsistent; the partial
    /// report then carries an [`ReportEntry::Incomplete`] marker. `Err` is
    /// reserved for the inventory fetch itself failing (nothing could be
    /// gathered) and cancellation.
    pub async fn diagnose(&self, task_id: &str, cause: FailureCause) -> Result<FailureReport> {
        if self.cancel.is_cancelled() {
            return Err(OrchestratorError::Cancelled);
        }

        info!(task_id, "Retrieving all task records from the provisioning service");
        let all_tasks = self.client.get_tasks().await.map_err(|e| {
            error!(error = %e, "Failed to fetch task inventory, cannot diagnose");
            OrchestratorError::RemoteService(e)
        })?;

        let by_id: HashMap<&str, &TaskRecord> = all_tasks
            .iter()
            .map(|task| (task.task_id.as_str(), task))
            .collect();

        let mut report = FailureReport::default();

        let Some(target) = by_id.get(task_id) else {
            error!(task_id, "Finished task missing from inventory snapshot");
            report.push(ReportEntry::Incomplete {
                detail: format!("task {} missing from inventory snapshot", task_id),
            });
            return Ok(report);
        };

        error!(task_id, "{} task {}", target.action, cause.describe());
        report.push(ReportEntry::Summary {
            action: target.action.clone(),
            cause,
            record: serde_json::to_value(target)
                .map_err(|e| OrchestratorError::Serialization(e.to_string()))?,
        });

        for subtask_id in &target.subtask_ids {
            if self.cancel.is_cancelled() {
                return Err(OrchestratorError::Cancelled);
            }

            info!(%subtask_id, "Examining subtask");

            let Some(subtask) = by_id.get(subtask_id.as_str()) else {
                error!(%subtask_id, "Referenced subtask missing from inventory snapshot");
                report.push(ReportEntry::Incomplete {
                    detail: format!("subtask {} missing from inventory snapshot", subtask_id),
                });
                return Ok(report);
            };

            info!(
                %subtask_id,
                action = %subtask.action,
                result = subtask.result.status.as_str(),
                "Subtask result"
            );
            report.push(ReportEntry::Subtask {
                task_id: subtask.task_id.clone(),
                action: subtask.action.clone(),
                result: subtask.result.status,
            });

            let mut flagged = 0usize;
            for message in subtask.failed_steps() {
                report.push(ReportEntry::FailedStep {
                    message: message.as_json(),
                });
                flagged += 1;
            }
            if flagged == 0 {
                info!(%subtask_id, "No failed step detected for subtask");
                report.push(ReportEntry::NoFailedSteps {
                    task_id: subtask.task_id.clone(),
                });
            }
        }

        Ok(report)
    }
}
