use std::sync::Arc;

use provisioner_client::ProvisionerApi;
use slipway_core::{DesignRef, NodeFilter};
use tracing::{error, info};

use crate::error::{OrchestratorError, Result};

/// Submits one task to the provisioning service.
///
/// Submission is a single logical intent; this layer never retries a
/// create, since a blind retry risks duplicate task creation.
pub struct TaskSubmitter {
    client: Arc<dyn ProvisionerApi>,
}

impl TaskSubmitter {
    pub fn new(client: Arc<dyn ProvisionerApi>) -> Self {
        Self { client }
    }

    /// Ask the service to create a task and return its identifier.
    pub async fn submit(
        &self,
        design_ref: &DesignRef,
        action: &str,
        node_filter: Option<&NodeFilter>,
    ) -> Result<String> {
        if action.trim().is_empty() {
            return Err(OrchestratorError::SubmissionFailed(
                "task action is empty".to_string(),
            ));
        }

        info!(action, node_filter = ?node_filter, "Creating provisioning task");

        let created = self
            .client
            .create_task(design_ref, action, node_filter)
            .await
            .map_err(|e| {
                error!(error = %e, action, "Task creation rejected by the provisioning service");
                OrchestratorError::SubmissionFailed(e.to_string())
            })?;

        if created.task_id.is_empty() {
            return Err(OrchestratorError::SubmissionFailed(
                "service response did not include a task id".to_string(),
            ));
        }

        info!(action, task_id = %created.task_id, "Task created");
        Ok(created.task_id)
    }
}
