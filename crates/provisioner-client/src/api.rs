use async_trait::async_trait;
use slipway_core::{CreatedTask, DesignRef, NodeFilter, TaskRecord};

use crate::error::ClientError;

/// Task operations of the provisioning service.
///
/// Implementations must not retry on their own; retry policy belongs to the
/// caller, which knows whether an operation is safe to repeat.
#[async_trait]
pub trait ProvisionerApi: Send + Sync {
    /// Ask the service to create a task and return its identifier.
    async fn create_task(
        &self,
        design_ref: &DesignRef,
        action: &str,
        node_filter: Option<&NodeFilter>,
    ) -> Result<CreatedTask, ClientError>;

    /// Current record of a single task.
    async fn get_task(&self, task_id: &str) -> Result<TaskRecord, ClientError>;

    /// Full task inventory snapshot.
    async fn get_tasks(&self) -> Result<Vec<TaskRecord>, ClientError>;
}
