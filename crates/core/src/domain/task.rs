use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{DesignRef, NodeFilter};

/// Lifecycle state of a task as reported by the provisioning service.
///
/// The service is authoritative: the state is never cached locally beyond
/// the current poll cycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    #[default]
    Running,
    Complete,
    Terminated,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Terminated => "terminated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "complete" => Some(Self::Complete),
            "terminated" => Some(Self::Terminated),
            _ => None,
        }
    }

    /// A task in a terminal state will not change state again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Terminated)
    }
}

/// Outcome of a task, meaningful only once the task left `running`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Success,
    Failure,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ResultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "failure" => Some(Self::Failure),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

/// One entry in a task's step message stream.
///
/// `error` separates true failures from informational entries. Everything
/// else in the message is an opaque payload that reports re-emit verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepMessage {
    #[serde(default)]
    pub error: bool,

    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl StepMessage {
    /// The full message as a JSON document, including the `error` flag.
    pub fn as_json(&self) -> Value {
        let mut doc = self.payload.clone();
        doc.insert("error".to_string(), Value::Bool(self.error));
        Value::Object(doc)
    }
}

/// Detail block nested under a task result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ResultDetails {
    #[serde(rename = "messageList", default)]
    pub message_list: Vec<StepMessage>,
}

/// Result block of a task record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TaskResult {
    #[serde(default)]
    pub status: ResultStatus,

    #[serde(default)]
    pub failures: Vec<String>,

    #[serde(default)]
    pub details: ResultDetails,
}

/// A task record as returned by the provisioning service.
///
/// Field names match the service wire format. Fields the orchestrator does
/// not interpret are preserved in `extra` so diagnostic output can show the
/// record exactly as the service reported it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskRecord {
    pub task_id: String,

    #[serde(default)]
    pub action: String,

    #[serde(default)]
    pub status: TaskState,

    #[serde(default)]
    pub result: TaskResult,

    #[serde(rename = "subtask_id_list", default)]
    pub subtask_ids: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TaskRecord {
    /// Step messages flagged as errors, in original order.
    pub fn failed_steps(&self) -> impl Iterator<Item = &StepMessage> {
        self.result
            .details
            .message_list
            .iter()
            .filter(|m| m.error)
    }
}

/// Body of a task creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub design_ref: DesignRef,
    pub action: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_filter: Option<NodeFilter>,
}

/// Response to a task creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedTask {
    #[serde(default)]
    pub task_id: String,
}
