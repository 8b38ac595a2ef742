//! Scripted fake of the provisioning service for orchestrator tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use provisioner_client::{ClientError, ProvisionerApi, StatusCode};
use serde_json::Value;
use slipway_core::{
    CreatedTask, DesignRef, NodeFilter, ResultDetails, ResultStatus, StepMessage, TaskRecord,
    TaskResult, TaskState,
};

/// One scripted answer to `get_task`.
#[derive(Debug, Clone)]
pub enum Query {
    Record(TaskRecord),
    /// Simulated network fault; the poller must retry.
    Transient,
    /// Definitive rejection; the poller must abort.
    NotFound,
}

#[derive(Default)]
pub struct FakeProvisioner {
    create_response: Option<CreatedTask>,
    reject_create: bool,
    queries: Mutex<VecDeque<Query>>,
    default_query: Option<Query>,
    inventory: Option<Vec<TaskRecord>>,
    fail_inventory: bool,
    create_count: AtomicUsize,
    query_count: AtomicUsize,
    inventory_count: AtomicUsize,
    last_filter: Mutex<Option<NodeFilter>>,
}

impl FakeProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_created_task(self, task_id: &str) -> Self {
        self.with_create_response(CreatedTask {
            task_id: task_id.to_string(),
        })
    }

    pub fn with_create_response(mut self, response: CreatedTask) -> Self {
        self.create_response = Some(response);
        self
    }

    pub fn with_create_rejection(mut self) -> Self {
        self.reject_create = true;
        self
    }

    /// Script the next `get_task` answers, consumed in order.
    pub fn with_queries(self, queries: Vec<Query>) -> Self {
        self.queries.lock().unwrap().extend(queries);
        self
    }

    /// Answer returned once the scripted queue is exhausted.
    pub fn with_default_query(mut self, query: Query) -> Self {
        self.default_query = Some(query);
        self
    }

    pub fn with_inventory(mut self, tasks: Vec<TaskRecord>) -> Self {
        self.inventory = Some(tasks);
        self
    }

    pub fn with_inventory_failure(mut self) -> Self {
        self.fail_inventory = true;
        self
    }

    pub fn create_calls(&self) -> usize {
        self.create_count.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> usize {
        self.query_count.load(Ordering::SeqCst)
    }

    pub fn inventory_calls(&self) -> usize {
        self.inventory_count.load(Ordering::SeqCst)
    }

    pub fn last_node_filter(&self) -> Option<NodeFilter> {
        self.last_filter.lock().unwrap().clone()
    }

    fn transient() -> ClientError {
        ClientError::Decode("simulated connection reset".to_string())
    }
}

#[async_trait]
impl ProvisionerApi for FakeProvisioner {
    async fn create_task(
        &self,
        _design_ref: &DesignRef,
        _action: &str,
        node_filter: Option<&NodeFilter>,
    ) -> Result<CreatedTask, ClientError> {
        self.create_count.fetch_add(1, Ordering::SeqCst);
        *self.last_filter.lock().unwrap() = node_filter.cloned();

        if self.reject_create {
            return Err(ClientError::Status {
                status: StatusCode::BAD_REQUEST,
                message: "design reference could not be resolved".to_string(),
            });
        }
        match &self.create_response {
            Some(response) => Ok(response.clone()),
            None => panic!("create_task called without a scripted response"),
        }
    }

    async fn get_task(&self, task_id: &str) -> Result<TaskRecord, ClientError> {
        self.query_count.fetch_add(1, Ordering::SeqCst);

        let query = self
            .queries
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.default_query.clone());
        match query {
            Some(Query::Record(record)) => Ok(record),
            Some(Query::Transient) => Err(Self::transient()),
            Some(Query::NotFound) => Err(ClientError::Status {
                status: StatusCode::NOT_FOUND,
                message: format!("task {} not found", task_id),
            }),
            None => panic!("get_task called without a scripted response"),
        }
    }

    async fn get_tasks(&self) -> Result<Vec<TaskRecord>, ClientError> {
        self.inventory_count.fetch_add(1, Ordering::SeqCst);

        if self.fail_inventory {
            return Err(Self::transient());
        }
        match &self.inventory {
            Some(tasks) => Ok(tasks.clone()),
            None => panic!("get_tasks called without a scripted inventory"),
        }
    }
}

pub fn task(
    task_id: &str,
    action: &str,
    status: TaskState,
    result: ResultStatus,
    subtask_ids: Vec<&str>,
    messages: Vec<Value>,
) -> TaskRecord {
    let message_list = messages
        .into_iter()
        .map(|m| serde_json::from_value::<StepMessage>(m).expect("valid step message"))
        .collect();

    TaskRecord {
        task_id: task_id.to_string(),
        action: action.to_string(),
        status,
        result: TaskResult {
            status: result,
            failures: vec![],
            details: ResultDetails { message_list },
        },
        subtask_ids: subtask_ids.into_iter().map(String::from).collect(),
        extra: serde_json::Map::new(),
    }
}

pub fn running(task_id: &str) -> TaskRecord {
    task(
        task_id,
        "deploy_node",
        TaskState::Running,
        ResultStatus::Unknown,
        vec![],
        vec![],
    )
}

pub fn complete_success(task_id: &str, action: &str) -> TaskRecord {
    task(
        task_id,
        action,
        TaskState::Complete,
        ResultStatus::Success,
        vec![],
        vec![],
    )
}

pub fn terminated_failure(task_id: &str, action: &str) -> TaskRecord {
    task(
        task_id,
        action,
        TaskState::Terminated,
        ResultStatus::Failure,
        vec![],
        vec![],
    )
}
