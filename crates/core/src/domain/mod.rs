mod design;
mod filter;
mod task;

pub use design::DesignRef;
pub use filter::NodeFilter;
pub use task::{
    CreateTaskRequest, CreatedTask, ResultDetails, ResultStatus, StepMessage, TaskRecord,
    TaskResult, TaskState,
};
