// src/task/mod.rs

//! The unit of work: what to scan, plus the shared state the concurrent
//! parts of the controller read and write.
//!
//! - [`state`] holds the status/progress/message record and its watch channel.
//! - [`buffer`] holds the append-only stdout/stderr chunk buffers.

pub mod buffer;
pub mod state;

pub use buffer::OutputBuffer;
pub use state::{TaskSnapshot, TaskState};

use crate::config::{TaskParams, TaskSection};
use crate::errors::{Result, WorkerError};
use crate::types::Target;

/// Kind reported for every task this controller runs.
pub const TASK_KIND: &str = "masscan";

/// Immutable creation parameters of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub id: String,
    /// Already normalised: lists are comma-joined in input order.
    pub target: String,
    pub params: TaskParams,
    pub project_uuid: String,
}

impl TaskSpec {
    pub fn new(
        id: impl Into<String>,
        target: impl Into<Target>,
        params: TaskParams,
        project_uuid: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            target: target.into().normalized(),
            params,
            project_uuid: project_uuid.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        TASK_KIND
    }
}

impl TryFrom<&TaskSection> for TaskSpec {
    type Error = WorkerError;

    fn try_from(section: &TaskSection) -> Result<Self> {
        let target = section.target.clone().ok_or_else(|| {
            WorkerError::ConfigError(format!("task '{}' has no target", section.id))
        })?;

        Ok(TaskSpec::new(
            section.id.clone(),
            target,
            section.params.clone(),
            section.project_uuid.clone(),
        ))
    }
}
