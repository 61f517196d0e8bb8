// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile, TaskSection, WorkerConfig};
use crate::errors::{Result, WorkerError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::WorkerError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_worker_config(&raw.worker)?;
        validate_task_section(&raw.task)?;
        Ok(ConfigFile::new_unchecked(raw.worker, raw.task))
    }
}

fn validate_worker_config(worker: &WorkerConfig) -> Result<()> {
    if worker.binary.trim().is_empty() {
        return Err(WorkerError::ConfigError(
            "[worker].binary must not be empty".to_string(),
        ));
    }

    if worker.chunk_size == 0 {
        return Err(WorkerError::ConfigError(
            "[worker].chunk_size must be >= 1 (got 0)".to_string(),
        ));
    }

    if worker.poll_interval_ms == 0 {
        return Err(WorkerError::ConfigError(
            "[worker].poll_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_task_section(task: &TaskSection) -> Result<()> {
    if task.id.trim().is_empty() {
        return Err(WorkerError::ConfigError(
            "[task].id must be set (or pass --task-id)".to_string(),
        ));
    }

    if task.project_uuid.trim().is_empty() {
        return Err(WorkerError::ConfigError(format!(
            "task '{}' has no project_uuid (set [task].project_uuid or pass --project)",
            task.id
        )));
    }

    match &task.target {
        Some(target) if !target.is_empty() => Ok(()),
        _ => Err(WorkerError::ConfigError(format!(
            "task '{}' has an empty target",
            task.id
        ))),
    }
}
