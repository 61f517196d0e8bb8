#![allow(dead_code)]

use std::path::Path;

use masscan_worker::config::{TaskParams, WorkerConfig};
use masscan_worker::task::TaskSpec;
use masscan_worker::types::Target;

/// Builder for `WorkerConfig` with test-friendly defaults: no privilege
/// prefix, short drain timeout and a fast poll interval.
pub struct WorkerConfigBuilder {
    config: WorkerConfig,
}

impl WorkerConfigBuilder {
    pub fn new(binary: impl AsRef<Path>) -> Self {
        Self {
            config: WorkerConfig {
                binary: binary.as_ref().to_string_lossy().into_owned(),
                privilege_prefix: vec![],
                output_format: vec!["-oX".to_string(), "-".to_string()],
                chunk_size: 1024,
                drain_timeout_ms: 200,
                poll_interval_ms: 20,
                output_dir: "scan-results".to_string(),
            },
        }
    }

    pub fn privilege_prefix(mut self, prefix: &[&str]) -> Self {
        self.config.privilege_prefix = prefix.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    pub fn drain_timeout_ms(mut self, ms: u64) -> Self {
        self.config.drain_timeout_ms = ms;
        self
    }

    pub fn build(self) -> WorkerConfig {
        self.config
    }
}

/// Builder for `TaskSpec`.
pub struct TaskSpecBuilder {
    id: String,
    target: Target,
    program: Vec<String>,
    project_uuid: String,
}

impl TaskSpecBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            target: Target::Single("127.0.0.1".to_string()),
            program: vec![],
            project_uuid: "project-1".to_string(),
        }
    }

    pub fn target(mut self, target: &str) -> Self {
        self.target = Target::Single(target.to_string());
        self
    }

    pub fn targets(mut self, targets: &[&str]) -> Self {
        self.target = Target::Many(targets.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn param(mut self, param: &str) -> Self {
        self.program.push(param.to_string());
        self
    }

    pub fn project(mut self, project_uuid: &str) -> Self {
        self.project_uuid = project_uuid.to_string();
        self
    }

    pub fn build(self) -> TaskSpec {
        TaskSpec::new(
            self.id,
            self.target,
            TaskParams {
                program: self.program,
            },
            self.project_uuid,
        )
    }
}
