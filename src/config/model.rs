// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::types::Target;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [worker]
/// binary = "masscan"
/// privilege_prefix = ["sudo"]
///
/// [task]
/// id = "task-1"
/// target = ["10.0.0.1", "10.0.0.2"]
/// project_uuid = "project-1"
///
/// [task.params]
/// program = ["-p80"]
/// ```
///
/// All sections are optional and have reasonable defaults; the `[task]`
/// fields may instead be provided on the command line.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// How the scanner is invoked and supervised, from `[worker]`.
    #[serde(default)]
    pub worker: WorkerConfig,

    /// The task to run, from `[task]`.
    #[serde(default)]
    pub task: TaskSection,
}

/// Validated configuration. Only obtainable through
/// `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub worker: WorkerConfig,
    pub task: TaskSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(worker: WorkerConfig, task: TaskSection) -> Self {
        Self { worker, task }
    }
}

/// `[worker]` section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Scanner executable name or path.
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Tokens placed before `binary`, e.g. `["sudo"]`. May be empty.
    #[serde(default = "default_privilege_prefix")]
    pub privilege_prefix: Vec<String>,

    /// Fixed output-format flag placed right after the target.
    #[serde(default = "default_output_format")]
    pub output_format: Vec<String>,

    /// Maximum bytes read from a stream per chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Budget for the best-effort read once the task is terminal.
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,

    /// Progress Monitor cadence.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Root directory of the file-backed result store.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_binary() -> String {
    "masscan".to_string()
}

fn default_privilege_prefix() -> Vec<String> {
    vec!["sudo".to_string()]
}

fn default_output_format() -> Vec<String> {
    vec!["-oX".to_string(), "-".to_string()]
}

fn default_chunk_size() -> usize {
    1024
}

fn default_drain_timeout_ms() -> u64 {
    500
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_output_dir() -> String {
    "scan-results".to_string()
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            privilege_prefix: default_privilege_prefix(),
            output_format: default_output_format(),
            chunk_size: default_chunk_size(),
            drain_timeout_ms: default_drain_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            output_dir: default_output_dir(),
        }
    }
}

impl WorkerConfig {
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// `[task]` section.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct TaskSection {
    #[serde(default)]
    pub id: String,

    /// `"10.0.0.1"` or `["10.0.0.1", "10.0.0.2"]`.
    #[serde(default)]
    pub target: Option<Target>,

    #[serde(default)]
    pub project_uuid: String,

    #[serde(default)]
    pub params: TaskParams,
}

/// `[task.params]` section.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct TaskParams {
    /// Command-line tokens appended after the output-format flag.
    #[serde(default)]
    pub program: Vec<String>,
}
