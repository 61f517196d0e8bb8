// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a scan task.
///
/// `New` → `Working` → {`Finished`, `Aborted`}, plus `New` → `Aborted` for a
/// launch failure. `Finished` is only reachable from `Working`. Both `Finished` and `Aborted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    New,
    Working,
    Finished,
    Aborted,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Finished | TaskStatus::Aborted)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    ///
    /// Re-entering the current state is allowed (progress updates are
    /// `Working` → `Working`). Terminal → terminal is allowed so that a
    /// `stop` racing natural exit can settle with last-write-wins.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        match (self, next) {
            (New, New | Working | Aborted) => true,
            (New, Finished) => false,
            (Working, New) => false,
            (Working, _) => true,
            (Finished | Aborted, Finished | Aborted) => true,
            (Finished | Aborted, _) => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::New => "New",
            TaskStatus::Working => "Working",
            TaskStatus::Finished => "Finished",
            TaskStatus::Aborted => "Aborted",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::New
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(TaskStatus::New),
            "working" => Ok(TaskStatus::Working),
            "finished" => Ok(TaskStatus::Finished),
            "aborted" => Ok(TaskStatus::Aborted),
            other => Err(format!(
                "invalid task status: {other} (expected New, Working, Finished or Aborted)"
            )),
        }
    }
}

/// External control command for a running scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Suspend the process (`SIGSTOP`).
    Pause,
    /// Ask the process to terminate (`SIGTERM`).
    Stop,
    /// Resume a suspended process (`SIGCONT`).
    Unpause,
}

impl ControlCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            ControlCommand::Pause => "pause",
            ControlCommand::Stop => "stop",
            ControlCommand::Unpause => "unpause",
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlCommand {
    type Err = String;

    /// Command tokens are matched exactly; `"Pause"` is not `pause`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pause" => Ok(ControlCommand::Pause),
            "stop" => Ok(ControlCommand::Stop),
            "unpause" => Ok(ControlCommand::Unpause),
            other => Err(format!(
                "unknown control command: {other} (expected \"pause\", \"stop\" or \"unpause\")"
            )),
        }
    }
}

/// Scan target as supplied by the creator of a task: one address/hostname,
/// or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Target {
    Single(String),
    Many(Vec<String>),
}

impl Target {
    /// The form passed on the command line: list entries joined by `,` in
    /// input order.
    pub fn normalized(&self) -> String {
        match self {
            Target::Single(s) => s.clone(),
            Target::Many(items) => items.join(","),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Target::Single(s) => s.trim().is_empty(),
            Target::Many(items) => items.iter().all(|s| s.trim().is_empty()),
        }
    }
}

impl From<&str> for Target {
    fn from(s: &str) -> Self {
        Target::Single(s.to_string())
    }
}

impl From<Vec<String>> for Target {
    fn from(items: Vec<String>) -> Self {
        Target::Many(items)
    }
}
