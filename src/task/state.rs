// src/task/state.rs

//! Shared status record of a single task.
//!
//! The Launcher, Progress Monitor and Exit Reconciler all write through
//! [`TaskState::set_status`]; external status queries use
//! [`TaskState::snapshot`] or [`TaskState::subscribe`].

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::types::TaskStatus;

pub const PROGRESS_ABORTED: i32 = -1;
pub const PROGRESS_FINISHED: i32 = 100;

/// Point-in-time view of a task's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSnapshot {
    pub task_id: String,
    pub status: TaskStatus,
    pub progress: i32,
    pub message: Option<String>,
    /// Incremented by every accepted update.
    pub revision: u64,
}

#[derive(Debug)]
pub struct TaskState {
    tx: watch::Sender<TaskSnapshot>,
}

impl TaskState {
    /// New record in status `New` with progress 0.
    pub fn new(task_id: impl Into<String>) -> Self {
        let initial = TaskSnapshot {
            task_id: task_id.into(),
            status: TaskStatus::New,
            progress: 0,
            message: None,
            revision: 0,
        };
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Apply a status update.
    ///
    /// Returns `false` (and leaves the record untouched) when the update
    /// would leave a terminal state, moves back to `New`, finishes a task that
    /// never started working, or uses a progress
    /// value outside `[-1, 100]` or one reserved for another status
    /// (`-1` is only for `Aborted`, `100` only for `Finished`).
    ///
    /// Terminal → terminal is accepted; the last write wins.
    pub fn set_status(&self, status: TaskStatus, progress: i32, text: Option<String>) -> bool {
        self.tx.send_if_modified(|current| {
            if let Err(reason) = check_update(current.status, status, progress) {
                warn!(
                    task_id = %current.task_id,
                    from = %current.status,
                    to = %status,
                    progress,
                    reason,
                    "rejected task status update"
                );
                return false;
            }

            if current.status != status {
                info!(
                    task_id = %current.task_id,
                    from = %current.status,
                    to = %status,
                    progress,
                    "task status changed"
                );
            } else {
                debug!(task_id = %current.task_id, status = %status, progress, "task progress updated");
            }

            current.status = status;
            current.progress = progress;
            current.message = text;
            current.revision += 1;
            true
        })
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        self.tx.borrow().clone()
    }

    pub fn status(&self) -> TaskStatus {
        self.tx.borrow().status
    }

    pub fn progress(&self) -> i32 {
        self.tx.borrow().progress
    }

    pub fn revision(&self) -> u64 {
        self.tx.borrow().revision
    }

    /// Receiver that observes every accepted update.
    pub fn subscribe(&self) -> watch::Receiver<TaskSnapshot> {
        self.tx.subscribe()
    }

    /// Resolve once the status is `Finished` or `Aborted`.
    pub async fn wait_terminal(&self) -> TaskSnapshot {
        let mut rx = self.tx.subscribe();
        match rx.wait_for(|s| s.status.is_terminal()).await {
            Ok(snapshot) => snapshot.clone(),
            // The sender lives in `self`, so the channel cannot close while
            // we hold `&self`.
            Err(_) => self.snapshot(),
        }
    }
}

fn check_update(from: TaskStatus, to: TaskStatus, progress: i32) -> Result<(), &'static str> {
    if !(PROGRESS_ABORTED..=PROGRESS_FINISHED).contains(&progress) {
        return Err("progress out of range");
    }
    if !from.can_transition_to(to) {
        return Err("transition not allowed");
    }
    if progress == PROGRESS_ABORTED && to != TaskStatus::Aborted {
        return Err("progress -1 is reserved for Aborted");
    }
    if progress == PROGRESS_FINISHED && to != TaskStatus::Finished {
        return Err("progress 100 is reserved for Finished");
    }
    Ok(())
}
