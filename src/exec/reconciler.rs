// src/exec/reconciler.rs

//! Exit reconciler: turns an exit code plus captured output into the final
//! task status.

use tracing::{info, warn};

use crate::store::{RawOutput, ResultStore};
use crate::task::state::{PROGRESS_ABORTED, PROGRESS_FINISHED};
use crate::task::{OutputBuffer, TaskSnapshot, TaskSpec, TaskState};
use crate::types::TaskStatus;

#[derive(Debug, Clone, Copy)]
pub struct ExitReconciler<'a> {
    pub spec: &'a TaskSpec,
    pub state: &'a TaskState,
    pub stdout: &'a OutputBuffer,
    pub stderr: &'a OutputBuffer,
}

impl<'a> ExitReconciler<'a> {
    /// Finalise the task for `exit_code`. Buffers must no longer be growing.
    ///
    /// - `0`: save stdout; `Finished`/100 on success, otherwise `Aborted`.
    /// - anything else: `Aborted` without attempting to save.
    ///
    /// An `Aborted` outcome carries all stderr output as its message.
    pub async fn finalize(&self, exit_code: i32, store: &dyn ResultStore) -> TaskSnapshot {
        if exit_code != 0 {
            info!(task_id = %self.spec.id, exit_code, "scanner exited with failure");
            return self.abort_with_stderr();
        }

        let output = RawOutput {
            task_id: self.spec.id.clone(),
            project_uuid: self.spec.project_uuid.clone(),
            chunks: self.stdout.snapshot(),
        };

        match store.save(output).await {
            Ok(()) => {
                self.state
                    .set_status(TaskStatus::Finished, PROGRESS_FINISHED, None);
                self.state.snapshot()
            }
            Err(e) => {
                warn!(task_id = %self.spec.id, error = %e, "saving scan output failed");
                self.abort_with_stderr()
            }
        }
    }

    fn abort_with_stderr(&self) -> TaskSnapshot {
        let message = self.stderr.decoded_concat();
        self.state
            .set_status(TaskStatus::Aborted, PROGRESS_ABORTED, Some(message));
        self.state.snapshot()
    }
}
