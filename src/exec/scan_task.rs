// src/exec/scan_task.rs

//! The single-task controller.
//!
//! [`ScanTask::start`] launches the scanner and spawns the two drainers and
//! the progress monitor; [`ScanTask::wait_for_exit`] reaps the process,
//! stops those workers and settles the final status. Control commands can
//! be sent at any time through [`ScanTask::send_notification`].

use std::fmt;
use std::future::{poll_fn, Future};
use std::pin::pin;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tokio::process::Child;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::WorkerConfig;
use crate::errors::{Result, WorkerError};
use crate::exec::drainer::{Drainer, StreamKind};
use crate::exec::launcher::{self, LaunchedProcess};
use crate::exec::monitor::{ProgressMonitor, ProgressParser};
use crate::exec::reconciler::ExitReconciler;
use crate::exec::signals;
use crate::store::ResultStore;
use crate::task::state::PROGRESS_ABORTED;
use crate::task::{OutputBuffer, TaskSnapshot, TaskSpec, TaskState};
use crate::types::{ControlCommand, TaskStatus};

/// Exit code recorded when the process ended without one (killed by a
/// signal) or could not be waited on.
pub const UNKNOWN_EXIT_CODE: i32 = -1;

/// The launched child plus the workers supervising it.
///
/// The child stays here until the task is terminal, so an interrupted
/// `wait_for_exit` can be resumed by the next caller.
#[derive(Default)]
struct Supervised {
    child: Option<Child>,
    workers: Vec<JoinHandle<()>>,
}

pub struct ScanTask {
    spec: TaskSpec,
    worker: WorkerConfig,
    store: Arc<dyn ResultStore>,
    state: Arc<TaskState>,
    stdout: OutputBuffer,
    stderr: OutputBuffer,
    pid: OnceLock<u32>,
    exit_code: OnceLock<i32>,
    /// Set, under the lock, in the same poll that reaps the child. Signal
    /// delivery holds this lock too.
    reaped: Mutex<bool>,
    supervised: tokio::sync::Mutex<Supervised>,
    cancel: CancellationToken,
}

impl fmt::Debug for ScanTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanTask")
            .field("spec", &self.spec)
            .field("state", &self.state.snapshot())
            .field("pid", &self.pid.get())
            .field("exit_code", &self.exit_code.get())
            .finish_non_exhaustive()
    }
}

impl ScanTask {
    pub fn new(spec: TaskSpec, worker: WorkerConfig, store: Arc<dyn ResultStore>) -> Self {
        let state = Arc::new(TaskState::new(spec.id.clone()));
        Self {
            spec,
            worker,
            store,
            state,
            stdout: OutputBuffer::new(),
            stderr: OutputBuffer::new(),
            pid: OnceLock::new(),
            exit_code: OnceLock::new(),
            reaped: Mutex::new(false),
            supervised: tokio::sync::Mutex::new(Supervised::default()),
            cancel: CancellationToken::new(),
        }
    }

    pub fn spec(&self) -> &TaskSpec {
        &self.spec
    }

    pub fn state(&self) -> Arc<TaskState> {
        Arc::clone(&self.state)
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        self.state.snapshot()
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid.get().copied()
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code.get().copied()
    }

    pub fn stdout_chunks(&self) -> Vec<Vec<u8>> {
        self.stdout.snapshot()
    }

    pub fn stderr_chunks(&self) -> Vec<Vec<u8>> {
        self.stderr.snapshot()
    }

    /// Full argument vector used to launch the scanner.
    pub fn command_line(&self) -> Vec<String> {
        launcher::build_command_line(&self.spec, &self.worker)
    }

    /// Launch the scanner and its supervising workers.
    ///
    /// A second call after a successful launch does nothing. On launch
    /// failure the task becomes `Aborted` with progress -1 and the error is
    /// returned.
    pub async fn start(&self) -> Result<()> {
        if self.pid.get().is_some() {
            debug!(task_id = %self.spec.id, "start called on a running task; ignoring");
            return Ok(());
        }

        let mut slot = self.supervised.lock().await;
        if self.pid.get().is_some() {
            return Ok(());
        }
        let status = self.state.status();
        if status.is_terminal() {
            return Err(WorkerError::InvalidState(format!(
                "task '{}' is already {status}",
                self.spec.id
            )));
        }

        let parser = ProgressParser::new().map_err(anyhow::Error::from)?;
        let argv = self.command_line();
        info!(task_id = %self.spec.id, kind = self.spec.kind(), argv = ?argv, "launching scan");

        let LaunchedProcess {
            child,
            pid,
            stdout,
            stderr,
        } = match launcher::spawn_process(&argv) {
            Ok(launched) => launched,
            Err(e) => {
                error!(task_id = %self.spec.id, error = %e, "scan launch failed");
                self.state
                    .set_status(TaskStatus::Aborted, PROGRESS_ABORTED, Some(e.to_string()));
                return Err(e);
            }
        };

        // Cannot already be set: guarded by `slot` and the check above.
        let _ = self.pid.set(pid);
        slot.child = Some(child);
        self.state.set_status(TaskStatus::Working, 0, None);

        let stdout_drainer = Drainer::new(
            self.spec.id.clone(),
            StreamKind::Stdout,
            stdout,
            self.stdout.clone(),
            self.worker.chunk_size,
            self.worker.drain_timeout(),
            self.cancel.child_token(),
        );
        let stderr_drainer = Drainer::new(
            self.spec.id.clone(),
            StreamKind::Stderr,
            stderr,
            self.stderr.clone(),
            self.worker.chunk_size,
            self.worker.drain_timeout(),
            self.cancel.child_token(),
        );
        let monitor = ProgressMonitor::new(
            self.spec.id.clone(),
            Arc::clone(&self.state),
            self.stderr.clone(),
            parser,
            self.worker.poll_interval(),
            self.cancel.child_token(),
        );

        slot.workers = vec![
            tokio::spawn(stdout_drainer.run()),
            tokio::spawn(stderr_drainer.run()),
            tokio::spawn(monitor.run()),
        ];

        Ok(())
    }

    /// Deliver a `pause` / `stop` / `unpause` command. Anything else is
    /// ignored.
    pub fn send_notification(&self, command: &str) -> Result<()> {
        let Some(cmd) = signals::parse_command(command) else {
            return Ok(());
        };
        self.send_command(cmd)
    }

    pub fn send_command(&self, cmd: ControlCommand) -> Result<()> {
        let pid = self.pid().ok_or(WorkerError::NotStarted)?;

        // The pid may be reused once reaped; never signal it again.
        let reaped = self.reaped.lock().unwrap_or_else(PoisonError::into_inner);
        if *reaped {
            return Err(signals::already_exited(pid, cmd));
        }

        signals::deliver(pid, cmd)
    }

    /// Wait for the scanner to exit and settle the final status.
    ///
    /// Callers are serialised; once one has finalised the task the others
    /// return the terminal snapshot. Dropping the returned future before it
    /// completes leaves the process running and the task unfinalised, and a
    /// later call picks up where it stopped.
    pub async fn wait_for_exit(&self) -> Result<TaskSnapshot> {
        let mut slot = self.supervised.lock().await;

        // Without a child the task is either unstarted or already terminal.
        let Some(child) = slot.child.as_mut() else {
            if self.pid.get().is_none() && !self.state.status().is_terminal() {
                return Err(WorkerError::NotStarted);
            }
            return Ok(self.state.wait_terminal().await);
        };

        let exit_code = match self.reap(child).await {
            Ok(status) => status.code().unwrap_or(UNKNOWN_EXIT_CODE),
            Err(e) => {
                error!(task_id = %self.spec.id, error = %e, "waiting for scanner failed");
                UNKNOWN_EXIT_CODE
            }
        };
        if self.exit_code.set(exit_code).is_ok() {
            info!(task_id = %self.spec.id, pid = ?self.pid(), exit_code, "scanner process exited");
        }

        self.stop_workers(&mut slot.workers).await;

        let reconciler = ExitReconciler {
            spec: &self.spec,
            state: &self.state,
            stdout: &self.stdout,
            stderr: &self.stderr,
        };
        let snapshot = reconciler.finalize(exit_code, self.store.as_ref()).await;
        slot.child = None;
        Ok(snapshot)
    }

    /// Wait on the child, marking it reaped in the same poll that collects
    /// its status so no signal can be sent to the pid afterwards.
    async fn reap(&self, child: &mut Child) -> std::io::Result<std::process::ExitStatus> {
        let mut wait = pin!(child.wait());
        poll_fn(|cx| {
            let mut reaped = self.reaped.lock().unwrap_or_else(PoisonError::into_inner);
            let poll = wait.as_mut().poll(cx);
            if poll.is_ready() {
                *reaped = true;
            }
            poll
        })
        .await
    }

    /// Cancel the drainers and the monitor and wait for them to finish.
    ///
    /// A handle is removed only once it has completed.
    async fn stop_workers(&self, workers: &mut Vec<JoinHandle<()>>) {
        self.cancel.cancel();

        while let Some(handle) = workers.last_mut() {
            let joined = handle.await;
            workers.pop();
            if let Err(e) = joined {
                warn!(task_id = %self.spec.id, error = %e, "supervised worker ended abnormally");
            }
        }

        debug!(
            task_id = %self.spec.id,
            stdout_chunks = self.stdout.len(),
            stdout_bytes = self.stdout.byte_len(),
            stderr_chunks = self.stderr.len(),
            "output drained"
        );
    }
}
