// src/exec/launcher.rs

//! Building the scanner command line and starting the process.

use std::process::Stdio;

use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tracing::info;

use crate::config::WorkerConfig;
use crate::errors::{Result, WorkerError};
use crate::task::TaskSpec;

/// A freshly started scanner process with both output pipes detached.
#[derive(Debug)]
pub struct LaunchedProcess {
    pub child: Child,
    pub pid: u32,
    pub stdout: ChildStdout,
    pub stderr: ChildStderr,
}

/// `privilege_prefix + binary + target + output_format + params.program`.
pub fn build_command_line(spec: &TaskSpec, worker: &WorkerConfig) -> Vec<String> {
    let mut argv = Vec::with_capacity(
        worker.privilege_prefix.len() + worker.output_format.len() + spec.params.program.len() + 2,
    );
    argv.extend(worker.privilege_prefix.iter().cloned());
    argv.push(worker.binary.clone());
    argv.push(spec.target.clone());
    argv.extend(worker.output_format.iter().cloned());
    argv.extend(spec.params.program.iter().cloned());
    argv
}

/// Start `argv` with stdout and stderr piped to us and stdin closed.
///
/// The child is killed if its handle is dropped without being reaped.
pub fn spawn_process(argv: &[String]) -> Result<LaunchedProcess> {
    let (program, args) = argv.split_first().ok_or_else(|| WorkerError::LaunchError {
        program: String::new(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command line"),
    })?;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let launch_error = |source: std::io::Error| WorkerError::LaunchError {
        program: program.clone(),
        source,
    };

    let mut child = cmd.spawn().map_err(launch_error)?;

    let pid = child
        .id()
        .ok_or_else(|| launch_error(std::io::Error::other("process exited before it could be tracked")))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| launch_error(std::io::Error::other("stdout pipe unavailable")))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| launch_error(std::io::Error::other("stderr pipe unavailable")))?;

    info!(pid, program = %program, "scanner process started");

    Ok(LaunchedProcess {
        child,
        pid,
        stdout,
        stderr,
    })
}
