// src/exec/signals.rs

//! Control signal handler: maps `pause` / `stop` / `unpause` onto
//! `SIGSTOP` / `SIGTERM` / `SIGCONT` for the scanner process.

use tracing::{debug, info};

use crate::errors::{Result, WorkerError};
use crate::types::ControlCommand;

/// Parse a command token. Unknown tokens yield `None`.
pub fn parse_command(token: &str) -> Option<ControlCommand> {
    match token.parse::<ControlCommand>() {
        Ok(cmd) => Some(cmd),
        Err(e) => {
            debug!(token, error = %e, "ignoring unrecognised control command");
            None
        }
    }
}

#[cfg(unix)]
pub fn signal_number(cmd: ControlCommand) -> libc::c_int {
    match cmd {
        ControlCommand::Pause => libc::SIGSTOP,
        ControlCommand::Stop => libc::SIGTERM,
        ControlCommand::Unpause => libc::SIGCONT,
    }
}

/// Deliver the signal for `cmd` to `pid`.
///
/// No acknowledgement beyond the `kill(2)` result; failure (e.g. the process
/// is gone) is returned to the caller.
#[cfg(unix)]
pub fn deliver(pid: u32, cmd: ControlCommand) -> Result<()> {
    let signal_error = |source: std::io::Error| WorkerError::SignalError {
        command: cmd.to_string(),
        pid,
        source,
    };

    let raw_pid = libc::pid_t::try_from(pid).map_err(|_| {
        signal_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "pid out of range",
        ))
    })?;

    // SAFETY: kill(2) has no memory-safety preconditions; `raw_pid` is the
    // positive pid of a child we spawned.
    let ret = unsafe { libc::kill(raw_pid, signal_number(cmd)) };
    if ret != 0 {
        return Err(signal_error(std::io::Error::last_os_error()));
    }

    info!(pid, command = %cmd, "control signal delivered");
    Ok(())
}

#[cfg(not(unix))]
pub fn deliver(pid: u32, cmd: ControlCommand) -> Result<()> {
    Err(WorkerError::SignalError {
        command: cmd.to_string(),
        pid,
        source: std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "process signals are only supported on unix",
        ),
    })
}

/// Error returned for a command aimed at a process that was already reaped.
pub fn already_exited(pid: u32, cmd: ControlCommand) -> WorkerError {
    WorkerError::SignalError {
        command: cmd.to_string(),
        pid,
        source: std::io::Error::other("process has already exited"),
    }
}
