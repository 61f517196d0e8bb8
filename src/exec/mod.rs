// src/exec/mod.rs

//! Process execution layer.
//!
//! This module launches the scanner with `tokio::process::Command` and
//! supervises it until it exits:
//!
//! - [`launcher`] builds the command line and spawns the process.
//! - [`drainer`] copies stdout/stderr into ordered chunk buffers.
//! - [`monitor`] infers progress from the latest stderr chunk.
//! - [`signals`] maps control commands onto process signals.
//! - [`reconciler`] settles the final status after exit.
//! - [`scan_task`] owns all of the above for one task.

pub mod drainer;
pub mod launcher;
pub mod monitor;
pub mod reconciler;
pub mod scan_task;
pub mod signals;

pub use launcher::build_command_line;
pub use monitor::{ProgressCoalescer, ProgressParser, ProgressSample};
pub use scan_task::ScanTask;
