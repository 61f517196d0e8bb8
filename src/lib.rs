// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod store;
pub mod task;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{default_config_path, load_from_path, ConfigFile, RawConfigFile};
use crate::exec::ScanTask;
use crate::store::FileStore;
use crate::task::{TaskSnapshot, TaskSpec, TaskState};
use crate::types::{Target, TaskStatus};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + command-line overrides
/// - the file-backed result store
/// - the scan controller
/// - the JSON status stream on stdout
/// - control commands from stdin and Ctrl-C
///
/// Returns the final status, or `None` for `--dry-run`.
pub async fn run(args: CliArgs) -> Result<Option<TaskStatus>> {
    let raw = load_raw_config(&args.config)?;
    let cfg = ConfigFile::try_from(apply_overrides(raw, &args))?;
    let spec = TaskSpec::try_from(&cfg.task)?;

    let store = Arc::new(FileStore::new(&cfg.worker.output_dir));
    debug!(root = %store.root().display(), "file result store ready");
    let task = Arc::new(ScanTask::new(spec, cfg.worker.clone(), store));

    if args.dry_run {
        print_dry_run(&task, &cfg);
        return Ok(None);
    }

    let printer = spawn_status_printer(task.state());
    spawn_ctrl_c_handler(Arc::clone(&task));
    spawn_stdin_commands(Arc::clone(&task));

    if let Err(e) = task.start().await {
        let _ = printer.await;
        return Err(e).context("starting scan");
    }

    let final_snapshot = task.wait_for_exit().await?;
    let _ = printer.await;

    info!(
        task_id = %final_snapshot.task_id,
        status = %final_snapshot.status,
        exit_code = ?task.exit_code(),
        "task finished"
    );
    Ok(Some(final_snapshot.status))
}

/// Read the config file, or start from defaults when the default path does
/// not exist (everything can then come from the command line).
fn load_raw_config(path: &str) -> Result<RawConfigFile> {
    let path = Path::new(path);
    if !path.exists() && path == default_config_path() {
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok(RawConfigFile::default());
    }
    load_from_path(path).with_context(|| format!("loading config {}", path.display()))
}

/// Command-line values take precedence over the `[task]`/`[worker]` sections.
pub fn apply_overrides(mut raw: RawConfigFile, args: &CliArgs) -> RawConfigFile {
    if let Some(id) = &args.task_id {
        raw.task.id = id.clone();
    }
    if let Some(project) = &args.project {
        raw.task.project_uuid = project.clone();
    }
    match args.target.as_slice() {
        [] => {}
        [single] => raw.task.target = Some(Target::Single(single.clone())),
        many => raw.task.target = Some(Target::Many(many.to_vec())),
    }
    if !args.params.is_empty() {
        raw.task.params.program = args.params.clone();
    }
    if let Some(dir) = &args.output_dir {
        raw.worker.output_dir = dir.clone();
    }
    raw
}

/// Print every status snapshot as one JSON line until the task is terminal.
fn spawn_status_printer(state: Arc<TaskState>) -> JoinHandle<()> {
    let mut rx = state.subscribe();
    tokio::spawn(async move {
        loop {
            let snapshot: TaskSnapshot = rx.borrow_and_update().clone();
            print_snapshot(&snapshot);
            if snapshot.status.is_terminal() {
                break;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    })
}

fn print_snapshot(snapshot: &TaskSnapshot) {
    match serde_json::to_string(snapshot) {
        Ok(line) => println!("{line}"),
        Err(e) => warn!(error = %e, "could not serialise status snapshot"),
    }
}

/// Ctrl-C → `stop`.
fn spawn_ctrl_c_handler(task: Arc<ScanTask>) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            return;
        }
        info!("Ctrl+C received; stopping scan");
        if let Err(e) = task.send_notification("stop") {
            warn!(error = %e, "could not stop scan");
        }
    });
}

/// Each stdin line is a control command (`pause`, `stop`, `unpause`).
fn spawn_stdin_commands(task: Arc<ScanTask>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let command = line.trim();
            if command.is_empty() {
                continue;
            }
            debug!(command, "control command from stdin");
            if let Err(e) = task.send_notification(command) {
                warn!(command, error = %e, "control command failed");
            }
        }
    });
}

fn print_dry_run(task: &ScanTask, cfg: &ConfigFile) {
    println!("masscan-worker dry-run");
    println!("  task.id = {}", task.spec().id);
    println!("  task.project_uuid = {}", task.spec().project_uuid);
    println!("  task.target = {}", task.spec().target);
    println!("  worker.output_dir = {}", cfg.worker.output_dir);
    println!("  worker.chunk_size = {}", cfg.worker.chunk_size);
    println!("  worker.poll_interval_ms = {}", cfg.worker.poll_interval_ms);
    println!("  command: {}", task.command_line().join(" "));

    debug!("dry-run complete (no execution)");
}
