// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `masscan-worker`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "masscan-worker",
    version,
    about = "Launch and supervise a single masscan task.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `MasscanWorker.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "MasscanWorker.toml")]
    pub config: String,

    /// Override `[task].id`.
    #[arg(long, value_name = "ID")]
    pub task_id: Option<String>,

    /// Override `[task].project_uuid`.
    #[arg(long, value_name = "UUID")]
    pub project: Option<String>,

    /// Override `[task].target`. May be repeated; entries are joined with `,`.
    #[arg(long, value_name = "TARGET")]
    pub target: Vec<String>,

    /// Override `[worker].output_dir`.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MASSCAN_WORKER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the command line, but don't launch anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Tool parameters; replaces `[task.params].program` when given.
    #[arg(last = true, value_name = "PARAMS")]
    pub params: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
