// src/exec/monitor.rs

//! Progress monitor.
//!
//! Polls on a fixed interval, independent of the drainers. On each tick it
//! looks only at the most recent stderr chunk, which masscan fills with
//! status lines such as:
//!
//! ```text
//! rate:  0.10-kpps, 12.75% done,   0:01:02 remaining, found=42
//! ```
//!
//! The percentage is truncated to an integer and published as a `Working`
//! update, but only when it or the found count changed since the last
//! published sample.

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use thiserror::Error;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::task::{OutputBuffer, TaskState};
use crate::types::TaskStatus;

/// Highest progress a `Working` task may report; 100 is kept for `Finished`.
pub const MAX_WORKING_PROGRESS: i32 = 99;

/// Values extracted from one progress line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSample {
    /// Percentage text as printed, e.g. `"12.75"`.
    pub percent: String,
    /// Found count text, e.g. `"42"`.
    pub found: String,
    /// `percent` with the fractional part dropped.
    pub progress: i32,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseProgressError {
    #[error("no percentage in progress line")]
    MissingPercent,
    #[error("no found= count in progress line")]
    MissingFound,
    #[error("unusable percentage '{0}'")]
    InvalidPercent(String),
}

/// Regex-based extractor for masscan status lines.
#[derive(Debug, Clone)]
pub struct ProgressParser {
    percent: Regex,
    found: Regex,
}

impl ProgressParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            percent: Regex::new(r"([0-9]+(?:\.[0-9]+)?)%")?,
            found: Regex::new(r"found=([0-9]+)")?,
        })
    }

    /// First percentage and first `found=` count in `text`.
    pub fn parse(&self, text: &str) -> Result<ProgressSample, ParseProgressError> {
        let percent = self
            .percent
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or(ParseProgressError::MissingPercent)?;

        let found = self
            .found
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or(ParseProgressError::MissingFound)?;

        let whole = percent.split('.').next().unwrap_or_default();
        let progress = whole
            .parse::<i32>()
            .map_err(|_| ParseProgressError::InvalidPercent(percent.clone()))?;

        Ok(ProgressSample {
            percent,
            found,
            progress,
        })
    }
}

/// Remembers the last published sample and decides whether a new one is
/// worth publishing.
#[derive(Debug, Clone, Default)]
pub struct ProgressCoalescer {
    last_progress: i32,
    last_found: Option<String>,
}

impl ProgressCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when `sample` differs from the last accepted one in either
    /// progress or found count; the sample then becomes the new baseline.
    pub fn observe(&mut self, sample: &ProgressSample) -> bool {
        let changed = sample.progress != self.last_progress
            || self.last_found.as_deref() != Some(sample.found.as_str());

        if changed {
            self.last_progress = sample.progress;
            self.last_found = Some(sample.found.clone());
        }
        changed
    }
}

/// What a single poll did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Task not launched yet.
    Waiting,
    /// Nothing captured on stderr yet.
    NoData,
    ParseFailed(ParseProgressError),
    /// Parsed, but equal to the last published values.
    Unchanged,
    /// A `Working` update with this progress was accepted.
    Published(i32),
    /// Task is terminal; the monitor should exit.
    Stopped,
}

#[derive(Debug)]
pub struct ProgressMonitor {
    task_id: String,
    state: Arc<TaskState>,
    stderr: OutputBuffer,
    parser: ProgressParser,
    coalescer: ProgressCoalescer,
    poll_interval: Duration,
    cancel: CancellationToken,
}

impl ProgressMonitor {
    pub fn new(
        task_id: impl Into<String>,
        state: Arc<TaskState>,
        stderr: OutputBuffer,
        parser: ProgressParser,
        poll_interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            state,
            stderr,
            parser,
            coalescer: ProgressCoalescer::new(),
            poll_interval,
            cancel,
        }
    }

    /// Poll until the task is terminal or the token is cancelled.
    pub async fn run(mut self) {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            if self.tick() == TickOutcome::Stopped {
                break;
            }
        }

        debug!(task_id = %self.task_id, status = %self.state.status(), "progress monitor ended");
    }

    /// One poll.
    pub fn tick(&mut self) -> TickOutcome {
        match self.state.status() {
            TaskStatus::New => {
                trace!(task_id = %self.task_id, "task not started yet");
                TickOutcome::Waiting
            }
            TaskStatus::Finished | TaskStatus::Aborted => TickOutcome::Stopped,
            TaskStatus::Working => self.inspect_latest_chunk(),
        }
    }

    fn inspect_latest_chunk(&mut self) -> TickOutcome {
        let Some(chunk) = self.stderr.last() else {
            return TickOutcome::NoData;
        };
        let text = String::from_utf8_lossy(&chunk);

        let sample = match self.parser.parse(&text) {
            Ok(sample) => sample,
            Err(e) => {
                debug!(task_id = %self.task_id, error = %e, "could not parse progress");
                return TickOutcome::ParseFailed(e);
            }
        };

        debug!(
            task_id = %self.task_id,
            percent = %sample.percent,
            found = %sample.found,
            "scan progress"
        );

        if !self.coalescer.observe(&sample) {
            return TickOutcome::Unchanged;
        }

        let progress = sample.progress.clamp(0, MAX_WORKING_PROGRESS);
        if self.state.set_status(TaskStatus::Working, progress, None) {
            TickOutcome::Published(progress)
        } else {
            // Lost the race against the reconciler.
            TickOutcome::Stopped
        }
    }
}
