// tests/progress_monitor.rs

mod common;
use crate::common::{init_tracing, with_timeout};

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use masscan_worker::exec::monitor::{
    ParseProgressError, ProgressCoalescer, ProgressMonitor, ProgressParser, TickOutcome,
};
use masscan_worker::task::{OutputBuffer, TaskState};
use masscan_worker::types::TaskStatus;

fn working_monitor() -> (ProgressMonitor, Arc<TaskState>, OutputBuffer) {
    let state = Arc::new(TaskState::new("t1"));
    state.set_status(TaskStatus::Working, 0, None);
    let stderr = OutputBuffer::new();
    let monitor = ProgressMonitor::new(
        "t1",
        Arc::clone(&state),
        stderr.clone(),
        ProgressParser::new().unwrap(),
        Duration::from_millis(10),
        CancellationToken::new(),
    );
    (monitor, state, stderr)
}

#[test]
fn parses_percent_and_found_count() {
    let parser = ProgressParser::new().unwrap();
    let sample = parser.parse("12.75% done, found=42").unwrap();

    assert_eq!(sample.percent, "12.75");
    assert_eq!(sample.progress, 12);
    assert_eq!(sample.found, "42");
}

#[test]
fn parses_a_full_masscan_status_line() {
    let parser = ProgressParser::new().unwrap();
    let line = "rate:  0.10-kpps, 99.99% done,   0:00:01 remaining, found=7       \r";
    let sample = parser.parse(line).unwrap();

    assert_eq!(sample.percent, "99.99");
    assert_eq!(sample.progress, 99);
    assert_eq!(sample.found, "7");
}

#[test]
fn first_match_wins_when_chunk_holds_several_lines() {
    let parser = ProgressParser::new().unwrap();
    let chunk = "rate: 1.00-kpps, 3.10% done, found=1\rrate: 1.00-kpps, 4.20% done, found=2\r";
    let sample = parser.parse(chunk).unwrap();

    assert_eq!(sample.percent, "3.10");
    assert_eq!(sample.found, "1");
}

#[test]
fn missing_fields_are_reported() {
    let parser = ProgressParser::new().unwrap();

    assert_eq!(
        parser.parse("Starting masscan 1.3.2"),
        Err(ParseProgressError::MissingPercent)
    );
    assert_eq!(
        parser.parse("rate:  0.00-kpps, 0.41% done"),
        Err(ParseProgressError::MissingFound)
    );
}

#[test]
fn coalescer_only_reports_changes() {
    let parser = ProgressParser::new().unwrap();
    let mut coalescer = ProgressCoalescer::new();

    let a = parser.parse("12.75% done, found=42").unwrap();
    let same_int = parser.parse("12.99% done, found=42").unwrap();
    let more_found = parser.parse("12.99% done, found=43").unwrap();

    assert!(coalescer.observe(&a));
    assert!(!coalescer.observe(&a));
    assert!(!coalescer.observe(&same_int));
    assert!(coalescer.observe(&more_found));
}

#[test]
fn identical_lines_publish_once() {
    init_tracing();
    let (mut monitor, state, stderr) = working_monitor();
    let base = state.revision();

    stderr.append(b"12.75% done, found=42\n".to_vec());
    assert_eq!(monitor.tick(), TickOutcome::Published(12));

    stderr.append(b"12.75% done, found=42\n".to_vec());
    assert_eq!(monitor.tick(), TickOutcome::Unchanged);

    assert_eq!(state.revision(), base + 1);
    assert_eq!(state.progress(), 12);
}

#[test]
fn changing_either_value_publishes_exactly_once() {
    let (mut monitor, state, stderr) = working_monitor();

    stderr.append(b"12.75% done, found=42\n".to_vec());
    monitor.tick();
    let after_first = state.revision();

    // Same percentage, new found count.
    stderr.append(b"12.80% done, found=43\n".to_vec());
    assert_eq!(monitor.tick(), TickOutcome::Published(12));
    assert_eq!(monitor.tick(), TickOutcome::Unchanged);
    assert_eq!(state.revision(), after_first + 1);

    // New percentage, same found count.
    stderr.append(b"13.01% done, found=43\n".to_vec());
    assert_eq!(monitor.tick(), TickOutcome::Published(13));
    assert_eq!(monitor.tick(), TickOutcome::Unchanged);
    assert_eq!(state.revision(), after_first + 2);
    assert_eq!(state.progress(), 13);
}

#[test]
fn malformed_line_leaves_state_untouched() {
    init_tracing();
    let (mut monitor, state, stderr) = working_monitor();
    stderr.append(b"12.75% done, found=42\n".to_vec());
    monitor.tick();
    let before = state.snapshot();

    stderr.append(b"waiting-for-threads\n".to_vec());
    assert_eq!(
        monitor.tick(),
        TickOutcome::ParseFailed(ParseProgressError::MissingPercent)
    );
    assert_eq!(state.snapshot(), before);
}

#[test]
fn only_the_latest_chunk_is_inspected() {
    let (mut monitor, state, stderr) = working_monitor();

    stderr.append(b"40.00% done, found=1\n".to_vec());
    stderr.append(b"partial li".to_vec());

    assert!(matches!(monitor.tick(), TickOutcome::ParseFailed(_)));
    assert_eq!(state.progress(), 0);
}

#[test]
fn hundred_percent_while_working_is_capped() {
    let (mut monitor, state, stderr) = working_monitor();
    stderr.append(b"100.00% done, found=9\n".to_vec());

    assert_eq!(monitor.tick(), TickOutcome::Published(99));
    assert_eq!(state.status(), TaskStatus::Working);
    assert_eq!(state.progress(), 99);
}

#[test]
fn tick_before_launch_and_after_finish() {
    let state = Arc::new(TaskState::new("t1"));
    let stderr = OutputBuffer::new();
    let mut monitor = ProgressMonitor::new(
        "t1",
        Arc::clone(&state),
        stderr.clone(),
        ProgressParser::new().unwrap(),
        Duration::from_millis(10),
        CancellationToken::new(),
    );

    assert_eq!(monitor.tick(), TickOutcome::Waiting);

    state.set_status(TaskStatus::Working, 0, None);
    assert_eq!(monitor.tick(), TickOutcome::NoData);

    state.set_status(TaskStatus::Finished, 100, None);
    stderr.append(b"50.00% done, found=3\n".to_vec());
    assert_eq!(monitor.tick(), TickOutcome::Stopped);
    assert_eq!(state.progress(), 100);
}

#[tokio::test]
async fn run_loop_publishes_and_exits_on_terminal_status() {
    init_tracing();
    let state = Arc::new(TaskState::new("t1"));
    state.set_status(TaskStatus::Working, 0, None);
    let stderr = OutputBuffer::new();
    stderr.append(b"33.30% done, found=5\n".to_vec());

    let monitor = ProgressMonitor::new(
        "t1",
        Arc::clone(&state),
        stderr.clone(),
        ProgressParser::new().unwrap(),
        Duration::from_millis(5),
        CancellationToken::new(),
    );
    let handle = tokio::spawn(monitor.run());

    let mut rx = state.subscribe();
    with_timeout(rx.wait_for(|s| s.progress == 33)).await.unwrap();

    state.set_status(TaskStatus::Aborted, -1, Some("stopped".into()));
    with_timeout(handle).await.unwrap();
}

#[tokio::test]
async fn run_loop_exits_on_cancellation() {
    let state = Arc::new(TaskState::new("t1"));
    let cancel = CancellationToken::new();
    let monitor = ProgressMonitor::new(
        "t1",
        Arc::clone(&state),
        OutputBuffer::new(),
        ProgressParser::new().unwrap(),
        Duration::from_secs(3600),
        cancel.clone(),
    );
    let handle = tokio::spawn(monitor.run());

    cancel.cancel();
    with_timeout(handle).await.unwrap();
    assert_eq!(state.status(), TaskStatus::New);
}
