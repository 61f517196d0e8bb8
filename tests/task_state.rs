// tests/task_state.rs

mod common;
use crate::common::{init_tracing, with_timeout};

use std::sync::Arc;
use std::time::Duration;

use masscan_worker::task::TaskState;
use masscan_worker::types::TaskStatus;

#[test]
fn new_state_starts_at_zero() {
    let state = TaskState::new("t1");
    let snap = state.snapshot();
    assert_eq!(snap.task_id, "t1");
    assert_eq!(snap.status, TaskStatus::New);
    assert_eq!(snap.progress, 0);
    assert_eq!(snap.message, None);
    assert_eq!(snap.revision, 0);
}

#[test]
fn happy_path_transitions_are_accepted() {
    init_tracing();
    let state = TaskState::new("t1");

    assert!(state.set_status(TaskStatus::Working, 0, None));
    assert!(state.set_status(TaskStatus::Working, 42, None));
    assert!(state.set_status(TaskStatus::Finished, 100, None));

    let snap = state.snapshot();
    assert_eq!(snap.status, TaskStatus::Finished);
    assert_eq!(snap.progress, 100);
    assert_eq!(snap.revision, 3);
}

#[test]
fn launch_failure_edge_goes_straight_to_aborted() {
    let state = TaskState::new("t1");
    assert!(state.set_status(TaskStatus::Aborted, -1, Some("no such file".into())));

    let snap = state.snapshot();
    assert_eq!(snap.status, TaskStatus::Aborted);
    assert_eq!(snap.progress, -1);
    assert_eq!(snap.message.as_deref(), Some("no such file"));
}

#[test]
fn terminal_state_cannot_go_back_to_working_or_new() {
    init_tracing();
    let state = TaskState::new("t1");
    state.set_status(TaskStatus::Working, 0, None);
    state.set_status(TaskStatus::Aborted, -1, Some("boom".into()));
    let before = state.snapshot();

    assert!(!state.set_status(TaskStatus::Working, 50, None));
    assert!(!state.set_status(TaskStatus::New, 0, None));
    assert_eq!(state.snapshot(), before);
}

#[test]
fn working_cannot_go_back_to_new() {
    let state = TaskState::new("t1");
    state.set_status(TaskStatus::Working, 10, None);
    assert!(!state.set_status(TaskStatus::New, 0, None));
    assert_eq!(state.status(), TaskStatus::Working);
}

#[test]
fn new_task_cannot_finish_without_working() {
    init_tracing();
    let state = TaskState::new("t1");

    assert!(!state.set_status(TaskStatus::Finished, 100, None));
    assert_eq!(state.status(), TaskStatus::New);
    assert_eq!(state.revision(), 0);

    assert!(!TaskStatus::New.can_transition_to(TaskStatus::Finished));
    assert!(TaskStatus::New.can_transition_to(TaskStatus::Working));
    assert!(TaskStatus::New.can_transition_to(TaskStatus::Aborted));
}

#[test]
fn terminal_to_terminal_is_last_write_wins() {
    let state = TaskState::new("t1");
    state.set_status(TaskStatus::Working, 0, None);

    assert!(state.set_status(TaskStatus::Aborted, -1, Some("terminated".into())));
    assert!(state.set_status(TaskStatus::Aborted, -1, Some("terminated again".into())));

    let snap = state.snapshot();
    assert_eq!(snap.status, TaskStatus::Aborted);
    assert_eq!(snap.message.as_deref(), Some("terminated again"));
}

#[test]
fn reserved_and_out_of_range_progress_is_rejected() {
    init_tracing();
    let state = TaskState::new("t1");
    state.set_status(TaskStatus::Working, 0, None);
    let revision = state.revision();

    assert!(!state.set_status(TaskStatus::Working, 101, None));
    assert!(!state.set_status(TaskStatus::Working, -2, None));
    assert!(!state.set_status(TaskStatus::Working, -1, None));
    assert!(!state.set_status(TaskStatus::Working, 100, None));
    assert!(!state.set_status(TaskStatus::Finished, -1, None));

    assert_eq!(state.revision(), revision);
    assert_eq!(state.progress(), 0);
}

#[tokio::test]
async fn subscribers_see_accepted_updates() {
    let state = TaskState::new("t1");
    let mut rx = state.subscribe();

    state.set_status(TaskStatus::Working, 5, None);
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().progress, 5);

    // Rejected updates do not wake subscribers.
    state.set_status(TaskStatus::New, 0, None);
    assert!(!rx.has_changed().unwrap());
}

#[tokio::test]
async fn wait_terminal_resolves_when_another_task_finishes_it() {
    let state = Arc::new(TaskState::new("t1"));
    state.set_status(TaskStatus::Working, 0, None);

    let writer = Arc::clone(&state);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        writer.set_status(TaskStatus::Finished, 100, None);
    });

    let snap = with_timeout(state.wait_terminal()).await;
    assert_eq!(snap.status, TaskStatus::Finished);
    assert_eq!(snap.progress, 100);
}
