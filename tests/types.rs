// tests/types.rs

use masscan_worker::types::{ControlCommand, Target, TaskStatus};

#[test]
fn control_commands_are_exact_tokens() {
    assert_eq!("pause".parse::<ControlCommand>(), Ok(ControlCommand::Pause));
    assert_eq!("stop".parse::<ControlCommand>(), Ok(ControlCommand::Stop));
    assert_eq!("unpause".parse::<ControlCommand>(), Ok(ControlCommand::Unpause));

    assert!("Pause".parse::<ControlCommand>().is_err());
    assert!("resume".parse::<ControlCommand>().is_err());
    assert!("".parse::<ControlCommand>().is_err());
}

#[test]
fn status_round_trips_through_display() {
    for status in [
        TaskStatus::New,
        TaskStatus::Working,
        TaskStatus::Finished,
        TaskStatus::Aborted,
    ] {
        assert_eq!(status.to_string().parse::<TaskStatus>(), Ok(status));
    }
}

#[test]
fn only_finished_and_aborted_are_terminal() {
    assert!(!TaskStatus::New.is_terminal());
    assert!(!TaskStatus::Working.is_terminal());
    assert!(TaskStatus::Finished.is_terminal());
    assert!(TaskStatus::Aborted.is_terminal());
}

#[test]
fn empty_targets_are_detected() {
    assert!(Target::Single("  ".into()).is_empty());
    assert!(Target::Many(vec![]).is_empty());
    assert!(Target::Many(vec!["".into(), " ".into()]).is_empty());
    assert!(!Target::Many(vec!["10.0.0.1".into()]).is_empty());
}
