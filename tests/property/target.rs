use proptest::prelude::*;

use masscan_worker::config::{TaskParams, WorkerConfig};
use masscan_worker::exec::build_command_line;
use masscan_worker::task::TaskSpec;
use masscan_worker::types::Target;

// Comma-free tokens so the joined string can be split back unambiguously.
fn target_entry() -> impl Strategy<Value = String> {
    "[a-z0-9.:/-]{1,20}"
}

proptest! {
    #[test]
    fn joined_target_preserves_entries_and_order(
        entries in proptest::collection::vec(target_entry(), 1..16)
    ) {
        let spec = TaskSpec::new(
            "prop",
            Target::Many(entries.clone()),
            TaskParams::default(),
            "project",
        );

        prop_assert_eq!(&spec.target, &entries.join(","));

        let split: Vec<String> = spec.target.split(',').map(str::to_string).collect();
        prop_assert_eq!(split, entries);

        let argv = build_command_line(&spec, &WorkerConfig::default());
        prop_assert_eq!(&argv[2], &spec.target);
    }

    #[test]
    fn single_target_is_never_rewritten(entry in target_entry()) {
        prop_assert_eq!(Target::Single(entry.clone()).normalized(), entry);
    }
}
