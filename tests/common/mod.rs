#![allow(dead_code)]

pub use masscan_worker_test_utils::builders;
#[cfg(unix)]
pub use masscan_worker_test_utils::fake_scanner;
pub use masscan_worker_test_utils::{init_tracing, with_timeout};
