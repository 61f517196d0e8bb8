#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// An executable `/bin/sh` script standing in for the scanner binary.
///
/// The scanner's arguments (target, `-oX -`, params) are passed to the
/// script and ignored unless the body uses `$@`. The script lives as long as
/// this value.
pub struct FakeScanner {
    _dir: TempDir,
    path: PathBuf,
}

impl FakeScanner {
    pub fn new(body: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir for fake scanner");
        let path = dir.path().join("fake-masscan");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write fake scanner");
        let mut perms = fs::metadata(&path).expect("stat fake scanner").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("chmod fake scanner");
        Self { _dir: dir, path }
    }

    /// Prints a small XML document on stdout, progress on stderr, exits 0.
    pub fn successful() -> Self {
        Self::new(
            r#"printf '<?xml version="1.0"?>\n<nmaprun>\n'
printf 'rate:  0.00-kpps, 12.75%% done, found=42\n' >&2
printf '<host><address addr="10.0.0.1"/></host>\n'
printf '</nmaprun>\n'
exit 0"#,
        )
    }

    /// Writes two stderr lines and exits with `code`.
    pub fn failing(code: i32) -> Self {
        Self::new(&format!(
            "printf 'FAIL: could not determine router MAC\\n' >&2\n\
             printf 'l2: no route to host\\n' >&2\n\
             exit {code}"
        ))
    }

    /// Replaces itself with a long sleep so signals hit the scanner directly.
    pub fn long_running() -> Self {
        Self::new("printf 'starting\\n' >&2\nexec sleep 30")
    }

    /// Echoes its arguments, one per line, on stdout.
    pub fn echo_args() -> Self {
        Self::new("for arg in \"$@\"; do printf '%s\\n' \"$arg\"; done")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
