//! Test utilities for chorus-lib.
//!
//! Cross-platform helpers for tests that create files, shift modification
//! times, or need a shell command with a known effect.

use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Create an empty file (and its parent directories), or bump its mtime to now.
pub fn touch(path: &Path) {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  let file = File::options().create(true).append(true).open(path).unwrap();
  file.set_modified(SystemTime::now()).unwrap();
}

/// Move a file's modification time `by` into the past.
pub fn age(path: &Path, by: Duration) {
  let file = File::options().append(true).open(path).unwrap();
  file.set_modified(SystemTime::now() - by).unwrap();
}

/// Returns a shell command that appends `line` to `file`.
#[cfg(unix)]
pub fn append_line(file: &str, line: &str) -> String {
  format!("echo {} >> {}", line, file)
}

#[cfg(windows)]
pub fn append_line(file: &str, line: &str) -> String {
  format!("Add-Content -Path {} -Value {}", file, line)
}

/// Returns a shell command that exits with `code`.
pub fn exit_with(code: i32) -> String {
  format!("exit {}", code)
}
