//! Cancellation by SIGINT and SIGTERM.

use std::fmt::Write;
use std::time::Duration;

use super::common::{TestEnv, send_signal};

const SLOW: &str = r#"
targets:
  all:
    deps: [slow]
    cmds: ["echo all >> log"]
  slow:
    phony: true
    cmds:
      - "echo start >> log"
      - "sleep 5"
      - "echo never >> log"
"#;

fn cancel_running_command(signal: &str) {
  let env = TestEnv::with_build_file(SLOW);
  let child = env.spawn_chorus();

  env.wait_for_log("start");
  std::thread::sleep(Duration::from_millis(100));
  send_signal(&child, signal);
  let output = child.wait_with_output().unwrap();

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Build cancelled!"));
  assert_eq!(env.log(), vec!["start"]);
}

#[test]
fn sigint_cancels_running_command() {
  cancel_running_command("INT");
}

#[test]
fn sigterm_cancels_running_command() {
  cancel_running_command("TERM");
}

#[test]
fn sigint_during_load_cancels() {
  let mut build_file = String::from(SLOW);
  for i in 0..200_000 {
    write!(build_file, "  filler{i}:\n    phony: true\n    cmds: [\"true\"]\n").unwrap();
  }
  let env = TestEnv::with_build_file(&build_file);
  let child = env.spawn_chorus();

  std::thread::sleep(Duration::from_millis(300));
  send_signal(&child, "INT");
  let output = child.wait_with_output().unwrap();

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Build cancelled!"));
  assert!(!env.log().contains(&"never".to_string()));
}
