//! Error and configuration types for running a build.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::consts::SHELL_ENV;
use crate::dispatch::ActionError;
use crate::graph::GraphError;

/// Errors from running a single shell command.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The command exited unsuccessfully.
  #[error("command failed ({}): {cmd}", exit_description(.code))]
  CmdFailed { cmd: String, code: Option<i32> },

  /// The shell could not be started or waited on.
  #[error("failed to run `{cmd}`: {source}")]
  Spawn {
    cmd: String,
    #[source]
    source: io::Error,
  },

  /// The run was interrupted while the command was active.
  #[error("interrupted while running `{cmd}`")]
  Interrupted { cmd: String },
}

fn exit_description(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("exit code {code}"),
    None => "terminated by signal".to_string(),
  }
}

/// Errors that end a build run.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Graph(#[from] GraphError),

  #[error("target `{target}`: {source}")]
  Command {
    target: String,
    #[source]
    source: ExecuteError,
  },

  #[error("target `{target}`: internal command `{command}` failed: {source}")]
  Action {
    target: String,
    command: String,
    #[source]
    source: ActionError,
  },

  #[error("cannot check whether `{target}` is up to date: {source}")]
  Staleness {
    target: String,
    #[source]
    source: io::Error,
  },

  #[error("build cancelled")]
  Interrupted,
}

impl BuildError {
  /// Whether the run stopped because of a termination request.
  pub fn is_interrupt(&self) -> bool {
    matches!(self, BuildError::Interrupted)
  }
}

/// Settings for running commands.
#[derive(Debug, Clone)]
pub struct ExecuteConfig {
  /// Directory that target paths are resolved against and commands run in.
  pub root: PathBuf,

  /// Shell override. `None` means `/bin/sh` on Unix, PowerShell on Windows.
  pub shell: Option<String>,
}

impl ExecuteConfig {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
      shell: None,
    }
  }

  /// Settings for `root`, with the shell taken from `CHORUS_SHELL` if set.
  pub fn from_env(root: impl Into<PathBuf>) -> Self {
    let shell = std::env::var(SHELL_ENV).ok().filter(|s| !s.trim().is_empty());
    Self {
      shell,
      ..Self::new(root)
    }
  }
}
