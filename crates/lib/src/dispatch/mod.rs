//! In-process actions reached through `internal:` commands.
//!
//! A command whose trimmed text starts with `internal:` is not handed to the
//! shell. The rest of the line is `<action> [arguments]`: the first word picks
//! a registered [`Action`] and the remainder is passed to it verbatim.
//!
//! ```yaml
//! targets:
//!   firmware:
//!     cmds:
//!       - "internal: load_nvm apps/default.txt"
//!       - "make -C core"
//!       - "internal: restore_nvm"
//! ```
//!
//! Actions only report success or failure; the orchestrator treats a failed
//! action exactly like a failed shell command.

pub mod header;

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::config::{BuildConfig, ConfigError};
use crate::consts::INTERNAL_PREFIX;
use crate::expand::expand;

pub use header::{LoadNvm, RestoreNvm};

/// Errors raised by internal actions.
#[derive(Debug, Error)]
pub enum ActionError {
  #[error("unknown internal command `{0}`")]
  Unknown(String),

  #[error("`{action}` requires {argument}")]
  MissingArgument {
    action: &'static str,
    argument: &'static str,
  },

  #[error("{context}: {source}")]
  Io {
    context: String,
    #[source]
    source: io::Error,
  },

  #[error("backup file not found: {}", .0.display())]
  BackupNotFound(PathBuf),

  #[error("invalid pattern: {0}")]
  Pattern(#[from] regex::Error),
}

impl ActionError {
  pub(crate) fn io(context: impl Into<String>) -> impl FnOnce(io::Error) -> ActionError {
    let context = context.into();
    move |source| ActionError::Io { context, source }
  }
}

/// A named in-process side effect.
pub trait Action {
  /// Run the action with its argument string, resolving paths against `cwd`.
  fn run(&self, args: &str, cwd: &Path) -> Result<(), ActionError>;
}

impl<F> Action for F
where
  F: Fn(&str, &Path) -> Result<(), ActionError>,
{
  fn run(&self, args: &str, cwd: &Path) -> Result<(), ActionError> {
    self(args, cwd)
  }
}

/// A parsed `internal:` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation<'a> {
  pub action: &'a str,
  pub args: &'a str,
}

impl fmt::Display for Invocation<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.args.is_empty() {
      write!(f, "{}", self.action)
    } else {
      write!(f, "{} {}", self.action, self.args)
    }
  }
}

/// Parse a command as an internal invocation, or `None` for a shell command.
pub fn parse_internal(command: &str) -> Option<Invocation<'_>> {
  let rest = command.trim().strip_prefix(INTERNAL_PREFIX)?.trim();

  let (action, args) = match rest.split_once(char::is_whitespace) {
    Some((action, args)) => (action, args.trim()),
    None => (rest, ""),
  };

  Some(Invocation { action, args })
}

/// Registry of named actions.
#[derive(Default)]
pub struct Dispatcher {
  actions: BTreeMap<String, Box<dyn Action>>,
}

impl fmt::Debug for Dispatcher {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_set().entries(self.actions.keys()).finish()
  }
}

impl Dispatcher {
  /// An empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// A registry with the built-in header actions, `load_nvm` and `restore_nvm`.
  pub fn builtin() -> Self {
    let mut dispatcher = Self::new();
    dispatcher.register(header::LOAD_NVM, LoadNvm::default());
    dispatcher.register(header::RESTORE_NVM, RestoreNvm::default());
    dispatcher
  }

  /// Register `action` under `name`, replacing any previous action of that name.
  pub fn register(&mut self, name: impl Into<String>, action: impl Action + 'static) {
    self.actions.insert(name.into(), Box::new(action));
  }

  pub fn contains(&self, name: &str) -> bool {
    self.actions.contains_key(name)
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.actions.keys().map(String::as_str)
  }

  /// Run the action named by `invocation`.
  pub fn dispatch(&self, invocation: &Invocation<'_>, cwd: &Path) -> Result<(), ActionError> {
    let action = self
      .actions
      .get(invocation.action)
      .ok_or_else(|| ActionError::Unknown(invocation.action.to_string()))?;

    debug!(action = %invocation.action, args = %invocation.args, "running internal command");
    action.run(invocation.args, cwd)
  }

  /// Check that every `internal:` command in `config` names a registered action.
  ///
  /// Commands are expanded first. An action name that still contains a
  /// `${...}` token after expansion cannot be checked here and is left to
  /// fail at execution time if it is wrong.
  pub fn validate(&self, config: &BuildConfig) -> Result<(), ConfigError> {
    for (name, target) in &config.targets {
      for raw in &target.cmds {
        let command = expand(raw, name, &target.deps, &config.variables);
        let Some(invocation) = parse_internal(&command) else {
          continue;
        };
        if invocation.action.contains("${") {
          continue;
        }
        if !self.contains(invocation.action) {
          return Err(ConfigError::UnknownAction {
            target: name.clone(),
            action: invocation.action.to_string(),
          });
        }
      }
    }
    Ok(())
  }
}
