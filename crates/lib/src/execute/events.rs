//! Progress events emitted while a build runs.
//!
//! The orchestrator never prints. Everything the user sees comes from a
//! [`Reporter`] consuming these events; the CLI renders them to the terminal
//! and tests collect them into a `Vec`.

use std::time::Duration;

use crate::staleness::Staleness;

/// How a command is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
  Shell,
  Internal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
  /// A stale target is about to run its commands.
  TargetStarted { target: String, reason: Staleness },

  /// A target was up to date.
  TargetSkipped { target: String },

  /// Every command of a target succeeded.
  TargetFinished { target: String },

  CommandStarted {
    target: String,
    command: String,
    kind: CommandKind,
  },

  CommandSucceeded {
    target: String,
    command: String,
    kind: CommandKind,
    elapsed: Duration,
  },

  CommandFailed {
    target: String,
    command: String,
    kind: CommandKind,
    elapsed: Duration,
  },

  /// The whole run succeeded.
  RunFinished { elapsed: Duration },
}

/// Receives build events in order.
pub trait Reporter {
  fn report(&mut self, event: BuildEvent);
}

impl Reporter for Vec<BuildEvent> {
  fn report(&mut self, event: BuildEvent) {
    self.push(event);
  }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Reporter for Silent {
  fn report(&mut self, _event: BuildEvent) {}
}
