//! Running a build.
//!
//! A run has two passes:
//!
//! 1. **Plan**: walk every requested target with one [`Walker`]. Undefined
//!    targets and cycles are reported here, before any command runs.
//! 2. **Execute**: for each planned target, in order, check staleness and run
//!    its commands one at a time. Staleness is checked just before the target
//!    runs, after its dependencies have been rebuilt.
//!
//! The first failing command ends the run. Targets already built stay built;
//! nothing is rolled back.
//!
//! # Example
//!
//! ```no_run
//! use chorus_lib::config::load;
//! use chorus_lib::dispatch::Dispatcher;
//! use chorus_lib::execute::{BuildEvent, ExecuteConfig, Orchestrator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load("chorus.build".as_ref())?;
//! let dispatcher = Dispatcher::builtin();
//! let mut events: Vec<BuildEvent> = Vec::new();
//!
//! let summary = Orchestrator::new(&config, &dispatcher, ExecuteConfig::new("."), &mut events)
//!   .run(&["all"])
//!   .await?;
//!
//! println!("built {} targets", summary.built.len());
//! # Ok(())
//! # }
//! ```

pub mod cmd;
pub mod events;
pub mod interrupt;
pub mod types;

use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::{BuildConfig, Target};
use crate::dispatch::{Dispatcher, Invocation, parse_internal};
use crate::expand::expand;
use crate::graph::Walker;
use crate::staleness;

pub use events::{BuildEvent, CommandKind, Reporter, Silent};
pub use interrupt::{Interrupt, InterruptHandle};
pub use types::{BuildError, ExecuteConfig, ExecuteError};

/// Outcome of a successful run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
  /// Targets whose commands ran, in order.
  pub built: Vec<String>,
  /// Targets found up to date.
  pub up_to_date: Vec<String>,
  pub elapsed: Duration,
}

/// Drives one build run over a loaded configuration.
pub struct Orchestrator<'a> {
  config: &'a BuildConfig,
  dispatcher: &'a Dispatcher,
  settings: ExecuteConfig,
  reporter: &'a mut dyn Reporter,
  interrupt: Interrupt,
  started: Option<Instant>,
  walker: Walker,
}

impl<'a> Orchestrator<'a> {
  pub fn new(
    config: &'a BuildConfig,
    dispatcher: &'a Dispatcher,
    settings: ExecuteConfig,
    reporter: &'a mut dyn Reporter,
  ) -> Self {
    Self {
      config,
      dispatcher,
      settings,
      reporter,
      interrupt: Interrupt::never(),
      started: None,
      walker: Walker::new(),
    }
  }

  /// Stop the run when `interrupt` fires.
  pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
    self.interrupt = interrupt;
    self
  }

  /// Measure the run's elapsed time from `start` rather than from [`Self::run`].
  pub fn started_at(mut self, start: Instant) -> Self {
    self.started = Some(start);
    self
  }

  /// The visit marks of this run.
  pub fn walker(&self) -> &Walker {
    &self.walker
  }

  /// Build the requested targets in order.
  ///
  /// # Errors
  ///
  /// - [`BuildError::Graph`] for an undefined target or a cycle; nothing runs
  /// - [`BuildError::Command`] / [`BuildError::Action`] for the first failed command
  /// - [`BuildError::Staleness`] if a target's file cannot be inspected
  /// - [`BuildError::Interrupted`] if the run was cancelled
  pub async fn run<S: AsRef<str>>(&mut self, requested: &[S]) -> Result<RunSummary, BuildError> {
    let start = self.started.unwrap_or_else(Instant::now);

    if self.interrupt.check().await {
      warn!("cancelled before planning");
      return Err(BuildError::Interrupted);
    }

    let plan = self.walker.walk_all(self.config, requested)?;
    info!(targets = plan.len(), "planned build");
    debug!(order = ?plan, "build order");

    let config = self.config;
    let mut summary = RunSummary::default();

    for name in plan {
      let Some(target) = config.target(&name) else {
        continue;
      };
      if self.interrupt.check().await {
        warn!(target = %name, "cancelled before target");
        return Err(BuildError::Interrupted);
      }
      if self.build_target(&name, target).await? {
        summary.built.push(name);
      } else {
        summary.up_to_date.push(name);
      }
    }

    summary.elapsed = start.elapsed();
    info!(
      built = summary.built.len(),
      up_to_date = summary.up_to_date.len(),
      elapsed = ?summary.elapsed,
      "build finished"
    );
    self.reporter.report(BuildEvent::RunFinished {
      elapsed: summary.elapsed,
    });

    Ok(summary)
  }

  /// Returns whether the target's commands ran.
  async fn build_target(&mut self, name: &str, target: &Target) -> Result<bool, BuildError> {
    let reason = staleness::check(&self.settings.root, name, target).map_err(|source| BuildError::Staleness {
      target: name.to_string(),
      source,
    })?;

    if !reason.is_stale() {
      debug!(target = %name, "up to date");
      self.reporter.report(BuildEvent::TargetSkipped {
        target: name.to_string(),
      });
      return Ok(false);
    }

    info!(target = %name, reason = %reason, "building target");
    self.reporter.report(BuildEvent::TargetStarted {
      target: name.to_string(),
      reason,
    });

    for raw in &target.cmds {
      if self.interrupt.check().await {
        warn!(target = %name, "cancelled before next command");
        return Err(BuildError::Interrupted);
      }

      let command = expand(raw, name, &target.deps, &self.config.variables);
      debug!(target = %name, raw = %raw, command = %command, "expanded command");

      match parse_internal(&command) {
        Some(invocation) => self.run_internal(name, &invocation)?,
        None => self.run_shell(name, &command).await?,
      }
    }

    self.reporter.report(BuildEvent::TargetFinished {
      target: name.to_string(),
    });
    Ok(true)
  }

  async fn run_shell(&mut self, name: &str, command: &str) -> Result<(), BuildError> {
    self.started(name, command, CommandKind::Shell);
    let start = Instant::now();

    let result = cmd::execute_cmd(
      command,
      &self.settings.root,
      self.settings.shell.as_deref(),
      &mut self.interrupt,
    )
    .await;

    match result {
      Ok(()) => {
        self.succeeded(name, command, CommandKind::Shell, start.elapsed());
        Ok(())
      }
      Err(ExecuteError::Interrupted { .. }) => {
        warn!(target = %name, "cancelled while running command");
        Err(BuildError::Interrupted)
      }
      Err(source) => {
        error!(target = %name, error = %source, "command failed");
        self.failed(name, command, CommandKind::Shell, start.elapsed());
        Err(BuildError::Command {
          target: name.to_string(),
          source,
        })
      }
    }
  }

  fn run_internal(&mut self, name: &str, invocation: &Invocation<'_>) -> Result<(), BuildError> {
    let command = invocation.to_string();
    self.started(name, &command, CommandKind::Internal);
    let start = Instant::now();

    match self.dispatcher.dispatch(invocation, &self.settings.root) {
      Ok(()) => {
        self.succeeded(name, &command, CommandKind::Internal, start.elapsed());
        Ok(())
      }
      Err(source) => {
        error!(target = %name, command = %command, error = %source, "internal command failed");
        self.failed(name, &command, CommandKind::Internal, start.elapsed());
        Err(BuildError::Action {
          target: name.to_string(),
          command,
          source,
        })
      }
    }
  }

  fn started(&mut self, name: &str, command: &str, kind: CommandKind) {
    self.reporter.report(BuildEvent::CommandStarted {
      target: name.to_string(),
      command: command.to_string(),
      kind,
    });
  }

  fn succeeded(&mut self, name: &str, command: &str, kind: CommandKind, elapsed: Duration) {
    self.reporter.report(BuildEvent::CommandSucceeded {
      target: name.to_string(),
      command: command.to_string(),
      kind,
      elapsed,
    });
  }

  fn failed(&mut self, name: &str, command: &str, kind: CommandKind, elapsed: Duration) {
    self.reporter.report(BuildEvent::CommandFailed {
      target: name.to_string(),
      command: command.to_string(),
      kind,
      elapsed,
    });
  }
}
