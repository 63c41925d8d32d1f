//! Implementation of `chorus [TARGET...]`.
//!
//! Loads `chorus.build` from the current directory and builds the named
//! targets, or `all` when none are named. Signal handlers are installed
//! before the build file is read, so a Ctrl-C at any point cancels cleanly.

use std::env;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use chorus_lib::config;
use chorus_lib::consts::{CONFIG_FILENAME, DEFAULT_TARGET};
use chorus_lib::dispatch::Dispatcher;
use chorus_lib::execute::{BuildError, ExecuteConfig, Interrupt, Orchestrator, RunSummary};

use crate::output::ConsoleReporter;

pub fn cmd_build(targets: &[String], start: Instant) -> Result<RunSummary> {
  let rt = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")?;

  let result = rt.block_on(build(targets, start));

  // A cancelled load may still be parsing on the blocking pool.
  rt.shutdown_background();
  result
}

async fn build(targets: &[String], start: Instant) -> Result<RunSummary> {
  let mut interrupt = Interrupt::listen().context("Failed to install signal handlers")?;

  let root = env::current_dir().context("Failed to determine current directory")?;
  let path = root.join(CONFIG_FILENAME);

  let loading = tokio::task::spawn_blocking(move || config::load(&path));
  let config = tokio::select! {
    biased;
    () = interrupt.triggered() => {
      warn!("cancelled while loading build file");
      return Err(BuildError::Interrupted.into());
    }
    loaded = loading => loaded.context("Build file loader panicked")??,
  };

  let dispatcher = Dispatcher::builtin();
  dispatcher.validate(&config)?;

  let requested = if targets.is_empty() {
    vec![DEFAULT_TARGET.to_string()]
  } else {
    targets.to_vec()
  };
  debug!(targets = ?requested, root = %root.display(), "starting build");

  let settings = ExecuteConfig::from_env(root);
  let mut reporter = ConsoleReporter;

  let summary = Orchestrator::new(&config, &dispatcher, settings, &mut reporter)
    .with_interrupt(interrupt)
    .started_at(start)
    .run(requested.as_slice())
    .await?;

  Ok(summary)
}
