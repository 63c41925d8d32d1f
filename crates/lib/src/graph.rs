//! Dependency walk over the target table.
//!
//! Targets are visited depth-first, dependencies left to right, and each
//! declared target is emitted once, after all of its dependencies. Each target
//! carries a mark:
//!
//! - unvisited (no entry)
//! - `Visiting`: on the current path; meeting it again is a cycle
//! - `Done`: already emitted; later references are no-ops
//!
//! The marks belong to one [`Walker`] and persist across calls, so several
//! requested targets share work: a target emitted for an earlier request is
//! not emitted again for a later one.
//!
//! Dependency names that are not declared targets are plain files (leaves)
//! and are not emitted. The default target name is the exception: it must be
//! declared to be requested or depended upon.

use std::collections::HashMap;

use thiserror::Error;
use tracing::trace;

use crate::config::BuildConfig;
use crate::consts::DEFAULT_TARGET;

/// Errors found while walking the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
  #[error("target `{0}` not defined")]
  UndefinedTarget(String),

  #[error("no `all` target defined; name a target to build")]
  UndefinedDefaultTarget,

  #[error("dependency cycle detected: {}", chain.join(" -> "))]
  Cycle { chain: Vec<String> },
}

/// Visit state of a declared target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
  Visiting,
  Done,
}

/// Depth-first walker holding the visit marks for one run.
#[derive(Debug, Default)]
pub struct Walker {
  marks: HashMap<String, Mark>,
  path: Vec<String>,
}

impl Walker {
  pub fn new() -> Self {
    Self::default()
  }

  /// Current mark of a target (`None` means unvisited).
  pub fn mark(&self, name: &str) -> Option<Mark> {
    self.marks.get(name).copied()
  }

  /// Walk from `name` and return the declared targets reached for the first
  /// time, in build order.
  ///
  /// # Errors
  ///
  /// - `UndefinedTarget` if `name` itself is not declared
  /// - `UndefinedDefaultTarget` if the default target is reached but not declared
  /// - `Cycle` if a target depends on itself, directly or transitively
  pub fn walk(&mut self, config: &BuildConfig, name: &str) -> Result<Vec<String>, GraphError> {
    let mut order = Vec::new();
    let result = self.visit(config, name, &mut order);
    self.path.clear();
    result.map(|()| order)
  }

  /// Walk every requested target in turn, sharing marks between them.
  pub fn walk_all<S: AsRef<str>>(&mut self, config: &BuildConfig, requested: &[S]) -> Result<Vec<String>, GraphError> {
    let mut order = Vec::new();
    for name in requested {
      order.extend(self.walk(config, name.as_ref())?);
    }
    Ok(order)
  }

  fn visit(&mut self, config: &BuildConfig, name: &str, order: &mut Vec<String>) -> Result<(), GraphError> {
    match self.marks.get(name) {
      Some(Mark::Done) => return Ok(()),
      Some(Mark::Visiting) => return Err(self.cycle_to(name)),
      None => {}
    }

    let Some(target) = config.target(name) else {
      if name == DEFAULT_TARGET {
        return Err(GraphError::UndefinedDefaultTarget);
      }
      if self.path.is_empty() {
        return Err(GraphError::UndefinedTarget(name.to_string()));
      }
      trace!(dep = %name, "dependency is not a target, treating as file");
      return Ok(());
    };

    self.marks.insert(name.to_string(), Mark::Visiting);
    self.path.push(name.to_string());

    for dep in &target.deps {
      self.visit(config, dep, order)?;
    }

    self.path.pop();
    self.marks.insert(name.to_string(), Mark::Done);
    order.push(name.to_string());

    Ok(())
  }

  fn cycle_to(&self, name: &str) -> GraphError {
    let start = self.path.iter().position(|n| n == name).unwrap_or(0);
    let mut chain = self.path[start..].to_vec();
    chain.push(name.to_string());
    GraphError::Cycle { chain }
  }
}
