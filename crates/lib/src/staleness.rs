//! Rebuild policy.
//!
//! Decides whether a target must be rebuilt by comparing modification times,
//! the way `make` does. Rules are checked in order and the first match wins:
//!
//! 1. `all`, or a name starting with `_`: always stale
//! 2. `phony: true`: always stale
//! 3. no file at the target's path: stale
//! 4. a dependency path that is missing, or modified strictly after the
//!    target: stale
//! 5. otherwise up to date
//!
//! Nothing is cached between checks. Correctness relies on targets being
//! built one at a time, dependencies first, so a dependency's file is in its
//! final state by the time its dependents are checked.

use std::fmt;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use crate::config::Target;
use crate::consts::{ALWAYS_STALE_PREFIX, DEFAULT_TARGET};

/// The outcome of a staleness check, with the rule that decided it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
  /// The default target or an `_`-prefixed name.
  AlwaysStale,
  /// Declared `phony`.
  Phony,
  /// No file exists at the target's path.
  TargetMissing,
  /// A dependency path does not exist (or could not be read).
  DependencyMissing(String),
  /// A dependency was modified after the target.
  DependencyNewer(String),
  /// Nothing to do.
  UpToDate,
}

impl Staleness {
  pub fn is_stale(&self) -> bool {
    !matches!(self, Staleness::UpToDate)
  }
}

impl fmt::Display for Staleness {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Staleness::AlwaysStale => write!(f, "always rebuilt"),
      Staleness::Phony => write!(f, "phony"),
      Staleness::TargetMissing => write!(f, "target file missing"),
      Staleness::DependencyMissing(dep) => write!(f, "dependency `{dep}` missing"),
      Staleness::DependencyNewer(dep) => write!(f, "dependency `{dep}` is newer"),
      Staleness::UpToDate => write!(f, "up to date"),
    }
  }
}

/// Check whether the target `name` must be rebuilt.
///
/// Paths are resolved against `root`. A missing dependency is treated as a
/// reason to rebuild, never as an error.
///
/// # Errors
///
/// Returns an error only when the target's own metadata cannot be read for a
/// reason other than the file not existing.
pub fn check(root: &Path, name: &str, target: &Target) -> io::Result<Staleness> {
  if name == DEFAULT_TARGET || name.starts_with(ALWAYS_STALE_PREFIX) {
    return Ok(Staleness::AlwaysStale);
  }

  if target.phony {
    return Ok(Staleness::Phony);
  }

  let target_time = match modified(&root.join(name)) {
    Ok(time) => time,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Staleness::TargetMissing),
    Err(e) => return Err(e),
  };

  for dep in &target.deps {
    match modified(&root.join(dep)) {
      Ok(dep_time) if dep_time > target_time => return Ok(Staleness::DependencyNewer(dep.clone())),
      Ok(_) => {}
      Err(_) => return Ok(Staleness::DependencyMissing(dep.clone())),
    }
  }

  Ok(Staleness::UpToDate)
}

fn modified(path: &Path) -> io::Result<SystemTime> {
  std::fs::metadata(path)?.modified()
}
