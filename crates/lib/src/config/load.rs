//! Reading and finalizing a build file.
//!
//! Loading does three things after parsing:
//! 1. Injects `DATE` (the local date at process start, `YYYY-MM-DD`)
//! 2. Chains variables: each value is expanded against the variables declared
//!    before it, so values are plain strings by the time commands are expanded
//! 3. Leaves targets untouched
//!
//! Validation of `internal:` commands needs the action registry and lives in
//! [`crate::dispatch::Dispatcher::validate`].

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::consts::{DATE_FORMAT, DATE_VARIABLE};
use crate::expand::{UserVariables, substitute};

use super::types::{BuildConfig, Variables};

/// Errors that can occur while loading a build file.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read build file {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse build file {}: {source}", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },

  #[error("target `{target}` uses unknown internal command `{action}`")]
  UnknownAction { target: String, action: String },
}

/// Load and finalize the build file at `path`, stamping `DATE` with today's date.
pub fn load(path: &Path) -> Result<BuildConfig, ConfigError> {
  let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
    path: path.to_path_buf(),
    source,
  })?;

  let today = chrono::Local::now().format(DATE_FORMAT).to_string();

  let config = parse(&content, &today).map_err(|source| ConfigError::Parse {
    path: path.to_path_buf(),
    source,
  })?;

  debug!(
    path = %path.display(),
    variables = config.variables.len(),
    targets = config.targets.len(),
    "loaded build file"
  );

  Ok(config)
}

/// Parse build file content and finalize its variables with the given `date`.
pub fn parse(content: &str, date: &str) -> Result<BuildConfig, serde_yaml::Error> {
  let mut config: BuildConfig = serde_yaml::from_str(content)?;
  config.variables = chain_variables(std::mem::take(&mut config.variables), date);
  Ok(config)
}

fn chain_variables(declared: Variables, date: &str) -> Variables {
  let mut chained = Variables::with_capacity(declared.len() + 1);
  chained.insert(DATE_VARIABLE.to_string(), date.to_string());

  for (name, value) in declared {
    if name == DATE_VARIABLE {
      warn!(variable = DATE_VARIABLE, "build file sets a reserved variable; the current date is used instead");
      continue;
    }
    let value = substitute(&value, &UserVariables(&chained));
    chained.insert(name, value);
  }

  // DATE goes last so user variables keep their declared positions.
  if let Some(date) = chained.shift_remove(DATE_VARIABLE) {
    chained.insert(DATE_VARIABLE.to_string(), date);
  }

  chained
}
