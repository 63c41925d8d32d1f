//! Header patching actions.
//!
//! `load_nvm <file>` backs up a C header to `<header>.bak` and rewrites its
//! `static const char apps[] = "...";` line with the contents of `<file>`,
//! one string literal per non-blank line. `restore_nvm` puts the backup back.
//!
//! Given an apps file:
//!
//! ```text
//! blink
//! say "hi"
//! ```
//!
//! the header line becomes:
//!
//! ```text
//! static const char apps[] = "blink \n" "say \"hi\"";
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use regex::{NoExpand, Regex};
use tracing::{info, warn};

use super::{Action, ActionError};

pub const LOAD_NVM: &str = "load_nvm";
pub const RESTORE_NVM: &str = "restore_nvm";

/// Header patched by the built-in actions, relative to the project root.
pub const DEFAULT_HEADER: &str = "core/kernel/nvm/nvm.h";

const APPS_PATTERN: &str = r#"static const char apps\[\] = ".*";"#;

/// Path of the backup kept next to `header`.
pub fn backup_path(header: &Path) -> PathBuf {
  let mut name = header.as_os_str().to_os_string();
  name.push(".bak");
  PathBuf::from(name)
}

/// Render the apps file as adjacent C string literals.
///
/// Each non-blank line is trimmed, has its `"` escaped and becomes
/// `"line \n"`. The literals are joined by a space, and the last one loses
/// its trailing ` \n`.
pub fn render_apps(content: &str) -> String {
  let literals: Vec<String> = content
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .map(|line| format!("\"{} \\n\"", line.replace('"', "\\\"")))
    .collect();

  let Some(last) = literals.last() else {
    return "\"\"".to_string();
  };

  let mut rendered = literals[..literals.len() - 1].join(" ");
  if !rendered.is_empty() {
    rendered.push(' ');
  }
  rendered.push_str(&last[..last.len() - " \\n\"".len()]);
  rendered.push('"');
  rendered
}

/// Replace every `apps[]` definition in `header` with `rendered`.
///
/// Returns `None` when the header has no such line.
pub fn patch_apps(header: &str, rendered: &str) -> Result<Option<String>, ActionError> {
  let pattern = Regex::new(APPS_PATTERN)?;
  if !pattern.is_match(header) {
    return Ok(None);
  }
  let line = format!("static const char apps[] = {rendered};");
  Ok(Some(pattern.replace_all(header, NoExpand(&line)).into_owned()))
}

/// `load_nvm <file>`: back up the header, then splice `<file>` into it.
#[derive(Debug, Clone)]
pub struct LoadNvm {
  pub header: PathBuf,
}

impl Default for LoadNvm {
  fn default() -> Self {
    Self {
      header: PathBuf::from(DEFAULT_HEADER),
    }
  }
}

impl Action for LoadNvm {
  fn run(&self, args: &str, cwd: &Path) -> Result<(), ActionError> {
    let file = args.split_whitespace().next().ok_or(ActionError::MissingArgument {
      action: LOAD_NVM,
      argument: "an apps file",
    })?;

    let header = cwd.join(&self.header);
    let backup = backup_path(&header);

    let apps =
      fs::read_to_string(cwd.join(file)).map_err(ActionError::io(format!("failed to read apps file {file}")))?;

    fs::copy(&header, &backup).map_err(ActionError::io(format!("failed to back up {}", header.display())))?;
    let original =
      fs::read_to_string(&header).map_err(ActionError::io(format!("failed to read {}", header.display())))?;

    let Some(patched) = patch_apps(&original, &render_apps(&apps))? else {
      warn!(header = %header.display(), "no apps[] definition found, header left unchanged");
      return Ok(());
    };

    fs::write(&header, patched).map_err(ActionError::io(format!("failed to write {}", header.display())))?;
    info!(header = %header.display(), apps = %file, "loaded apps into header");
    Ok(())
  }
}

/// `restore_nvm`: move the backup made by `load_nvm` back over the header.
#[derive(Debug, Clone)]
pub struct RestoreNvm {
  pub header: PathBuf,
}

impl Default for RestoreNvm {
  fn default() -> Self {
    Self {
      header: PathBuf::from(DEFAULT_HEADER),
    }
  }
}

impl Action for RestoreNvm {
  fn run(&self, _args: &str, cwd: &Path) -> Result<(), ActionError> {
    let header = cwd.join(&self.header);
    let backup = backup_path(&header);

    if !backup.exists() {
      return Err(ActionError::BackupNotFound(backup));
    }

    fs::rename(&backup, &header).map_err(ActionError::io(format!("failed to restore {}", header.display())))?;
    info!(header = %header.display(), "restored header from backup");
    Ok(())
  }
}
