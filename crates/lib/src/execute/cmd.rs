//! Shell command execution.
//!
//! Commands run through the platform shell in the project root, with the
//! parent's environment and stdio, so compiler output reaches the terminal as
//! it is produced.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::execute::interrupt::Interrupt;
use crate::execute::types::ExecuteError;

/// Run `cmd` through the shell in `cwd` and wait for it.
///
/// If `interrupt` fires while the command runs, the child is killed and
/// [`ExecuteError::Interrupted`] is returned. A command that fails because
/// the terminal's Ctrl-C reached it first is reported as interrupted too.
pub async fn execute_cmd(
  cmd: &str,
  cwd: &Path,
  shell: Option<&str>,
  interrupt: &mut Interrupt,
) -> Result<(), ExecuteError> {
  info!(cmd = %cmd, "executing command");

  let (shell_cmd, shell_args) = get_shell(shell);

  let mut command = Command::new(&shell_cmd);
  command
    .args(&shell_args)
    .arg(cmd)
    .current_dir(cwd)
    .stdin(Stdio::inherit())
    .stdout(Stdio::inherit())
    .stderr(Stdio::inherit())
    .kill_on_drop(true);

  debug!(shell = %shell_cmd, cwd = %cwd.display(), "spawning process");

  let mut child = command.spawn().map_err(|source| ExecuteError::Spawn {
    cmd: cmd.to_string(),
    source,
  })?;

  let status = tokio::select! {
    biased;
    () = interrupt.triggered() => {
      warn!(cmd = %cmd, "stopping command");
      if let Err(e) = child.kill().await {
        debug!(error = %e, "failed to kill command");
      }
      return Err(ExecuteError::Interrupted { cmd: cmd.to_string() });
    }
    status = child.wait() => status.map_err(|source| ExecuteError::Spawn {
      cmd: cmd.to_string(),
      source,
    })?,
  };

  if !status.success() {
    // Ctrl-C reaches the child and us together; let the listener catch up.
    if interrupt.check().await {
      return Err(ExecuteError::Interrupted { cmd: cmd.to_string() });
    }
    return Err(ExecuteError::CmdFailed {
      cmd: cmd.to_string(),
      code: status.code(),
    });
  }

  Ok(())
}

/// Shell program and the arguments placed before the command text.
///
/// Without an override this is `/bin/sh -c` on Unix and PowerShell on
/// Windows. An override picks its flag from the program name.
pub(crate) fn get_shell(override_shell: Option<&str>) -> (String, Vec<String>) {
  if let Some(shell) = override_shell {
    let args = if shell.contains("powershell") || shell.contains("pwsh") {
      powershell_args()
    } else if shell.contains("cmd") {
      vec!["/C".to_string()]
    } else {
      vec!["-c".to_string()]
    };
    return (shell.to_string(), args);
  }

  #[cfg(unix)]
  {
    ("/bin/sh".to_string(), vec!["-c".to_string()])
  }

  #[cfg(windows)]
  {
    ("powershell.exe".to_string(), powershell_args())
  }
}

fn powershell_args() -> Vec<String> {
  ["-NoProfile", "-ExecutionPolicy", "Bypass", "-Command"]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
