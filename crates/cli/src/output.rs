//! CLI output formatting.
//!
//! Build progress goes to stdout, failures to stderr. Colors are applied only
//! when the stream supports them.

use std::time::Duration;

use owo_colors::{OwoColorize, Stream};

use chorus_lib::execute::{BuildEvent, CommandKind, Reporter};

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const RUNNING: &str = "⌛";
  pub const TARGET: &str = "●";
  pub const INFO: &str = "ⓘ";
}

const BANNER: &str = r"
   ____ _   _  ___  ____  _   _ ____
  / ___| | | |/ _ \|  _ \| | | / ___|
 | |   | |_| | | | | |_) | | | \___ \
 | |___|  _  | |_| |  _ <| |_| |___) |
  \____|_| |_|\___/|_| \_\\___/|____/
";

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    format!("{}m {}s", secs / 60, secs % 60)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

pub fn print_banner() {
  println!("{}", BANNER.if_supports_color(Stream::Stdout, |s| s.cyan()));
}

pub fn print_failed(message: &str) {
  eprintln!();
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    "BUILD FAILED!".if_supports_color(Stream::Stderr, |s| s.red())
  );
  eprintln!("  {message}");
}

pub fn print_cancelled() {
  eprintln!();
  eprintln!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stderr, |s| s.yellow()),
    "Build cancelled!".if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

/// Renders build events to the terminal.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
  fn report(&mut self, event: BuildEvent) {
    match event {
      BuildEvent::TargetStarted { target, reason } => {
        println!();
        println!(
          "{} Processing target: {} {}",
          symbols::TARGET.if_supports_color(Stream::Stdout, |s| s.blue()),
          target.if_supports_color(Stream::Stdout, |s| s.bold()),
          format!("({reason})").if_supports_color(Stream::Stdout, |s| s.dimmed())
        );
      }
      BuildEvent::TargetSkipped { target } => {
        println!(
          "{} Skipping {} (already up-to-date)",
          symbols::INFO.if_supports_color(Stream::Stdout, |s| s.dimmed()),
          target
        );
      }
      BuildEvent::TargetFinished { target } => {
        println!(
          "{} Target {} completed successfully!",
          symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
          target
        );
      }
      BuildEvent::CommandStarted { command, kind, .. } => {
        println!(
          "  {} {}",
          symbols::RUNNING,
          label(&command, kind).if_supports_color(Stream::Stdout, |s| s.dimmed())
        );
      }
      BuildEvent::CommandSucceeded {
        command, kind, elapsed, ..
      } => {
        println!(
          "  {} {} {} ({})",
          symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
          label(&command, kind),
          "[OK]".if_supports_color(Stream::Stdout, |s| s.green()),
          format_duration(elapsed)
        );
      }
      BuildEvent::CommandFailed {
        command, kind, elapsed, ..
      } => {
        println!(
          "  {} {} {} ({})",
          symbols::ERROR.if_supports_color(Stream::Stdout, |s| s.red()),
          label(&command, kind),
          "[FAIL]".if_supports_color(Stream::Stdout, |s| s.red()),
          format_duration(elapsed)
        );
      }
      BuildEvent::RunFinished { elapsed } => {
        println!();
        println!(
          "{} {} ({})",
          symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
          "Build completed successfully!".if_supports_color(Stream::Stdout, |s| s.green()),
          format_duration(elapsed)
        );
      }
    }
  }
}

fn label(command: &str, kind: CommandKind) -> String {
  match kind {
    CommandKind::Shell => command.to_string(),
    CommandKind::Internal => format!("internal: {command}"),
  }
}
