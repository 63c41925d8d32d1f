mod cmd;
mod output;

use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use clap::error::ErrorKind;
use tracing_subscriber::EnvFilter;

use chorus_lib::consts::LOG_ENV;
use chorus_lib::execute::BuildError;

/// chorus - declarative build orchestrator
#[derive(Parser)]
#[command(name = "chorus")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Targets to build, in order (default: all)
  #[arg(allow_hyphen_values = true, trailing_var_arg = true)]
  targets: Vec<String>,
}

fn main() -> ExitCode {
  let start = Instant::now();

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
    .without_time()
    .with_writer(std::io::stderr)
    .init();

  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => err.exit(),
    Err(err) => {
      let _ = err.print();
      return ExitCode::FAILURE;
    }
  };

  output::print_banner();

  match cmd::cmd_build(&cli.targets, start) {
    Ok(_) => ExitCode::SUCCESS,
    Err(err) => {
      if err.downcast_ref::<BuildError>().is_some_and(BuildError::is_interrupt) {
        output::print_cancelled();
      } else {
        output::print_failed(&err.to_string());
      }
      ExitCode::FAILURE
    }
  }
}
