//! Names and defaults shared across the crate.

/// Build file read from the working directory.
pub const CONFIG_FILENAME: &str = "chorus.build";

/// Target built when no target is requested. Always stale.
pub const DEFAULT_TARGET: &str = "all";

/// Targets whose name starts with this are always rebuilt.
pub const ALWAYS_STALE_PREFIX: char = '_';

/// Commands starting with this are routed to an in-process action.
pub const INTERNAL_PREFIX: &str = "internal:";

/// Variable injected by the loader with the date at process start.
pub const DATE_VARIABLE: &str = "DATE";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "CHORUS_LOG";

/// Environment variable overriding the shell used to run commands.
pub const SHELL_ENV: &str = "CHORUS_SHELL";
