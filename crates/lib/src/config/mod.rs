//! Build file model and loader.
//!
//! A build file is a YAML document with two top-level sections, `variables`
//! and `targets`. It is read once per run and never modified afterwards.

mod load;
mod types;

pub use load::{ConfigError, load, parse};
pub use types::*;
