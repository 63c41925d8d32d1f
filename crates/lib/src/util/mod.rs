//! Shared utilities.
//!
//! Test helpers for filesystem fixtures and shell commands.

#[cfg(test)]
pub mod testutil;
