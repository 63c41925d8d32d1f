//! chorus-lib: target resolution and build orchestration for chorus
//!
//! This crate provides the engine behind the `chorus` binary:
//! - `config`: the build file model (`variables` and `targets`) and its loader
//! - `expand`: `${NAME}` substitution of user and automatic variables
//! - `staleness`: the modification-time rebuild policy
//! - `graph`: the depth-first walk that orders targets and detects cycles
//! - `execute`: the orchestrator and the command pipeline
//! - `dispatch`: in-process actions reached through `internal:` commands

pub mod config;
pub mod consts;
pub mod dispatch;
pub mod execute;
pub mod expand;
pub mod graph;
pub mod staleness;
pub mod util;
