//! CLI module
//!
//! Command-line interface for running the tap.
//!
//! # Commands
//!
//! - `sync` - Extract data from streams
//! - `streams` - List stream names

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
