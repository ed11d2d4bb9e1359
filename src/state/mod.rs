//! State management module
//!
//! Handles bookmark tracking and resumability. State is persisted between
//! sync runs so incremental streams pick up where they left off.

mod manager;
mod types;

pub use manager::StateManager;
pub use types::{State, StreamState};

#[cfg(test)]
mod manager_tests;
