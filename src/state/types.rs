//! State types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs. Only
//! structurally complete progress markers are representable: per-stream
//! state carries the bookmark and nothing else, so in-flight pagination
//! state can never leak into a state file.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Complete saved state for a tap
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct State {
    /// Per-stream state
    #[serde(default)]
    pub streams: HashMap<String, StreamState>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get state for a stream
    pub fn get_stream(&self, stream: &str) -> Option<&StreamState> {
        self.streams.get(stream)
    }

    /// Get mutable state for a stream, creating if needed
    pub fn get_stream_mut(&mut self, stream: &str) -> &mut StreamState {
        self.streams.entry(stream.to_string()).or_default()
    }

    /// Get the bookmark for a stream
    pub fn bookmark(&self, stream: &str) -> Option<&str> {
        self.streams.get(stream)?.bookmark.as_deref()
    }

    /// Set the bookmark for a stream
    pub fn set_bookmark(&mut self, stream: &str, bookmark: String) {
        self.get_stream_mut(stream).bookmark = Some(bookmark);
    }
}

/// State for a single stream
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamState {
    /// Last incremental field value observed in a completed sync
    #[serde(default)]
    pub bookmark: Option<String>,
}

impl StreamState {
    /// Create a new empty stream state
    pub fn new() -> Self {
        Self::default()
    }
}
