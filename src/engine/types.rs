//! Engine result types

use crate::types::JsonObject;

/// Counters accumulated over one stream sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Pages fetched
    pub pages: u64,
    /// Records emitted
    pub records: u64,
}

/// Outcome of one completed stream sync
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Maximum observed replication-key value, the new bookmark
    pub bookmark: Option<String>,
    /// Contexts to fan out to child streams, one per parent record
    pub child_contexts: Vec<JsonObject>,
    /// Sync counters
    pub stats: SyncStats,
}
