//! Incremental cursor resolution
//!
//! Computes the effective extraction window for a sync from the saved
//! bookmark and the static configuration, and formats the timestamps the
//! API expects.

use crate::config::TapConfig;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;

/// Query parameter carrying the window upper bound
pub const END_DATE_PARAM: &str = "updated_at_max";

/// Textual format for timestamps sent to the API (always UTC)
const API_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Effective extraction window for one sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    /// Lower bound: records changed at or after this instant
    pub start: Option<DateTime<Utc>>,
    /// Upper bound, when configured
    pub end: Option<DateTime<Utc>>,
}

/// Resolve the extraction window from saved state and configuration.
///
/// The lower bound is the saved bookmark when present (it is already
/// advanced past previously emitted records), otherwise the configured
/// `start_date`, otherwise absent. A malformed `end_date` is logged and
/// treated as absent: an upper bound is an optimization, not a correctness
/// requirement.
pub fn resolve_window(config: &TapConfig, prior_bookmark: Option<&str>) -> SyncWindow {
    let start = prior_bookmark
        .and_then(|raw| {
            let parsed = parse_timestamp(raw);
            if parsed.is_none() {
                warn!(bookmark = raw, "unparsable bookmark, falling back to start_date");
            }
            parsed
        })
        .or_else(|| {
            config.start_date.as_deref().and_then(|raw| {
                let parsed = parse_timestamp(raw);
                if parsed.is_none() {
                    warn!(start_date = raw, "unparsable start_date, syncing from the beginning");
                }
                parsed
            })
        });

    let end = config.end_date.as_deref().and_then(|raw| {
        let parsed = parse_timestamp(raw);
        if parsed.is_none() {
            warn!(end_date = raw, "unparsable end_date, ignoring upper bound");
        }
        parsed
    });

    SyncWindow { start, end }
}

/// Format a timestamp in the fixed textual format the API expects
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.format(API_TIMESTAMP_FORMAT).to_string()
}

/// Lenient timestamp parser for bookmarks and configured dates
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}
