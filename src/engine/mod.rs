//! Page-by-page sync engine
//!
//! Drives one stream through its pages: build the request parameters from
//! the extraction window and the parent context, fetch through the retrying
//! client, extract and normalize records, yield them to the sink in server
//! order, and advance the page token until the server returns a short page.
//!
//! The page token is server-opaque only in spirit; this API numbers pages
//! from 1 and signals "maybe more" by returning exactly `limit` records.
//! A full final page therefore costs one extra empty fetch. That is the
//! documented contract of the endpoint family and the engine preserves it.

mod types;

pub use types::{SyncReport, SyncStats};

use crate::cancel::CancelToken;
use crate::config::TapConfig;
use crate::cursor::{self, SyncWindow, END_DATE_PARAM};
use crate::error::{Error, Result};
use crate::http::RestClient;
use crate::normalize::normalize;
use crate::sink::{Message, RecordSink};
use crate::stream::StreamDescriptor;
use crate::types::{JsonObject, JsonValue};
use chrono::{DateTime, Utc};
use tracing::{debug, info};


/// Query parameter carrying the page size
const LIMIT_PARAM: &str = "limit";

/// Query parameter carrying the page token
const PAGE_PARAM: &str = "page";

/// Sync engine for one configured tap
#[derive(Debug)]
pub struct SyncEngine<'a> {
    client: &'a RestClient,
    config: &'a TapConfig,
}

impl<'a> SyncEngine<'a> {
    /// Create an engine over a shared client and configuration
    pub fn new(client: &'a RestClient, config: &'a TapConfig) -> Self {
        Self { client, config }
    }

    /// Sync one stream to completion.
    ///
    /// Fetches every page, yields each normalized record to the sink, and
    /// returns the updated bookmark plus the contexts for child streams.
    /// Cancellation is observed at the top of every page iteration (and at
    /// the client's sleeps); a cancelled sync returns `Error::Cancelled`
    /// without reporting a bookmark.
    pub async fn sync_stream(
        &self,
        stream: &StreamDescriptor,
        context: Option<&JsonObject>,
        prior_bookmark: Option<&str>,
        sink: &mut (dyn RecordSink + '_),
        cancel: &CancelToken,
    ) -> Result<SyncReport> {
        let window = cursor::resolve_window(self.config, prior_bookmark);
        let path = stream.render_path(context)?;
        let context_params = stream.context_query(context)?;

        let mut report = SyncReport::default();
        let mut bookmark = prior_bookmark.and_then(parse_bookmark);
        let mut token: Option<u64> = None;

        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let params = self.page_params(stream, &window, &context_params, token);
            let response = self.client.get(&path, &params, cancel).await?;
            let body: JsonValue = response.json().await?;

            let mut records = stream.extract_records(&body)?;
            let record_count = records.len();
            report.stats.pages += 1;
            debug!(
                stream = %stream.name,
                page = token.unwrap_or(1),
                records = record_count,
                "fetched page"
            );

            for record in &mut records {
                normalize(record, &stream.schema);
                if let Some(key) = &stream.replication_key {
                    advance_bookmark(&mut bookmark, record.get(key));
                }
                if let Some(child) = stream.child_context_for(record) {
                    report.child_contexts.push(child);
                }
                sink.emit(Message::record(&stream.name, record.clone()))
                    .await?;
                report.stats.records += 1;
            }

            match next_page_token(token, record_count, stream.page_size) {
                Some(next) => token = Some(advance_token(token, next)?),
                None => break,
            }
        }

        if stream.is_incremental() {
            if let Some((_, raw)) = &bookmark {
                sink.emit(Message::bookmark(&stream.name, raw.clone())).await?;
                report.bookmark = Some(raw.clone());
            }
        }

        info!(
            stream = %stream.name,
            pages = report.stats.pages,
            records = report.stats.records,
            bookmark = report.bookmark.as_deref().unwrap_or("-"),
            "stream sync complete"
        );
        Ok(report)
    }

    /// Build the query parameters for one page request
    fn page_params(
        &self,
        stream: &StreamDescriptor,
        window: &SyncWindow,
        context_params: &[(String, String)],
        token: Option<u64>,
    ) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = Vec::with_capacity(context_params.len() + 4);
        params.push((LIMIT_PARAM.to_string(), stream.page_size.to_string()));
        if let Some(token) = token {
            params.push((PAGE_PARAM.to_string(), token.to_string()));
        }
        if stream.is_incremental() {
            if let (Some(param), Some(start)) = (&stream.replication_filter_param, window.start) {
                params.push((param.clone(), cursor::format_timestamp(start)));
            }
        }
        if let Some(end) = window.end {
            params.push((END_DATE_PARAM.to_string(), cursor::format_timestamp(end)));
        }
        params.extend(context_params.iter().cloned());
        params
    }
}

/// Compute the next page token. A page holding exactly `page_size` records
/// means the server may have more; anything shorter ends the stream. The
/// first page counts as token 1.
fn next_page_token(token: Option<u64>, record_count: usize, page_size: usize) -> Option<u64> {
    if record_count == page_size {
        Some(token.unwrap_or(1) + 1)
    } else {
        None
    }
}

/// Guard against a token sequence that stops advancing
fn advance_token(prior: Option<u64>, next: u64) -> Result<u64> {
    if prior == Some(next) {
        return Err(Error::PaginationLoop { token: next });
    }
    Ok(next)
}

/// Parse a bookmark candidate, keeping its textual form for emission
fn parse_bookmark(raw: &str) -> Option<(DateTime<Utc>, String)> {
    cursor::parse_timestamp(raw).map(|dt| (dt, raw.to_string()))
}

/// Advance the running bookmark if the record carries a later value.
/// Unparsable or missing values never move the bookmark.
fn advance_bookmark(bookmark: &mut Option<(DateTime<Utc>, String)>, value: Option<&JsonValue>) {
    let Some(raw) = value.and_then(JsonValue::as_str) else {
        return;
    };
    let Some(candidate) = parse_bookmark(raw) else {
        return;
    };
    match bookmark {
        Some((current, _)) if *current >= candidate.0 => {}
        _ => *bookmark = Some(candidate),
    }
}
