//! Record sinks
//!
//! The engine yields normalized records lazily to a [`RecordSink`], plus
//! the updated bookmark at sync end. Downstream serialization is out of
//! scope; the bundled JSONL sink writes one message per line for piping
//! into whatever comes next.

use crate::error::Result;
use crate::types::JsonValue;
use async_trait::async_trait;
use serde::Serialize;
use std::io::Write;

/// A message emitted during sync
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Message {
    /// One normalized record
    Record {
        /// Stream name
        stream: String,
        /// The normalized record
        record: JsonValue,
    },
    /// Updated bookmark, emitted once per completed incremental sync
    Bookmark {
        /// Stream name
        stream: String,
        /// New bookmark value
        value: String,
    },
}

impl Message {
    /// Create a record message
    pub fn record(stream: impl Into<String>, record: JsonValue) -> Self {
        Self::Record {
            stream: stream.into(),
            record,
        }
    }

    /// Create a bookmark message
    pub fn bookmark(stream: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Bookmark {
            stream: stream.into(),
            value: value.into(),
        }
    }
}

/// Receiver for the lazily produced record sequence
#[async_trait]
pub trait RecordSink: Send {
    /// Handle one message, in the order the engine produced it
    async fn emit(&mut self, message: Message) -> Result<()>;
}

/// Sink writing one JSON message per line
pub struct JsonlSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonlSink<W> {
    /// Create a sink over any writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl JsonlSink<std::io::Stdout> {
    /// Create a sink writing to stdout
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

#[async_trait]
impl<W: Write + Send> RecordSink for JsonlSink<W> {
    async fn emit(&mut self, message: Message) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &message)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Sink that drops every message.
///
/// Used when a stream runs only to collect child contexts and its own
/// records are not wanted downstream.
#[derive(Debug, Default)]
pub struct DiscardSink;

#[async_trait]
impl RecordSink for DiscardSink {
    async fn emit(&mut self, _message: Message) -> Result<()> {
        Ok(())
    }
}

/// In-memory sink for tests and embedding
#[derive(Debug, Default)]
pub struct CollectingSink {
    /// Messages in emission order
    pub messages: Vec<Message>,
}

impl CollectingSink {
    /// Create an empty collecting sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Records emitted for the given stream
    pub fn records(&self, stream: &str) -> Vec<&JsonValue> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::Record {
                    stream: s, record, ..
                } if s == stream => Some(record),
                _ => None,
            })
            .collect()
    }

    /// Bookmark emitted for the given stream, if any
    pub fn bookmark(&self, stream: &str) -> Option<&str> {
        self.messages.iter().rev().find_map(|m| match m {
            Message::Bookmark { stream: s, value } if s == stream => Some(value.as_str()),
            _ => None,
        })
    }
}

#[async_trait]
impl RecordSink for CollectingSink {
    async fn emit(&mut self, message: Message) -> Result<()> {
        self.messages.push(message);
        Ok(())
    }
}
