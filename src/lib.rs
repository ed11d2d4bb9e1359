// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Lightspeed eCom tap
//!
//! Incremental stream extraction for the Lightspeed eCom REST API.
//!
//! ## Features
//!
//! - **Page-numbered extraction**: generic engine over data-driven stream
//!   descriptors, parents fanning out contexts to child streams
//! - **Incremental sync**: bookmark-driven extraction windows, state
//!   persisted only after a stream completes
//! - **Resilient transport**: throttling, classification-driven retry with
//!   exponential backoff, `Retry-After` aware rate-limit handling
//! - **Value normalization**: schema-directed cleanup of the API's loose
//!   typing before records are emitted
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lightspeed_tap::cancel::CancelToken;
//! use lightspeed_tap::config::TapConfig;
//! use lightspeed_tap::engine::SyncEngine;
//! use lightspeed_tap::http::{RestClient, RestClientConfig};
//! use lightspeed_tap::sink::JsonlSink;
//! use lightspeed_tap::{streams, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = TapConfig::from_file("config.json")?;
//!     let client = RestClient::new(RestClientConfig::from_tap_config(&config))?;
//!     let engine = SyncEngine::new(&client, &config);
//!
//!     let orders = streams::find("orders").unwrap();
//!     let mut sink = JsonlSink::stdout();
//!     let report = engine
//!         .sync_stream(orders, None, None, &mut sink, &CancelToken::none())
//!         .await?;
//!     println!("new bookmark: {:?}", report.bookmark);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the tap
pub mod error;

/// Common types and type aliases
pub mod types;

/// Cooperative cancellation
pub mod cancel;

/// Tap configuration
pub mod config;

/// Extraction window resolution
pub mod cursor;

/// HTTP client with retry and rate limiting
pub mod http;

/// Declared value-type schemas
pub mod schema;

/// Schema-directed value normalization
pub mod normalize;

/// Stream descriptors
pub mod stream;

/// The Lightspeed stream catalog
pub mod streams;

/// Main sync engine
pub mod engine;

/// Record sinks
pub mod sink;

/// State management and bookmarks
pub mod state;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
