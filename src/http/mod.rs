//! HTTP layer
//!
//! REST client with throttling, retry, and the pure backoff classifier
//! that drives retry decisions.

mod classify;
mod client;

pub use classify::{classify_status, classify_transport, Classification, RetryPolicy};
pub use client::{RestClient, RestClientConfig};
