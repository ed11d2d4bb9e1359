//! REST client with throttling and retry
//!
//! Wraps reqwest with basic-auth credentials, an inter-request throttle to
//! stay under the API's shared per-account rate limit, and the retry policy
//! built on the backoff classifier. One request is in flight at a time per
//! client; the throttle and backoff sleeps are the only suspension points
//! and both observe cancellation.

use super::classify::{classify_status, classify_transport, Classification, RetryPolicy};
use crate::cancel::CancelToken;
use crate::config::TapConfig;
use crate::error::{Error, Result};
use crate::types::OptionStringExt;
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, Response};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, warn};

type Throttle = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Configuration for the REST client
#[derive(Debug, Clone)]
pub struct RestClientConfig {
    /// Base URL including the language path segment
    pub base_url: String,
    /// Basic auth username
    pub api_key: String,
    /// Basic auth password
    pub api_secret: String,
    /// Optional custom User-Agent
    pub user_agent: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Seconds between page requests (0 disables throttling)
    pub throttle_seconds: f64,
    /// Retry policy
    pub retry: RetryPolicy,
}

impl RestClientConfig {
    /// Derive client configuration from the tap configuration
    pub fn from_tap_config(config: &TapConfig) -> Self {
        Self {
            base_url: config.url_base(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            user_agent: config.user_agent.clone().none_if_empty(),
            timeout: Duration::from_secs(30),
            throttle_seconds: config.throttle_seconds,
            retry: RetryPolicy::default(),
        }
    }
}

/// REST client shared by all streams of a sync
pub struct RestClient {
    client: Client,
    config: RestClientConfig,
    throttle: Option<Throttle>,
}

impl RestClient {
    /// Create a new client from configuration
    pub fn new(config: RestClientConfig) -> Result<Self> {
        let mut builder = Client::builder().timeout(config.timeout);
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        } else {
            builder = builder.user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ));
        }
        let client = builder.build()?;

        let throttle = Duration::try_from_secs_f64(config.throttle_seconds)
            .ok()
            .filter(|d| !d.is_zero())
            .and_then(Quota::with_period)
            .map(|quota| RateLimiter::direct(quota.allow_burst(NonZeroU32::MIN)));

        Ok(Self {
            client,
            config,
            throttle,
        })
    }

    /// Retry policy in effect
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.config.retry
    }

    /// Fetch a page, retrying per the backoff classifier.
    ///
    /// Retriable and rate-limited outcomes are recovered transparently, up
    /// to the policy's attempt budget; a rate-limited retry sleeps the
    /// classifier-provided wait but consumes an attempt from the same
    /// budget. Fatal outcomes propagate, as does budget exhaustion: as
    /// [`Error::RateLimited`] carrying the wait hint when the final attempt
    /// hit a rate limit, [`Error::RetryBudgetExhausted`] otherwise.
    pub async fn get(
        &self,
        path: &str,
        query: &[(String, String)],
        cancel: &CancelToken,
    ) -> Result<Response> {
        let url = self.build_url(path);
        let max_attempts = self.config.retry.max_attempts;
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            // Inter-request throttle; suspension point.
            if let Some(limiter) = &self.throttle {
                tokio::select! {
                    () = limiter.until_ready() => {}
                    () = cancel.cancelled() => return Err(Error::Cancelled),
                }
            }

            attempt += 1;
            let request = self
                .client
                .get(&url)
                .query(query)
                .basic_auth(&self.config.api_key, Some(&self.config.api_secret));

            let classification = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        debug!(%url, attempt, "request succeeded");
                        return Ok(response);
                    }
                    let classification = classify_status(
                        status,
                        response.headers(),
                        chrono::Utc::now(),
                        &self.config.retry,
                    );
                    if let Classification::Fatal { status, .. } = classification {
                        let body = response.text().await.unwrap_or_default();
                        return Err(Error::http_status(status, body));
                    }
                    classification
                }
                Err(e) => classify_transport(&e),
            };

            if attempt >= max_attempts {
                warn!(%url, attempts = max_attempts, "retry budget exhausted");
                return Err(match &classification {
                    Classification::RateLimited { wait } => Error::RateLimited {
                        retry_after_seconds: wait.as_secs(),
                    },
                    _ => Error::RetryBudgetExhausted {
                        attempts: max_attempts,
                    },
                });
            }

            let delay = match &classification {
                Classification::RateLimited { wait } => {
                    warn!(%url, attempt, wait_secs = wait.as_secs(), "rate limited, waiting");
                    *wait
                }
                Classification::Retriable { reason } => {
                    let delay = self.config.retry.backoff_delay(attempt - 1);
                    warn!(%url, attempt, %reason, delay_ms = delay.as_millis() as u64, "retrying");
                    delay
                }
                Classification::Fatal { .. } => unreachable!("fatal outcomes return above"),
            };

            // Backoff sleep; suspension point.
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = cancel.cancelled() => return Err(Error::Cancelled),
            }
        }
    }

    /// Build the full URL from a stream path
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.config.base_url)
            .field("throttle_seconds", &self.config.throttle_seconds)
            .finish_non_exhaustive()
    }
}
