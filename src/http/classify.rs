//! Backoff classification
//!
//! Pure decision function mapping a transport outcome (HTTP status or
//! request error) to a retry classification. Sleeping is the caller's
//! responsibility, which keeps this independently testable.

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::time::Duration;

/// Wait applied when a 429 carries no usable retry-after timestamp
pub const RATE_LIMIT_FALLBACK: Duration = Duration::from_secs(60);

/// Minimum wait for a rate-limited retry
const RATE_LIMIT_FLOOR: Duration = Duration::from_secs(1);

/// How a transport outcome should be handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Abort the sync; the request must not be retried
    Fatal {
        /// HTTP status that caused the failure
        status: u16,
        /// Short human-readable reason
        reason: String,
    },
    /// Retry on the exponential backoff schedule
    Retriable {
        /// Short human-readable reason
        reason: String,
    },
    /// Retry after exactly this wait
    RateLimited {
        /// Classifier-recommended wait
        wait: Duration,
    },
}

/// Retry policy applied by the client around the classifier
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Hard cap on total attempts per request
    pub max_attempts: u32,
    /// Base interval of the exponential schedule
    pub base_backoff: Duration,
    /// Multiplicative factor of the exponential schedule
    pub backoff_factor: u32,
    /// Upper bound on any single backoff sleep
    pub max_backoff: Duration,
    /// Statuses outside 5xx/429 that are still retried. Some endpoints
    /// return transient 404s.
    pub extra_retriable: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_backoff: Duration::from_secs(1),
            backoff_factor: 3,
            max_backoff: Duration::from_secs(120),
            extra_retriable: Vec::new(),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay for the given zero-based attempt number
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = self.backoff_factor.saturating_pow(attempt);
        std::cmp::min(self.base_backoff.saturating_mul(factor), self.max_backoff)
    }
}

/// Classify an HTTP response status.
///
/// `now` is passed in so the retry-after computation stays deterministic
/// under test.
pub fn classify_status(
    status: StatusCode,
    headers: &HeaderMap,
    now: DateTime<Utc>,
    policy: &RetryPolicy,
) -> Classification {
    let code = status.as_u16();

    if code == 429 {
        return Classification::RateLimited {
            wait: retry_after_wait(headers, now),
        };
    }

    if status.is_server_error() || policy.extra_retriable.contains(&code) {
        return Classification::Retriable {
            reason: format!("HTTP {code}"),
        };
    }

    if status.is_client_error() {
        return Classification::Fatal {
            status: code,
            reason: status
                .canonical_reason()
                .unwrap_or("client error")
                .to_string(),
        };
    }

    // Non-success, non-4xx/5xx statuses (unexpected redirects and the like)
    // are treated as transient.
    Classification::Retriable {
        reason: format!("unexpected HTTP {code}"),
    }
}

/// Classify a transport-level request failure. Connection resets, timeouts,
/// and malformed responses are always retriable.
pub fn classify_transport(err: &reqwest::Error) -> Classification {
    Classification::Retriable {
        reason: err.to_string(),
    }
}

/// Compute the wait for a rate-limited response.
///
/// The retry-after header is expected to carry an absolute timestamp (epoch
/// seconds or an HTTP-date); the wait is `max(1s, timestamp - now)`. A
/// missing or unparsable header falls back to a fixed 60s.
fn retry_after_wait(headers: &HeaderMap, now: DateTime<Utc>) -> Duration {
    let Some(raw) = headers.get("retry-after").and_then(|v| v.to_str().ok()) else {
        return RATE_LIMIT_FALLBACK;
    };

    match parse_absolute(raw) {
        Some(at) => {
            let seconds = (at - now).num_seconds().max(1) as u64;
            std::cmp::max(Duration::from_secs(seconds), RATE_LIMIT_FLOOR)
        }
        None => RATE_LIMIT_FALLBACK,
    }
}

/// Parse a retry-after value as an absolute timestamp
fn parse_absolute(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(epoch) = raw.parse::<i64>() {
        return DateTime::from_timestamp(epoch, 0);
    }
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers_with_retry_after(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_429_with_absolute_epoch_uses_header_wait() {
        let now = Utc::now();
        let headers = headers_with_retry_after(&(now.timestamp() + 5).to_string());

        let classification = classify_status(
            StatusCode::TOO_MANY_REQUESTS,
            &headers,
            now,
            &RetryPolicy::default(),
        );

        match classification {
            Classification::RateLimited { wait } => {
                assert!(wait >= Duration::from_secs(5));
                assert!(wait < Duration::from_secs(60));
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[test]
    fn test_429_with_http_date() {
        let now = Utc::now();
        let at = now + chrono::Duration::seconds(30);
        let headers = headers_with_retry_after(&at.to_rfc2822());

        let classification = classify_status(
            StatusCode::TOO_MANY_REQUESTS,
            &headers,
            now,
            &RetryPolicy::default(),
        );
        match classification {
            Classification::RateLimited { wait } => {
                assert!(wait >= Duration::from_secs(28) && wait <= Duration::from_secs(31));
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[test]
    fn test_429_without_header_falls_back_to_60s() {
        let classification = classify_status(
            StatusCode::TOO_MANY_REQUESTS,
            &HeaderMap::new(),
            Utc::now(),
            &RetryPolicy::default(),
        );
        assert_eq!(
            classification,
            Classification::RateLimited {
                wait: RATE_LIMIT_FALLBACK
            }
        );
    }

    #[test]
    fn test_429_with_garbage_header_falls_back_to_60s() {
        let classification = classify_status(
            StatusCode::TOO_MANY_REQUESTS,
            &headers_with_retry_after("soon"),
            Utc::now(),
            &RetryPolicy::default(),
        );
        assert_eq!(
            classification,
            Classification::RateLimited {
                wait: RATE_LIMIT_FALLBACK
            }
        );
    }

    #[test]
    fn test_429_with_past_timestamp_waits_at_least_one_second() {
        let now = Utc::now();
        let headers = headers_with_retry_after(&(now.timestamp() - 100).to_string());

        let classification = classify_status(
            StatusCode::TOO_MANY_REQUESTS,
            &headers,
            now,
            &RetryPolicy::default(),
        );
        assert_eq!(
            classification,
            Classification::RateLimited {
                wait: Duration::from_secs(1)
            }
        );
    }

    #[test]
    fn test_5xx_is_retriable() {
        for code in [500u16, 502, 503, 504] {
            let classification = classify_status(
                StatusCode::from_u16(code).unwrap(),
                &HeaderMap::new(),
                Utc::now(),
                &RetryPolicy::default(),
            );
            assert!(
                matches!(classification, Classification::Retriable { .. }),
                "expected {code} to be retriable"
            );
        }
    }

    #[test]
    fn test_4xx_is_fatal() {
        for code in [400u16, 401, 403, 404, 422] {
            let classification = classify_status(
                StatusCode::from_u16(code).unwrap(),
                &HeaderMap::new(),
                Utc::now(),
                &RetryPolicy::default(),
            );
            assert!(
                matches!(classification, Classification::Fatal { .. }),
                "expected {code} to be fatal"
            );
        }
    }

    #[test]
    fn test_extra_retriable_overrides_fatal() {
        let policy = RetryPolicy {
            extra_retriable: vec![404],
            ..RetryPolicy::default()
        };
        let classification = classify_status(
            StatusCode::NOT_FOUND,
            &HeaderMap::new(),
            Utc::now(),
            &policy,
        );
        assert!(matches!(classification, Classification::Retriable { .. }));
    }

    #[test]
    fn test_backoff_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(0), Duration::from_secs(1));
        assert_eq!(policy.backoff_delay(1), Duration::from_secs(3));
        assert_eq!(policy.backoff_delay(2), Duration::from_secs(9));
        assert_eq!(policy.backoff_delay(3), Duration::from_secs(27));
        // Capped at max_backoff.
        assert_eq!(policy.backoff_delay(8), policy.max_backoff);
    }
}
