//! Error types for lightspeed-tap
//!
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! The variants mirror the failure taxonomy of the extraction engine:
//! transport failures and rate limits are recovered locally by the retry
//! policy, everything else aborts the current stream's sync.

use thiserror::Error;

/// The main error type for lightspeed-tap
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    /// Invalid or unusable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong with the configuration
        message: String,
    },

    /// A required configuration field is absent or empty
    #[error("Missing required config field: {field}")]
    MissingConfigField {
        /// Name of the missing field
        field: String,
    },

    /// YAML deserialization failed
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON deserialization failed
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    /// Transport-level request failure (retriable)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Fatal HTTP status from the API
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// Response status code
        status: u16,
        /// Response body, for the API's error message
        body: String,
    },

    /// Rate limit hit with no retry budget left
    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited {
        /// Server-advised wait in seconds
        retry_after_seconds: u64,
    },

    /// The per-request retry budget was consumed without success
    #[error("Retry budget of {attempts} attempts exhausted")]
    RetryBudgetExhausted {
        /// Attempts made
        attempts: u32,
    },

    /// A URL failed to parse
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    /// The page token stopped advancing
    #[error("Pagination loop detected: page token {token} is identical to prior token")]
    PaginationLoop {
        /// The repeated token
        token: u64,
    },

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    /// The page body did not match the declared records path
    #[error("Failed to extract records from path '{path}': {message}")]
    RecordExtraction {
        /// Declared records path
        path: String,
        /// What was found instead
        message: String,
    },

    /// A response or schema document could not be decoded
    #[error("Failed to decode response: {message}")]
    Decode {
        /// Decode failure detail
        message: String,
    },

    // ============================================================================
    // State Errors
    // ============================================================================
    /// State file could not be read, parsed, or written
    #[error("State error: {message}")]
    State {
        /// State failure detail
        message: String,
    },

    // ============================================================================
    // Stream Errors
    // ============================================================================
    /// Requested stream is not in the catalog
    #[error("Stream '{stream}' not found in catalog")]
    StreamNotFound {
        /// Requested stream name
        stream: String,
    },

    /// A path template placeholder had no value in the sync context
    #[error("Undefined variable in path template: {variable}")]
    UndefinedVariable {
        /// Placeholder name
        variable: String,
    },

    // ============================================================================
    // Lifecycle
    // ============================================================================
    /// The sync was cancelled before completion
    #[error("Sync cancelled")]
    Cancelled,

    // ============================================================================
    // I/O Errors
    // ============================================================================
    /// Filesystem or stream I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    /// Contextualized error from [`ResultExt`]
    #[error("{0}")]
    Other(String),

    /// Catch-all for errors from embedding code
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a record extraction error
    pub fn record_extraction(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RecordExtraction {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Create an undefined variable error
    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    /// Check if this error is a fatal sync failure (never retried)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::HttpStatus { .. }
                | Error::PaginationLoop { .. }
                | Error::RateLimited { .. }
                | Error::RetryBudgetExhausted { .. }
                | Error::Cancelled
        )
    }
}

/// Result type alias for lightspeed-tap
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("api_key");
        assert_eq!(err.to_string(), "Missing required config field: api_key");

        let err = Error::http_status(404, "Not found");
        assert_eq!(err.to_string(), "HTTP 404: Not found");

        let err = Error::PaginationLoop { token: 3 };
        assert!(err.to_string().contains("token 3"));
    }

    #[test]
    fn test_is_fatal() {
        assert!(Error::http_status(400, "").is_fatal());
        assert!(Error::PaginationLoop { token: 2 }.is_fatal());
        assert!(Error::RetryBudgetExhausted { attempts: 10 }.is_fatal());
        assert!(Error::RateLimited {
            retry_after_seconds: 60
        }
        .is_fatal());
        assert!(Error::Cancelled.is_fatal());

        assert!(!Error::config("test").is_fatal());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
