//! Tap configuration
//!
//! Runtime configuration for a sync: API endpoint, credentials, optional
//! extraction window bounds, and request throttling. Loaded from a JSON or
//! YAML file, or built directly for embedding.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::warn;

/// Default inter-request delay in seconds
pub const DEFAULT_THROTTLE_SECONDS: f64 = 1.3;

/// Tap configuration loaded at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// Base URL of the API (e.g., "https://api.webshopapp.com")
    pub base_url: String,

    /// Shop language, used as a URL path segment
    pub language: String,

    /// API key (basic auth username)
    pub api_key: String,

    /// API secret (basic auth password)
    pub api_secret: String,

    /// Optional start of extraction window (ISO 8601)
    #[serde(default)]
    pub start_date: Option<String>,

    /// Optional end of extraction window (ISO 8601)
    #[serde(default)]
    pub end_date: Option<String>,

    /// Seconds to wait between page requests. Unparsable values fall back
    /// to the default rather than failing the sync.
    #[serde(
        default = "default_throttle",
        deserialize_with = "deserialize_throttle"
    )]
    pub throttle_seconds: f64,

    /// Optional custom User-Agent header
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_throttle() -> f64 {
    DEFAULT_THROTTLE_SECONDS
}

/// Accepts a number, a numeric string, or garbage (which falls back to the
/// default with a warning). An upper-level rate limit is an optimization,
/// not a correctness requirement.
fn deserialize_throttle<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(parse_throttle(&raw))
}

fn parse_throttle(raw: &serde_json::Value) -> f64 {
    let parsed = match raw {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        serde_json::Value::Null => Some(DEFAULT_THROTTLE_SECONDS),
        _ => None,
    };

    match parsed {
        Some(v) if v >= 0.0 => v,
        _ => {
            warn!(
                value = %raw,
                default = DEFAULT_THROTTLE_SECONDS,
                "unparsable throttle_seconds, falling back to default"
            );
            DEFAULT_THROTTLE_SECONDS
        }
    }
}

impl TapConfig {
    /// Load configuration from a JSON or YAML file (by extension)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config {}: {e}", path.display()))
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml" | "yml")
        );
        if is_yaml {
            Ok(serde_yaml::from_str(&contents)?)
        } else {
            Ok(serde_json::from_str(&contents)?)
        }
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate that the required fields are non-empty and the base URL parses
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("base_url", &self.base_url),
            ("language", &self.language),
            ("api_key", &self.api_key),
            ("api_secret", &self.api_secret),
        ] {
            if value.is_empty() {
                return Err(Error::missing_field(field));
            }
        }
        url::Url::parse(&self.base_url)?;
        Ok(())
    }

    /// Full URL base including the language path segment
    pub fn url_base(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.language.trim_matches('/')
        )
    }
}
