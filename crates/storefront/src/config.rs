//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LAREK_API_ORIGIN` - Origin of the shop backend (e.g. `https://larek-api.nomoreparties.co`)
//!
//! ## Optional
//! - `LAREK_API_PATH` - API path under the origin (default: `/api/weblarek`)
//! - `LAREK_CDN_PATH` - Image path under the origin (default: `/content/weblarek`)
//! - `LAREK_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `LAREK_ITEM_CACHE_TTL_SECS` - Lifetime of cached item details (default: 300)
//! - `LAREK_MAX_DISPATCH_DEPTH` - Nested event emission limit (default: 32)

use std::time::Duration;

use larek_state::DEFAULT_MAX_DISPATCH_DEPTH;
use thiserror::Error;
use url::Url;

pub const API_ORIGIN_VAR: &str = "LAREK_API_ORIGIN";
const API_PATH_VAR: &str = "LAREK_API_PATH";
const CDN_PATH_VAR: &str = "LAREK_CDN_PATH";
const HTTP_TIMEOUT_VAR: &str = "LAREK_HTTP_TIMEOUT_SECS";
const ITEM_CACHE_TTL_VAR: &str = "LAREK_ITEM_CACHE_TTL_SECS";
const MAX_DISPATCH_DEPTH_VAR: &str = "LAREK_MAX_DISPATCH_DEPTH";

const DEFAULT_API_PATH: &str = "/api/weblarek";
const DEFAULT_CDN_PATH: &str = "/content/weblarek";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_ITEM_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend origin
    pub api_origin: Url,
    /// Base URL of the JSON API (origin + API path, no trailing slash)
    pub api_url: String,
    /// Base URL prepended to item image references
    pub cdn_url: String,
    /// Per-request HTTP timeout
    pub http_timeout: Duration,
    /// Lifetime of cached item details
    pub item_cache_ttl: Duration,
    /// Nesting limit for events emitted from inside handlers
    pub max_dispatch_depth: usize,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let origin = lookup(API_ORIGIN_VAR)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(API_ORIGIN_VAR.to_string()))?;
        let api_origin = Url::parse(&origin)
            .map_err(|e| ConfigError::InvalidEnvVar(API_ORIGIN_VAR.to_string(), e.to_string()))?;
        if !matches!(api_origin.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                API_ORIGIN_VAR.to_string(),
                format!("unsupported scheme '{}'", api_origin.scheme()),
            ));
        }

        let api_path = lookup(API_PATH_VAR).unwrap_or_else(|| DEFAULT_API_PATH.to_string());
        let cdn_path = lookup(CDN_PATH_VAR).unwrap_or_else(|| DEFAULT_CDN_PATH.to_string());

        let http_timeout = Duration::from_secs(parse_or_default(
            &lookup,
            HTTP_TIMEOUT_VAR,
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?);
        let item_cache_ttl = Duration::from_secs(parse_or_default(
            &lookup,
            ITEM_CACHE_TTL_VAR,
            DEFAULT_ITEM_CACHE_TTL_SECS,
        )?);
        let max_dispatch_depth =
            parse_or_default(&lookup, MAX_DISPATCH_DEPTH_VAR, DEFAULT_MAX_DISPATCH_DEPTH)?;
        if max_dispatch_depth == 0 {
            return Err(ConfigError::InvalidEnvVar(
                MAX_DISPATCH_DEPTH_VAR.to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            api_url: join_path(&api_origin, &api_path),
            cdn_url: join_path(&api_origin, &cdn_path),
            api_origin,
            http_timeout,
            item_cache_ttl,
            max_dispatch_depth,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Origin plus path, without a trailing slash.
fn join_path(origin: &Url, path: &str) -> String {
    let origin = origin.as_str().trim_end_matches('/');
    let path = path.trim_matches('/');
    if path.is_empty() {
        origin.to_string()
    } else {
        format!("{origin}/{path}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[(API_ORIGIN_VAR, "https://larek-api.nomoreparties.co")]).unwrap();
        assert_eq!(
            config.api_url,
            "https://larek-api.nomoreparties.co/api/weblarek"
        );
        assert_eq!(
            config.cdn_url,
            "https://larek-api.nomoreparties.co/content/weblarek"
        );
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.item_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.max_dispatch_depth, DEFAULT_MAX_DISPATCH_DEPTH);
    }

    #[test]
    fn test_missing_origin() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == API_ORIGIN_VAR));
    }

    #[test]
    fn test_invalid_origin() {
        assert!(matches!(
            load(&[(API_ORIGIN_VAR, "not a url")]),
            Err(ConfigError::InvalidEnvVar(..))
        ));
        assert!(matches!(
            load(&[(API_ORIGIN_VAR, "ftp://example.com")]),
            Err(ConfigError::InvalidEnvVar(..))
        ));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            (API_ORIGIN_VAR, "http://localhost:3000/"),
            (API_PATH_VAR, "/api/"),
            (CDN_PATH_VAR, "images"),
            (HTTP_TIMEOUT_VAR, "3"),
            (ITEM_CACHE_TTL_VAR, "0"),
            (MAX_DISPATCH_DEPTH_VAR, "8"),
        ])
        .unwrap();
        assert_eq!(config.api_url, "http://localhost:3000/api");
        assert_eq!(config.cdn_url, "http://localhost:3000/images");
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert_eq!(config.item_cache_ttl, Duration::ZERO);
        assert_eq!(config.max_dispatch_depth, 8);
    }

    #[test]
    fn test_invalid_numbers() {
        let err = load(&[
            (API_ORIGIN_VAR, "http://localhost:3000"),
            (HTTP_TIMEOUT_VAR, "soon"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == HTTP_TIMEOUT_VAR));

        let err = load(&[
            (API_ORIGIN_VAR, "http://localhost:3000"),
            (MAX_DISPATCH_DEPTH_VAR, "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(..)));
    }
}
