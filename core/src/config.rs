//! Connection settings and the API credential.

use std::fmt;
use std::time::Duration;

use crate::error::{ApiError, ConfigError};

pub const DEFAULT_BASE_URI: &str = "https://api.lendingclub.com/api/investor";
pub const DEFAULT_API_VERSION: &str = "v1";
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(1);

/// Sent as `User-Agent` on every request.
pub const USER_AGENT: &str = concat!("lendingclub-core v", env!("CARGO_PKG_VERSION"));

pub const API_KEY_ENV: &str = "LENDINGCLUB_API_KEY";
pub const BASE_URI_ENV: &str = "LENDINGCLUB_BASE_URI";
pub const REQUEST_DELAY_ENV: &str = "LENDINGCLUB_REQUEST_DELAY_MS";

/// Settings fixed for the lifetime of a `Connection`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Everything before `/{api_version}/{resource}`.
    pub base_uri: String,
    /// Minimum gap between the starts of two requests.
    pub request_delay: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            base_uri: DEFAULT_BASE_URI.to_string(),
            request_delay: DEFAULT_REQUEST_DELAY,
        }
    }
}

impl ConnectionConfig {
    /// Defaults, overridden by `LENDINGCLUB_BASE_URI` and
    /// `LENDINGCLUB_REQUEST_DELAY_MS` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(base_uri) = lookup(BASE_URI_ENV) {
            config.base_uri = base_uri;
        }

        if let Some(raw) = lookup(REQUEST_DELAY_ENV) {
            let millis = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue {
                    name: REQUEST_DELAY_ENV.to_string(),
                    value: raw.clone(),
                })?;
            config.request_delay = Duration::from_millis(millis);
        }

        tracing::debug!(
            base_uri = %config.base_uri,
            request_delay_ms = config.request_delay.as_millis() as u64,
            "loaded connection config"
        );
        Ok(config)
    }

    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = base_uri.into();
        self
    }

    pub fn with_request_delay(mut self, request_delay: Duration) -> Self {
        self.request_delay = request_delay;
        self
    }
}

/// The investor API key. Sent verbatim as the `Authorization` header and
/// never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Result<Self, ApiError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ApiError::InvalidArgument(
                "api key must be provided and non-empty".to_string(),
            ));
        }
        Ok(Self(key))
    }

    /// Reads the key from `LENDINGCLUB_API_KEY`.
    pub fn from_env() -> Result<Self, ApiError> {
        let key = std::env::var(API_KEY_ENV)
            .map_err(|_| ConfigError::MissingEnvVar(API_KEY_ENV.to_string()))?;
        Self::new(key)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}
