//! Error types for the investor API client.
//!
//! # Design
//! The status-code taxonomy (`Authorization`, `ResourceNotFound`,
//! `ExecutionFailure`, `UnexpectedStatusCode`) mirrors how the API reports
//! failures. Everything that goes wrong locally gets its own variant so callers
//! can tell "the API said no" apart from "we never got that far" and from
//! "the payload did not look like we expected".

use serde_json::Value;
use thiserror::Error;

/// Errors returned by `Connection` and the resource facades.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API rejected the credential (401 or 403).
    #[error("authorization failed with status {status}")]
    Authorization { status: u16, body: String },

    /// The API returned 404 for the requested resource.
    #[error("resource not found: {url}")]
    ResourceNotFound { url: String },

    /// The API failed to execute the request: either a 500, or an `errors`
    /// block embedded in an otherwise successful response.
    #[error("request execution failed")]
    ExecutionFailure { errors: Option<Value> },

    /// Any status outside 200, 400, 401, 403, 404 and 500.
    #[error("unexpected status code {status}: {body}")]
    UnexpectedStatusCode { status: u16, body: String },

    /// A local precondition was violated; no request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The response could not be normalized.
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// A 200/400 response body was not valid JSON.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// A request body could not be serialized.
    #[error("failed to serialize request body: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ApiError {
    /// Raw `errors` payload carried by an execution failure, if any.
    pub fn errors(&self) -> Option<&Value> {
        match self {
            ApiError::ExecutionFailure { errors } => errors.as_ref(),
            _ => None,
        }
    }
}

/// Failures while normalizing a decoded payload.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NormalizeError {
    /// An enumerated value has no entry in its remap table. The upstream API
    /// has most likely grown a new value.
    #[error("unmapped {table} value '{value}'")]
    UnmappedEnumValue { table: &'static str, value: String },

    #[error("field '{field}' is not a valid timestamp: {value}")]
    InvalidTimestamp { field: String, value: String },

    #[error("expected a JSON object for '{context}'")]
    NotAnObject { context: String },
}

/// Network-level failure reported by a `Transport`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Problems reading configuration from the environment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingEnvVar(String),

    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidValue { name: String, value: String },
}
