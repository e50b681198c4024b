//! Authenticated, throttled access to the investor API.
//!
//! # Design
//! A `Connection` is built once per API key and reused for every request.
//! Each call goes through the same three steps: `build_*` produces a
//! plain-data `HttpRequest`, the throttle holds the caller until the request
//! may depart, and `parse_response` turns the `HttpResponse` into JSON or a
//! typed error. Only the middle step blocks.
//!
//! A 400 is not an error here: the API reports validation failures as a 400
//! with an `errors` body, which the resource facades inspect.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::config::{ApiKey, ConnectionConfig, DEFAULT_API_VERSION, USER_AGENT};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::throttle::Throttle;
use crate::transport::{Transport, UreqTransport};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Blocking client for one API key.
///
/// Not `Sync`: a connection serves one request at a time.
pub struct Connection {
    api_key: ApiKey,
    base_uri: String,
    throttle: Throttle,
    transport: Box<dyn Transport + Send>,
}

impl Connection {
    /// Connection to the production API with the default settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_config(api_key, ConnectionConfig::default())
    }

    pub fn with_config(
        api_key: impl Into<String>,
        config: ConnectionConfig,
    ) -> Result<Self, ApiError> {
        Self::with_transport(api_key, config, UreqTransport::new())
    }

    /// Fails before any I/O if `api_key` is empty.
    pub fn with_transport(
        api_key: impl Into<String>,
        config: ConnectionConfig,
        transport: impl Transport + Send + 'static,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            api_key: ApiKey::new(api_key)?,
            base_uri: config.base_uri.trim_end_matches('/').to_string(),
            throttle: Throttle::new(config.request_delay),
            transport: Box::new(transport),
        })
    }

    /// Reads the key and settings from `LENDINGCLUB_*` environment variables.
    pub fn from_env() -> Result<Self, ApiError> {
        let api_key = ApiKey::from_env()?;
        let config = ConnectionConfig::from_env()?;
        Self::with_config(api_key.expose(), config)
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn request_delay(&self) -> Duration {
        self.throttle.delay()
    }

    /// `{base}/{api_version}/{resource}`.
    pub fn resource_url(&self, api_version: &str, resource: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_uri,
            api_version,
            resource.trim_start_matches('/')
        )
    }

    pub fn get(&self, resource: &str, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        self.get_with_version(DEFAULT_API_VERSION, resource, query)
    }

    pub fn get_with_version(
        &self,
        api_version: &str,
        resource: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, ApiError> {
        let request = self.build_get(api_version, resource, query);
        self.send(request)
    }

    /// Sends `body` as JSON.
    pub fn post<B>(&self, resource: &str, body: &B, query: &[(&str, &str)]) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.post_with_version(DEFAULT_API_VERSION, resource, body, query)
    }

    pub fn post_with_version<B>(
        &self,
        api_version: &str,
        resource: &str,
        body: &B,
        query: &[(&str, &str)],
    ) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.build_post(api_version, resource, body, query)?;
        self.send(request)
    }

    pub fn build_get(&self, api_version: &str, resource: &str, query: &[(&str, &str)]) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.resource_url(api_version, resource),
            headers: self.default_headers(),
            query: owned_pairs(query),
            body: None,
        }
    }

    pub fn build_post<B>(
        &self,
        api_version: &str,
        resource: &str,
        body: &B,
        query: &[(&str, &str)],
    ) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_string(body).map_err(ApiError::Serialization)?;
        let mut headers = self.default_headers();
        headers.push(("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()));

        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.resource_url(api_version, resource),
            headers,
            query: owned_pairs(query),
            body: Some(body),
        })
    }

    fn default_headers(&self) -> Vec<(String, String)> {
        vec![
            ("Accept".to_string(), JSON_CONTENT_TYPE.to_string()),
            ("Authorization".to_string(), self.api_key.expose().to_string()),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
        ]
    }

    fn send(&self, request: HttpRequest) -> Result<Value, ApiError> {
        self.throttle.wait();
        tracing::info!(method = request.method.as_str(), url = %request.url, "issuing request");
        if let Some(body) = &request.body {
            tracing::debug!(body = %body, "request body");
        }

        let response = self.transport.execute(&request)?;
        tracing::info!(status = response.status, "response received");
        parse_response(&request.url, response)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("api_key", &self.api_key)
            .field("base_uri", &self.base_uri)
            .field("throttle", &self.throttle)
            .finish_non_exhaustive()
    }
}

/// Classifies `response` and decodes the body of a 200 or 400.
pub fn parse_response(url: &str, response: HttpResponse) -> Result<Value, ApiError> {
    check_status(url, &response)?;
    serde_json::from_str(&response.body).map_err(ApiError::Decode)
}

/// Map the status code to the error taxonomy. 200 and 400 pass.
fn check_status(url: &str, response: &HttpResponse) -> Result<(), ApiError> {
    match response.status {
        200 | 400 => Ok(()),
        401 | 403 => {
            tracing::error!(status = response.status, body = %response.body, "authorization error");
            Err(ApiError::Authorization {
                status: response.status,
                body: response.body.clone(),
            })
        }
        404 => {
            tracing::error!(url = %url, "resource not found");
            Err(ApiError::ResourceNotFound {
                url: url.to_string(),
            })
        }
        500 => {
            tracing::error!(body = %response.body, "request failed with 500");
            let errors = (!response.body.is_empty()).then(|| Value::String(response.body.clone()));
            Err(ApiError::ExecutionFailure { errors })
        }
        status => {
            tracing::error!(status, body = %response.body, "unexpected status code");
            Err(ApiError::UnexpectedStatusCode {
                status,
                body: response.body.clone(),
            })
        }
    }
}

fn owned_pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    fn config() -> ConnectionConfig {
        ConnectionConfig::default()
            .with_base_uri("https://lc.test/api/investor/")
            .with_request_delay(Duration::ZERO)
    }

    fn replying(status: u16, body: &'static str) -> Connection {
        Connection::with_transport("testkey", config(), move |_: &HttpRequest| -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse::new(status, body))
        })
        .unwrap()
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let err = Connection::new("").unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[test]
    fn build_get_targets_versioned_resource() {
        let conn = replying(200, "{}");
        let req = conn.build_get("v1", "loans/listing", &[("showAll", "true")]);

        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://lc.test/api/investor/v1/loans/listing");
        assert_eq!(req.query, vec![("showAll".to_string(), "true".to_string())]);
        assert!(req.body.is_none());
    }

    #[test]
    fn requests_carry_raw_key_and_fixed_headers() {
        let conn = replying(200, "{}");
        let req = conn.build_get("v1", "accounts/1/summary", &[]);

        assert_eq!(req.header("Accept"), Some("application/json"));
        assert_eq!(req.header("Authorization"), Some("testkey"));
        assert_eq!(req.header("User-Agent"), Some(USER_AGENT));
        assert_eq!(req.header("Content-Type"), None);
    }

    #[test]
    fn build_post_serializes_json_body() {
        let conn = replying(200, "{}");
        let req = conn
            .build_post("v1", "accounts/1/orders", &json!({"aid": 1}), &[])
            .unwrap();

        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"aid": 1}));
    }

    #[test]
    fn leading_slash_on_resource_is_ignored() {
        let conn = replying(200, "{}");
        assert_eq!(
            conn.resource_url("v2", "/loans/listing"),
            "https://lc.test/api/investor/v2/loans/listing"
        );
    }

    #[test]
    fn ok_returns_decoded_body() {
        let conn = replying(200, r#"{"availableCash": 50.77}"#);
        assert_eq!(conn.get("x", &[]).unwrap(), json!({"availableCash": 50.77}));
    }

    #[test]
    fn bad_request_returns_body_unchanged() {
        let conn = replying(400, r#"{"errors": [{"code": "invalid"}]}"#);
        assert_eq!(
            conn.get("x", &[]).unwrap(),
            json!({"errors": [{"code": "invalid"}]})
        );
    }

    #[test]
    fn authorization_failures() {
        for status in [401, 403] {
            let err = replying(status, "not json").get("x", &[]).unwrap_err();
            assert!(
                matches!(err, ApiError::Authorization { status: s, .. } if s == status),
                "{status}"
            );
        }
    }

    #[test]
    fn not_found() {
        let err = replying(404, "").get("accounts/1/summary", &[]).unwrap_err();
        match err {
            ApiError::ResourceNotFound { url } => {
                assert_eq!(url, "https://lc.test/api/investor/v1/accounts/1/summary")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn server_error_is_execution_failure() {
        let err = replying(500, "boom").get("x", &[]).unwrap_err();
        assert!(matches!(err, ApiError::ExecutionFailure { .. }));
        assert_eq!(err.errors(), Some(&json!("boom")));
    }

    #[test]
    fn other_statuses_are_unexpected() {
        for status in [201, 204, 302, 418, 429, 502, 503] {
            let err = replying(status, "").get("x", &[]).unwrap_err();
            assert!(
                matches!(err, ApiError::UnexpectedStatusCode { status: s, .. } if s == status),
                "{status}"
            );
        }
    }

    #[test]
    fn post_uses_same_classification() {
        let conn = replying(403, "");
        let err = conn.post("x", &json!({}), &[]).unwrap_err();
        assert!(matches!(err, ApiError::Authorization { .. }));
    }

    #[test]
    fn non_json_success_body_is_decode_error() {
        let err = replying(200, "").get("x", &[]).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn transport_errors_pass_through() {
        let conn = Connection::with_transport("k", config(), |_: &HttpRequest| -> Result<HttpResponse, TransportError> {
            Err(TransportError::new("connection refused"))
        })
        .unwrap();
        let err = conn.get("x", &[]).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn consecutive_requests_are_spaced_by_the_delay() {
        let dispatches = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&dispatches);
        let conn = Connection::with_transport(
            "k",
            config().with_request_delay(Duration::from_secs(1)),
            move |_: &HttpRequest| -> Result<HttpResponse, TransportError> {
                seen.lock().unwrap().push(Instant::now());
                Ok(HttpResponse::new(200, "{}"))
            },
        )
        .unwrap();

        conn.get("a", &[]).unwrap();
        conn.get("b", &[]).unwrap();

        let dispatches = dispatches.lock().unwrap();
        assert_eq!(dispatches.len(), 2);
        assert!(dispatches[1].duration_since(dispatches[0]) >= Duration::from_secs(1));
    }

    #[test]
    fn failed_requests_still_count_for_throttling() {
        let dispatches = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&dispatches);
        let conn = Connection::with_transport(
            "k",
            config().with_request_delay(Duration::from_millis(200)),
            move |_: &HttpRequest| -> Result<HttpResponse, TransportError> {
                seen.lock().unwrap().push(Instant::now());
                Ok(HttpResponse::new(500, ""))
            },
        )
        .unwrap();

        assert!(conn.get("a", &[]).is_err());
        assert!(conn.get("b", &[]).is_err());

        let dispatches = dispatches.lock().unwrap();
        assert!(dispatches[1].duration_since(dispatches[0]) >= Duration::from_millis(200));
    }

    #[test]
    fn debug_does_not_leak_key() {
        let conn = replying(200, "{}");
        assert!(!format!("{conn:?}").contains("testkey"));
    }
}
