//! The seam between `Connection` and the network.
//!
//! # Design
//! `Connection` never performs I/O itself; it hands a plain-data `HttpRequest`
//! to a `Transport` and classifies the `HttpResponse` it gets back. The
//! default transport is `UreqTransport`. Tests and callers with special needs
//! (proxies, custom TLS, timeouts) inject their own. Any
//! `Fn(&HttpRequest) -> Result<HttpResponse, TransportError>` is a transport.

use std::time::Duration;

use ureq::Agent;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one HTTP round-trip.
///
/// Implementations must return every status code as an `HttpResponse`; only
/// failures that prevent a response (DNS, connect, TLS, I/O) are errors.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError>,
{
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    /// Agent without a request timeout.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Agent that gives up on a whole request after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Some(timeout))
    }

    /// Wraps a preconfigured agent. It must be built with
    /// `http_status_as_error(false)` so non-2xx statuses reach the caller.
    pub fn with_agent(agent: Agent) -> Self {
        Self { agent }
    }

    fn build(timeout: Option<Duration>) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                for (key, value) in &request.query {
                    builder = builder.query(key, value);
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                for (key, value) in &request.query {
                    builder = builder.query(key, value);
                }
                let body = request.body.as_deref().unwrap_or_default();
                builder.send(body.as_bytes())
            }
        };

        let mut response = result.map_err(|e| {
            TransportError::new(format!(
                "{} {} failed: {e}",
                request.method.as_str(),
                request.url
            ))
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::new(format!("failed to read response body: {e}")))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_transports() {
        let transport = |request: &HttpRequest| -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse::new(200, request.url.clone()))
        };
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "https://example.test/x".to_string(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        };
        let response = transport.execute(&request).unwrap();
        assert_eq!(response.body, "https://example.test/x");
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        let transport = UreqTransport::with_timeout(Duration::from_secs(2));
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "http://127.0.0.1:1/unreachable".to_string(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        };
        let err = transport.execute(&request).unwrap_err();
        assert!(err.message().contains("GET http://127.0.0.1:1/unreachable failed"));
    }

    #[test]
    fn preconfigured_agent_is_used() {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(Duration::from_secs(2)))
            .build()
            .new_agent();
        let transport = UreqTransport::with_agent(agent);
        let request = HttpRequest {
            method: HttpMethod::Post,
            url: "http://127.0.0.1:1/unreachable".to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            query: Vec::new(),
            body: Some("{}".to_string()),
        };
        let err = transport.execute(&request).unwrap_err();
        assert!(err.message().starts_with("POST http://127.0.0.1:1/unreachable failed"));
    }
}
