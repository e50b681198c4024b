//! HTTP request/response types exchanged between `Connection` and a
//! `Transport`.
//!
//! # Design
//! Requests and responses are plain data. `Connection` builds an
//! `HttpRequest`, hands it to whatever transport it was given, and classifies
//! the returned `HttpResponse`. Building and classifying stay deterministic and
//! testable without a network; only the transport touches sockets.

/// HTTP method for a request. The investor API only uses GET and POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `url` never carries a query string; query parameters stay in `query` so the
/// transport can encode them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "https://example.test/a".to_string(),
            headers: vec![("Authorization".to_string(), "key".to_string())],
            query: Vec::new(),
            body: None,
        };
        assert_eq!(request.header("authorization"), Some("key"));
        assert_eq!(request.header("accept"), None);
    }

    #[test]
    fn method_names() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Post.as_str(), "POST");
    }
}
