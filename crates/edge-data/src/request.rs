//! Outbound HTTP request.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use edge_core::Method;
use serde::Serialize;

use crate::FetchError;

/// A fully built outbound request, handed to an [`HttpTransport`](crate::HttpTransport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    /// Lowercase header names, in insertion order.
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl OutboundRequest {
    /// Create a new request.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Add a header, replacing an existing one with the same name.
    pub fn header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        let key = key.as_ref().to_ascii_lowercase();
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.headers.push((key, value)),
        }
        self
    }

    /// Set the request body as raw bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, FetchError> {
        let json = serde_json::to_vec(value)?;
        Ok(self.header("content-type", "application/json").body(json))
    }

    /// Add a bearer token authorization header.
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        self.header("authorization", format!("Bearer {}", token.as_ref()))
    }

    /// Add a basic authorization header.
    pub fn basic_auth(self, username: impl AsRef<str>, password: Option<&str>) -> Self {
        let credentials = format!("{}:{}", username.as_ref(), password.unwrap_or_default());
        self.header(
            "authorization",
            format!("Basic {}", STANDARD.encode(credentials)),
        )
    }

    /// Get a header value (case-insensitive).
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Parse the body as JSON. Used by transports and test doubles.
    pub fn body_json(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|b| serde_json::from_slice(b).ok())
    }

    /// Host part of the URL, for logging.
    pub fn host(&self) -> &str {
        let rest = self
            .url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.url);
        rest.split(['/', '?']).next().unwrap_or(rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_sets_body_and_content_type() {
        let req = OutboundRequest::new(Method::Post, "https://api.example.com/v1/pages")
            .json(&serde_json::json!({"a": 1}))
            .unwrap();
        assert_eq!(req.header_value("Content-Type"), Some("application/json"));
        assert_eq!(req.body_json(), Some(serde_json::json!({"a": 1})));
    }

    #[test]
    fn test_basic_auth_encodes_credentials() {
        let req = OutboundRequest::new(Method::Get, "https://x").basic_auth("id", Some("key"));
        assert_eq!(req.header_value("authorization"), Some("Basic aWQ6a2V5"));
    }

    #[test]
    fn test_bearer_auth_replaces_previous() {
        let req = OutboundRequest::new(Method::Get, "https://x")
            .bearer_auth("one")
            .bearer_auth("two");
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header_value("authorization"), Some("Bearer two"));
    }

    #[test]
    fn test_host_extraction() {
        let req = OutboundRequest::new(Method::Get, "https://api.crisp.chat/v1/website/x?y=1");
        assert_eq!(req.host(), "api.crisp.chat");
        let req = OutboundRequest::new(Method::Get, "o1.ingest.sentry.io");
        assert_eq!(req.host(), "o1.ingest.sentry.io");
    }
}
