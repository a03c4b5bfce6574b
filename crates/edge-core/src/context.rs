//! Request context with typed method, query and headers.

use std::collections::HashMap;
use std::fmt;

use crate::lifecycle::TimingContext;

/// Header carrying a caller-supplied request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Unique request identifier for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new request ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Use the caller's id when it is present and sane, otherwise generate one.
    pub fn from_header_or_generate(header: Option<&str>) -> Self {
        match header.map(str::trim) {
            Some(id)
                if !id.is_empty()
                    && id.len() <= 128
                    && id.bytes().all(|b| b.is_ascii_graphic()) =>
            {
                Self::from_string(id)
            }
            _ => Self::generate(),
        }
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Query string parameters.
pub type QueryParams = HashMap<String, String>;

/// HTTP headers, keyed by lowercase name.
pub type Headers = HashMap<String, String>;

/// HTTP method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Connect,
    Trace,
    /// Extension method, kept verbatim.
    Other(String),
}

impl Method {
    /// Parse a method token. Well-known methods are matched case-insensitively.
    pub fn parse(token: &str) -> Self {
        match token.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "PATCH" => Self::Patch,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            "CONNECT" => Self::Connect,
            "TRACE" => Self::Trace,
            _ => Self::Other(token.to_string()),
        }
    }

    /// Convert to HTTP method string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Connect => "CONNECT",
            Self::Trace => "TRACE",
            Self::Other(token) => token,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed request context passed to workload handlers.
///
/// Built once per invocation from the host request and never mutated by
/// handlers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique request identifier.
    pub request_id: RequestId,
    /// HTTP method.
    pub method: Method,
    /// Request path, without the query string.
    pub path: String,
    /// Query string parameters.
    pub query: QueryParams,
    /// Raw query string, if any.
    pub raw_query: Option<String>,
    /// HTTP headers.
    pub headers: Headers,
    /// Raw request body.
    pub body: Vec<u8>,
    /// Timing context for observability.
    pub timing: TimingContext,
}

impl RequestContext {
    /// Create a new request context from a method and a path that may carry a query string.
    pub fn new(method: Method, path_with_query: impl AsRef<str>) -> Self {
        let path_with_query = path_with_query.as_ref();
        let (path, raw_query) = match path_with_query.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (path_with_query, None),
        };
        let path = if path.is_empty() { "/" } else { path };

        Self {
            request_id: RequestId::generate(),
            method,
            path: path.to_string(),
            query: raw_query.as_deref().map(parse_query).unwrap_or_default(),
            raw_query,
            headers: HashMap::new(),
            body: Vec::new(),
            timing: TimingContext::new(),
        }
    }

    /// Add a header. Names are stored lowercase; a repeated name is joined with `, `.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        let value = value.into();
        self.headers
            .entry(name.as_ref().to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
        self
    }

    /// Set the raw body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Take the request id from the `x-request-id` header, if the caller sent a usable one.
    pub fn adopt_request_id(mut self) -> Self {
        self.request_id = RequestId::from_header_or_generate(self.header(REQUEST_ID_HEADER));
        self
    }

    /// Get a query parameter by name.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(|s| s.as_str())
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_str())
    }

    /// Full URL as seen by the caller, when the host header is known.
    pub fn url(&self) -> String {
        let mut url = match self.header("host") {
            Some(host) => format!("https://{}{}", host, self.path),
            None => self.path.clone(),
        };
        if let Some(query) = &self.raw_query {
            url.push('?');
            url.push_str(query);
        }
        url
    }
}

// Values are kept as sent; form handlers only read JSON bodies.
fn parse_query(query: &str) -> QueryParams {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse_known_and_extension() {
        assert_eq!(Method::parse("post"), Method::Post);
        assert_eq!(Method::parse("OPTIONS"), Method::Options);
        assert_eq!(Method::parse("PURGE"), Method::Other("PURGE".to_string()));
        assert_eq!(Method::parse("PURGE").as_str(), "PURGE");
    }

    #[test]
    fn test_context_splits_path_and_query() {
        let ctx = RequestContext::new(Method::Get, "/api/conductor?utm_source=x&flag");
        assert_eq!(ctx.path, "/api/conductor");
        assert_eq!(ctx.query_param("utm_source"), Some("x"));
        assert_eq!(ctx.query_param("flag"), Some(""));
        assert_eq!(ctx.raw_query.as_deref(), Some("utm_source=x&flag"));
    }

    #[test]
    fn test_context_empty_path_is_root() {
        let ctx = RequestContext::new(Method::Get, "");
        assert_eq!(ctx.path, "/");
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let ctx = RequestContext::new(Method::Post, "/")
            .with_header("Content-Type", "application/json")
            .with_header("Accept", "text/html")
            .with_header("accept", "application/json");
        assert_eq!(ctx.header("content-type"), Some("application/json"));
        assert_eq!(ctx.header("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(ctx.header("accept"), Some("text/html, application/json"));
        assert_eq!(ctx.header("x-missing"), None);
    }

    #[test]
    fn test_request_id_adopted_from_header() {
        let ctx = RequestContext::new(Method::Get, "/")
            .with_header("X-Request-Id", "abc-123")
            .adopt_request_id();
        assert_eq!(ctx.request_id.as_str(), "abc-123");
    }

    #[test]
    fn test_request_id_rejects_unusable_header() {
        let id = RequestId::from_header_or_generate(Some("has space"));
        assert_ne!(id.as_str(), "has space");
        assert_eq!(id.as_str().len(), 32);

        let id = RequestId::from_header_or_generate(Some("   "));
        assert_eq!(id.as_str().len(), 32);
    }

    #[test]
    fn test_url_uses_host_header() {
        let ctx = RequestContext::new(Method::Post, "/api/contact-us?a=1")
            .with_header("Host", "relay.example.com");
        assert_eq!(ctx.url(), "https://relay.example.com/api/contact-us?a=1");

        let bare = RequestContext::new(Method::Post, "/api/contact-us");
        assert_eq!(bare.url(), "/api/contact-us");
    }
}
