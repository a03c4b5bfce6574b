//! Fetch client bound to one collaborator.

use edge_core::Method;
use serde::Serialize;
use tracing::{debug, warn};

use crate::dependency::DependencyTag;
use crate::{FetchError, OutboundRequest, Response, SharedTransport};

/// HTTP client for one outbound collaborator.
///
/// Holds the collaborator's base URL and default headers and tags every
/// request with its [`DependencyTag`] for logging. Requests are sent one at
/// a time by the caller; there is no retry.
#[derive(Clone)]
pub struct FetchClient {
    transport: SharedTransport,
    tag: DependencyTag,
    base_url: Option<String>,
    default_headers: Vec<(String, String)>,
}

impl FetchClient {
    /// Create a new client for the given dependency.
    pub fn new(transport: SharedTransport, tag: DependencyTag) -> Self {
        Self {
            transport,
            tag,
            base_url: None,
            default_headers: Vec::new(),
        }
    }

    /// Create a client with a base URL that will be prepended to relative paths.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((key.into(), value.into()));
        self
    }

    /// Create a GET request.
    pub fn get(&self, url: impl Into<String>) -> ClientRequestBuilder<'_> {
        self.request(Method::Get, url)
    }

    /// Create a POST request.
    pub fn post(&self, url: impl Into<String>) -> ClientRequestBuilder<'_> {
        self.request(Method::Post, url)
    }

    /// Create a PATCH request.
    pub fn patch(&self, url: impl Into<String>) -> ClientRequestBuilder<'_> {
        self.request(Method::Patch, url)
    }

    /// Create a request with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> ClientRequestBuilder<'_> {
        let url = url.into();
        let full_url = match &self.base_url {
            Some(base) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                format!("{}{}", base.trim_end_matches('/'), url)
            }
            _ => url,
        };

        let mut request = OutboundRequest::new(method, full_url);
        for (key, value) in &self.default_headers {
            request = request.header(key, value.clone());
        }

        ClientRequestBuilder {
            client: self,
            request,
        }
    }
}

/// A request builder bound to a client.
pub struct ClientRequestBuilder<'a> {
    client: &'a FetchClient,
    request: OutboundRequest,
}

impl ClientRequestBuilder<'_> {
    /// Add a header to the request.
    pub fn header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.request = self.request.header(key, value);
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, FetchError> {
        self.request = self.request.json(value)?;
        Ok(self)
    }

    /// Add a bearer token authorization header.
    pub fn bearer_auth(mut self, token: impl AsRef<str>) -> Self {
        self.request = self.request.bearer_auth(token);
        self
    }

    /// Add a basic authorization header.
    pub fn basic_auth(mut self, username: impl AsRef<str>, password: Option<&str>) -> Self {
        self.request = self.request.basic_auth(username, password);
        self
    }

    /// Send the request and return the response.
    pub async fn send(self) -> Result<Response, FetchError> {
        let tag = self.client.tag;
        let method = self.request.method.clone();
        let host = self.request.host().to_string();
        let started = std::time::Instant::now();

        let result = self.client.transport.send(self.request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => debug!(
                dependency = %tag,
                %method,
                %host,
                status = response.status,
                elapsed_ms,
                "outbound request complete"
            ),
            Err(error) => warn!(
                dependency = %tag,
                %method,
                %host,
                elapsed_ms,
                %error,
                "outbound request failed"
            ),
        }
        result
    }
}
