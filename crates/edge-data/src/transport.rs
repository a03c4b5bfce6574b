//! Host transport for outbound HTTP.

use std::rc::Rc;

use async_trait::async_trait;

use crate::{FetchError, OutboundRequest, Response};

/// Sends a fully built request and returns the raw response.
///
/// Non-2xx statuses are not errors at this layer; only failures to get a
/// response at all are. Timeouts are whatever the host applies.
#[async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, request: OutboundRequest) -> Result<Response, FetchError>;
}

/// Transport shared by every client built during one invocation.
pub type SharedTransport = Rc<dyn HttpTransport>;

#[async_trait(?Send)]
impl<T: HttpTransport + ?Sized> HttpTransport for Rc<T> {
    async fn send(&self, request: OutboundRequest) -> Result<Response, FetchError> {
        (**self).send(request).await
    }
}

/// Outbound HTTP through the Spin host.
///
/// Destination hosts must be listed in the component's `allowed_outbound_hosts`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinTransport;

#[cfg(target_arch = "wasm32")]
#[async_trait(?Send)]
impl HttpTransport for SpinTransport {
    async fn send(&self, request: OutboundRequest) -> Result<Response, FetchError> {
        use edge_core::Method;
        use spin_sdk::http::{Method as SpinMethod, Request};

        let method = match &request.method {
            Method::Get => SpinMethod::Get,
            Method::Post => SpinMethod::Post,
            Method::Put => SpinMethod::Put,
            Method::Patch => SpinMethod::Patch,
            Method::Delete => SpinMethod::Delete,
            Method::Head => SpinMethod::Head,
            Method::Options => SpinMethod::Options,
            Method::Connect => SpinMethod::Connect,
            Method::Trace => SpinMethod::Trace,
            Method::Other(token) => SpinMethod::Other(token.clone()),
        };

        let mut builder = Request::builder();
        builder.method(method).uri(request.url.as_str());
        for (key, value) in &request.headers {
            builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder.body(body);
        }

        let response: spin_sdk::http::Response = spin_sdk::http::send(builder.build())
            .await
            .map_err(|e| FetchError::RequestError(e.to_string()))?;

        let status = *response.status();
        let headers = response
            .headers()
            .map(|(k, v)| {
                (
                    k.to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();

        Ok(Response::new(status, headers, response.into_body()))
    }
}
