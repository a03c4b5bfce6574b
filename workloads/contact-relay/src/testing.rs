//! Recording stub transport and fixtures for tests.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use edge_sdk::edge_core::{MapEnvironment, Method, RequestContext};
use edge_sdk::edge_data::{FetchError, HttpTransport, OutboundRequest, Response, SharedTransport};
use serde_json::{json, Value};

use crate::config;

pub const SENTRY_STORE_SUFFIX: &str = "/api/42/store/";

struct Route {
    method: Option<Method>,
    url_suffix: String,
    reply: Result<Response, FetchError>,
}

/// Answers by URL suffix; later registrations win. Records every request.
#[derive(Default)]
pub struct StubTransport {
    routes: RefCell<Vec<Route>>,
    calls: RefCell<Vec<OutboundRequest>>,
}

impl StubTransport {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn shared(self: &Rc<Self>) -> SharedTransport {
        self.clone()
    }

    /// Reply with `status` and a JSON `body`.
    pub fn on(&self, method: Method, url_suffix: &str, status: u16, body: Value) -> &Self {
        self.routes.borrow_mut().push(Route {
            method: Some(method),
            url_suffix: url_suffix.to_string(),
            reply: Ok(Response::json_body(status, &body)),
        });
        self
    }

    /// Fail any request to a matching URL without a response.
    pub fn fail(&self, url_suffix: &str, error: FetchError) -> &Self {
        self.routes.borrow_mut().push(Route {
            method: None,
            url_suffix: url_suffix.to_string(),
            reply: Err(error),
        });
        self
    }

    pub fn calls(&self) -> Vec<OutboundRequest> {
        self.calls.borrow().clone()
    }

    /// Requests whose URL ends with `url_suffix`.
    pub fn calls_to(&self, url_suffix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|request| request.url.ends_with(url_suffix))
            .count()
    }
}

#[async_trait(?Send)]
impl HttpTransport for StubTransport {
    async fn send(&self, request: OutboundRequest) -> Result<Response, FetchError> {
        let reply = self
            .routes
            .borrow()
            .iter()
            .rev()
            .find(|route| {
                request.url.ends_with(&route.url_suffix)
                    && route.method.as_ref().map_or(true, |m| *m == request.method)
            })
            .map(|route| route.reply.clone())
            .unwrap_or_else(|| {
                Err(FetchError::RequestError(format!(
                    "no stub for {} {}",
                    request.method, request.url
                )))
            });
        self.calls.borrow_mut().push(request);
        reply
    }
}

/// Every variable configured.
pub fn full_env() -> MapEnvironment {
    MapEnvironment::new()
        .with(config::SENTRY_DSN, "https://pubkey@errors.example.io/42")
        .with(config::SENTRY_ENVIRONMENT, "test")
        .with(config::CRISP_TOKEN, "ident:key")
        .with(config::CRISP_WEBSITE_ID, "site-1")
        .with(config::NOTION_TOKEN, "secret_abc")
        .with(config::NOTION_CONDUCTOR_DATABASE_ID, "db-conductor")
        .with(config::NOTION_CONTACT_US_DATABASE_ID, "db-contact")
}

/// All collaborators answer successfully.
pub fn happy_stub() -> Rc<StubTransport> {
    let stub = StubTransport::new();
    stub.on(
        Method::Post,
        "/v1/pages",
        200,
        json!({"object": "page", "id": "page-123"}),
    )
    .on(
        Method::Post,
        "/conversation",
        201,
        json!({"error": false, "reason": "added", "data": {"session_id": "session_abc"}}),
    )
    .on(
        Method::Patch,
        "/meta",
        200,
        json!({"error": false, "reason": "updated", "data": {}}),
    )
    .on(
        Method::Post,
        "/message",
        202,
        json!({"error": false, "reason": "dispatched", "data": {"fingerprint": 1}}),
    )
    .on(Method::Post, SENTRY_STORE_SUFFIX, 200, json!({"id": "evt"}));
    stub
}

/// JSON POST from the site.
pub fn post(path: &str, body: &str) -> RequestContext {
    RequestContext::new(Method::Post, path)
        .with_header("Host", "relay.example.com")
        .with_header("Origin", "https://www.example.com")
        .with_header("Content-Type", "application/json")
        .with_body(body.as_bytes().to_vec())
}
