//! Request dispatch and the error boundary.
//!
//! [`handle`] never fails: every route error becomes a 500 JSON response
//! and, when a collector is configured, a [`PendingReport`] that the host
//! delivers after the response has been released.

use edge_sdk::edge_core::{
    EdgeResponse, Environment, Method, RequestContext, REQUEST_ID_HEADER,
};
use edge_sdk::edge_data::SharedTransport;
use edge_sdk::edge_observability::{ErrorReporter, ErrorScope, PendingReport};
use tracing::{info, info_span, Instrument};

use crate::config::{self, ReportingConfig};
use crate::error::RelayError;
use crate::handlers::{conductor, contact_us};

pub const CONDUCTOR_PATH: &str = "/api/conductor";
pub const CONTACT_US_PATH: &str = "/api/contact-us";

const RELEASE: &str = concat!("contact-relay@", env!("CARGO_PKG_VERSION"));
const LOGGER: &str = "contact-relay";

/// Where a request goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Any `OPTIONS` request.
    Preflight,
    Conductor,
    ContactUs,
    NotFound,
}

impl Route {
    /// Exact match on method and path (query excluded).
    pub fn resolve(method: &Method, path: &str) -> Self {
        match (method, path) {
            (Method::Options, _) => Self::Preflight,
            (Method::Post, CONDUCTOR_PATH) => Self::Conductor,
            (Method::Post, CONTACT_US_PATH) => Self::ContactUs,
            _ => Self::NotFound,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Preflight => "preflight",
            Self::Conductor => "conductor",
            Self::ContactUs => "contact-us",
            Self::NotFound => "not-found",
        }
    }
}

/// Outcome of one request.
pub struct Handled {
    pub response: EdgeResponse,
    /// Error report to deliver once the response is on its way.
    pub pending: Option<PendingReport>,
}

impl Handled {
    pub fn into_parts(self) -> (EdgeResponse, Option<PendingReport>) {
        (self.response, self.pending)
    }

    /// Deliver the pending report, then return the response.
    ///
    /// For hosts that cannot release the response before the report is sent.
    pub async fn finish(self) -> EdgeResponse {
        if let Some(report) = self.pending {
            report.deliver().await;
        }
        self.response
    }
}

/// Handle one request.
pub async fn handle<E: Environment + ?Sized>(
    req: &RequestContext,
    env: &E,
    transport: &SharedTransport,
) -> Handled {
    let route = Route::resolve(&req.method, &req.path);
    let span = info_span!(
        "request",
        request_id = %req.request_id,
        method = %req.method,
        path = %req.path,
        route = route.name()
    );

    async move {
        let scope = error_scope(req, env, transport);

        let (mut response, pending) = match dispatch(route, req, env, transport).await {
            Ok(response) => (response, None),
            Err(error) => {
                let message = error.public_message();
                let mut tags = vec![("route", route.name()), ("error_kind", error.kind())];
                if let Some(service) = error.service() {
                    tags.push(("service", service));
                }
                let pending = scope.capture(error.exception_type(), &message, &tags);
                (EdgeResponse::json_error(500, &message), pending)
            }
        };

        // Attached on every response, errors included, so browsers can read them.
        let cors = config::cors_policy(env);
        response.extend_headers(cors.headers_for(
            req.header("origin"),
            req.header("access-control-request-headers"),
            route == Route::Preflight,
        ));
        response.set_header(REQUEST_ID_HEADER, req.request_id.as_str());

        info!(
            status = response.status(),
            elapsed_ms = req.timing.elapsed_ms(),
            reported = pending.is_some(),
            "request complete"
        );
        Handled { response, pending }
    }
    .instrument(span)
    .await
}

async fn dispatch<E: Environment + ?Sized>(
    route: Route,
    req: &RequestContext,
    env: &E,
    transport: &SharedTransport,
) -> Result<EdgeResponse, RelayError> {
    match route {
        Route::Preflight => Ok(EdgeResponse::empty(204)),
        Route::Conductor => conductor::handle(req, env, transport).await,
        Route::ContactUs => contact_us::handle(req, env, transport).await,
        Route::NotFound => Ok(EdgeResponse::json_error(404, "not found")),
    }
}

fn error_scope<E: Environment + ?Sized>(
    req: &RequestContext,
    env: &E,
    transport: &SharedTransport,
) -> ErrorScope {
    let reporter = ReportingConfig::resolve(env).map(|config| {
        ErrorReporter::new(transport.clone(), config.dsn)
            .with_release(RELEASE)
            .with_environment(config.environment)
    });
    ErrorScope::new(req, reporter).with_logger(LOGGER)
}
