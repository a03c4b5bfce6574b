//! Error reporting to the error collector.
//!
//! A workload opens one [`ErrorScope`] per request. Capturing an error logs
//! it and, when a collector is configured, yields a [`PendingReport`] that the
//! workload delivers after the response has been handed to the host.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use edge_core::{Method, RequestContext};
use edge_data::{DependencyTag, FetchClient, FetchError, SharedTransport};
use serde::Serialize;
use tracing::{error, info, warn};

/// Protocol version sent in the auth header.
const PROTOCOL_VERSION: u8 = 7;

/// Client identifier sent in the auth header.
const CLIENT_NAME: &str = concat!("edge-observability/", env!("CARGO_PKG_VERSION"));

/// Request headers copied into events. Everything else may carry credentials.
const FORWARDED_HEADERS: &[&str] = &["user-agent", "referer", "origin", "content-type"];

/// Errors from parsing a DSN.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DsnError {
    #[error("DSN is missing a scheme")]
    MissingScheme,

    #[error("DSN scheme must be http or https, got {0}")]
    UnsupportedScheme(String),

    #[error("DSN is missing a public key")]
    MissingPublicKey,

    #[error("DSN is missing a host")]
    MissingHost,

    #[error("DSN is missing a project id")]
    MissingProjectId,
}

/// Parsed error-collector connection string: `https://<key>@<host>[/<prefix>]/<project>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dsn {
    scheme: String,
    public_key: String,
    host: String,
    path_prefix: String,
    project_id: String,
}

impl Dsn {
    /// Endpoint that accepts JSON events.
    pub fn store_url(&self) -> String {
        format!(
            "{}://{}{}/api/{}/store/",
            self.scheme, self.host, self.path_prefix, self.project_id
        )
    }

    /// Value of the `x-sentry-auth` header.
    pub fn auth_header(&self) -> String {
        format!(
            "Sentry sentry_version={}, sentry_client={}, sentry_key={}",
            PROTOCOL_VERSION, CLIENT_NAME, self.public_key
        )
    }

    /// Collector host, for logging.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Project id.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }
}

impl FromStr for Dsn {
    type Err = DsnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scheme, rest) = s.trim().split_once("://").ok_or(DsnError::MissingScheme)?;
        let scheme = scheme.to_ascii_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(DsnError::UnsupportedScheme(scheme));
        }

        let (userinfo, location) = rest.split_once('@').ok_or(DsnError::MissingPublicKey)?;
        // A legacy secret key may follow the public key; it is not sent.
        let public_key = userinfo.split(':').next().unwrap_or_default();
        if public_key.is_empty() {
            return Err(DsnError::MissingPublicKey);
        }

        let location = location.trim_end_matches('/');
        let (host, path) = match location.split_once('/') {
            Some((host, path)) => (host, path),
            None => (location, ""),
        };
        if host.is_empty() {
            return Err(DsnError::MissingHost);
        }

        let (path_prefix, project_id) = match path.rsplit_once('/') {
            Some((prefix, project)) => (format!("/{}", prefix), project),
            None => (String::new(), path),
        };
        if project_id.is_empty() {
            return Err(DsnError::MissingProjectId);
        }

        Ok(Self {
            scheme,
            public_key: public_key.to_string(),
            host: host.to_string(),
            path_prefix,
            project_id: project_id.to_string(),
        })
    }
}

impl fmt::Display for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Key left out on purpose: Display is used in logs.
        write!(
            f,
            "{}://{}{}/{}",
            self.scheme, self.host, self.path_prefix, self.project_id
        )
    }
}

/// One exception in an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExceptionValue {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// Exception list wrapper, as the store endpoint expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExceptionList {
    pub values: Vec<ExceptionValue>,
}

/// Request the error happened in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestInfo {
    pub url: String,
    pub method: String,
    pub headers: BTreeMap<String, String>,
}

impl RequestInfo {
    /// Capture the reportable parts of a request.
    pub fn from_context(ctx: &RequestContext) -> Self {
        let headers = FORWARDED_HEADERS
            .iter()
            .filter_map(|name| ctx.header(name).map(|v| (name.to_string(), v.to_string())))
            .collect();
        Self {
            url: ctx.url(),
            method: ctx.method.to_string(),
            headers,
        }
    }
}

/// An error event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEvent {
    pub event_id: String,
    pub timestamp: String,
    pub level: String,
    pub platform: String,
    pub logger: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    pub exception: ExceptionList,
    pub request: RequestInfo,
    pub tags: BTreeMap<String, String>,
}

/// Client for the error collector.
#[derive(Clone)]
pub struct ErrorReporter {
    client: FetchClient,
    dsn: Dsn,
    release: Option<String>,
    environment: Option<String>,
}

impl ErrorReporter {
    /// Create a reporter for `dsn`.
    pub fn new(transport: SharedTransport, dsn: Dsn) -> Self {
        Self {
            client: FetchClient::new(transport, DependencyTag::ErrorTracking),
            dsn,
            release: None,
            environment: None,
        }
    }

    /// Tag events with a release.
    pub fn with_release(mut self, release: impl Into<String>) -> Self {
        self.release = Some(release.into());
        self
    }

    /// Tag events with a deployment environment.
    pub fn with_environment(mut self, environment: Option<String>) -> Self {
        self.environment = environment;
        self
    }

    /// DSN this reporter sends to.
    pub fn dsn(&self) -> &Dsn {
        &self.dsn
    }

    /// Send one event. Never retried.
    pub async fn send(&self, event: &ErrorEvent) -> Result<(), FetchError> {
        self.client
            .request(Method::Post, self.dsn.store_url())
            .header("x-sentry-auth", self.dsn.auth_header())
            .json(event)?
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Error-reporting context bound to one request.
///
/// Without a reporter, captured errors are only logged.
pub struct ErrorScope {
    reporter: Option<ErrorReporter>,
    request: RequestInfo,
    request_id: String,
    logger: String,
}

impl ErrorScope {
    /// Open a scope for `ctx`.
    pub fn new(ctx: &RequestContext, reporter: Option<ErrorReporter>) -> Self {
        Self {
            reporter,
            request: RequestInfo::from_context(ctx),
            request_id: ctx.request_id.to_string(),
            logger: "edge".to_string(),
        }
    }

    /// Name recorded as the event's logger.
    pub fn with_logger(mut self, logger: impl Into<String>) -> Self {
        self.logger = logger.into();
        self
    }

    /// Whether captured errors leave the process.
    pub fn is_reporting(&self) -> bool {
        self.reporter.is_some()
    }

    /// Log an error and prepare its report.
    ///
    /// `kind` becomes the exception type. The request id is always added to `tags`.
    pub fn capture(
        &self,
        kind: &str,
        message: &str,
        tags: &[(&str, &str)],
    ) -> Option<PendingReport> {
        error!(
            request_id = %self.request_id,
            error_kind = kind,
            error = message,
            "request failed"
        );

        let reporter = self.reporter.as_ref()?;
        let mut tag_map: BTreeMap<String, String> = tags
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        tag_map.insert("request_id".to_string(), self.request_id.clone());

        let event = ErrorEvent {
            event_id: uuid::Uuid::new_v4().simple().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            level: "error".to_string(),
            platform: "other".to_string(),
            logger: self.logger.clone(),
            release: reporter.release.clone(),
            environment: reporter.environment.clone(),
            exception: ExceptionList {
                values: vec![ExceptionValue {
                    kind: kind.to_string(),
                    value: message.to_string(),
                }],
            },
            request: self.request.clone(),
            tags: tag_map,
        };

        Some(PendingReport {
            reporter: reporter.clone(),
            event,
        })
    }
}

/// An event waiting to be delivered.
pub struct PendingReport {
    reporter: ErrorReporter,
    event: ErrorEvent,
}

impl PendingReport {
    /// The event that will be sent.
    pub fn event(&self) -> &ErrorEvent {
        &self.event
    }

    /// Deliver the event. Failures are logged and dropped.
    pub async fn deliver(self) {
        match self.reporter.send(&self.event).await {
            Ok(()) => info!(
                event_id = %self.event.event_id,
                collector = self.reporter.dsn.host(),
                "error report delivered"
            ),
            Err(error) => warn!(
                event_id = %self.event.event_id,
                collector = self.reporter.dsn.host(),
                %error,
                "error report not delivered"
            ),
        }
    }
}
