//! Relay error taxonomy.
//!
//! Every variant ends at the same boundary in [`crate::router`]: a 500 JSON
//! response plus an error report. A routing miss is not an error.

use edge_sdk::edge_data::FetchError;
use edge_sdk::edge_security::LimitError;
use thiserror::Error;

/// A required configuration value is missing or unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing configuration value: {0}")]
    Missing(&'static str),

    #[error("malformed configuration value {name}: {reason}")]
    Malformed { name: &'static str, reason: String },
}

/// The request body does not satisfy a route's schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Body(#[from] LimitError),

    #[error("malformed JSON body: {0}")]
    MalformedJson(String),

    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("field {field} is too long (max {max} characters)")]
    TooLong { field: &'static str, max: usize },
}

impl From<serde_json::Error> for ValidationError {
    fn from(e: serde_json::Error) -> Self {
        ValidationError::MalformedJson(e.to_string())
    }
}

/// An outbound call to a collaborator failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrationError {
    /// The request body could not be serialized.
    #[error("failed to encode {service} request: {detail}")]
    Encode { service: &'static str, detail: String },

    /// No response at all.
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: FetchError,
    },

    /// Non-2xx response.
    #[error("{service} returned HTTP {status}: {message}")]
    Status {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// 2xx response flagged as a logical error by the API.
    #[error("{service} rejected the request: {reason}")]
    Rejected { service: &'static str, reason: String },

    /// 2xx response missing the fields we read.
    #[error("{service} sent an unexpected response: {detail}")]
    MalformedResponse { service: &'static str, detail: String },
}

impl IntegrationError {
    /// Collaborator the failing call was for.
    pub fn service(&self) -> &'static str {
        match self {
            Self::Encode { service, .. }
            | Self::Transport { service, .. }
            | Self::Status { service, .. }
            | Self::Rejected { service, .. }
            | Self::MalformedResponse { service, .. } => service,
        }
    }
}

/// Any failure of a matched route.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Integration(#[from] IntegrationError),
}

impl RelayError {
    /// Short class name, used as the `error_kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Validation(_) => "validation",
            Self::Integration(_) => "integration",
        }
    }

    /// Exception type recorded on the error event.
    pub fn exception_type(&self) -> &'static str {
        match self {
            Self::Config(_) => "ConfigError",
            Self::Validation(_) => "ValidationError",
            Self::Integration(_) => "IntegrationError",
        }
    }

    /// Collaborator involved, for integration failures.
    pub fn service(&self) -> Option<&'static str> {
        match self {
            Self::Integration(e) => Some(e.service()),
            _ => None,
        }
    }

    /// Message returned to the caller.
    pub fn public_message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = RelayError::from(ConfigError::Missing("notion_token"));
        assert_eq!(err.kind(), "config");
        assert_eq!(err.public_message(), "missing configuration value: notion_token");

        let err = RelayError::from(ValidationError::from(LimitError::EmptyBody));
        assert_eq!(err.kind(), "validation");
        assert_eq!(err.public_message(), "request body is empty");

        let err = RelayError::from(IntegrationError::Status {
            service: "notion",
            status: 400,
            message: "body failed validation".to_string(),
        });
        assert_eq!(err.exception_type(), "IntegrationError");
        assert_eq!(err.service(), Some("notion"));
        assert_eq!(
            err.public_message(),
            "notion returned HTTP 400: body failed validation"
        );
    }

    #[test]
    fn test_service_only_for_integrations() {
        assert_eq!(RelayError::from(ConfigError::Missing("crisp_token")).service(), None);
        assert_eq!(RelayError::from(ValidationError::NotAnObject).service(), None);

        let err = RelayError::from(IntegrationError::Encode {
            service: "crisp",
            detail: "key must be a string".to_string(),
        });
        assert_eq!(err.service(), Some("crisp"));
        assert_eq!(
            err.public_message(),
            "failed to encode crisp request: key must be a string"
        );
    }

    #[test]
    fn test_transport_error_names_service() {
        let err = IntegrationError::Transport {
            service: "crisp",
            source: FetchError::RequestError("connection refused".to_string()),
        };
        assert_eq!(err.service(), "crisp");
        assert_eq!(
            err.to_string(),
            "crisp request failed: request failed: connection refused"
        );
    }
}
