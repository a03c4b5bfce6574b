//! Clients for the two collaborators a submission is forwarded to.

pub mod crisp;
pub mod notion;

pub use crisp::{ConversationMeta, CrispClient, SessionId};
pub use notion::{NotionClient, Record, RecordId};

use edge_sdk::edge_data::{FetchError, Response};
use serde_json::Value;

use crate::error::IntegrationError;

/// Map a request-body serialization failure to the service it was for.
pub(crate) fn encode_error(
    service: &'static str,
) -> impl FnOnce(FetchError) -> IntegrationError {
    move |e| IntegrationError::Encode {
        service,
        detail: match e {
            FetchError::JsonError(detail) => detail,
            other => other.to_string(),
        },
    }
}

/// Map a transport failure to the service it was for.
pub(crate) fn transport_error(
    service: &'static str,
) -> impl FnOnce(FetchError) -> IntegrationError {
    move |source| IntegrationError::Transport { service, source }
}

/// Turn a non-2xx response into [`IntegrationError::Status`].
///
/// The message is the API's own `message`/`reason` field when the body is
/// JSON, otherwise the trimmed body text.
pub(crate) fn check_status(
    service: &'static str,
    response: Response,
) -> Result<Response, IntegrationError> {
    if response.is_success() {
        return Ok(response);
    }
    Err(IntegrationError::Status {
        service,
        status: response.status,
        message: error_message(&response),
    })
}

fn error_message(response: &Response) -> String {
    let from_json = response.json::<Value>().ok().and_then(|body| {
        ["message", "reason"]
            .iter()
            .find_map(|field| body.get(field).and_then(Value::as_str).map(str::to_string))
    });
    match from_json {
        Some(message) if !message.trim().is_empty() => message,
        _ => {
            let text = String::from_utf8_lossy(response.bytes()).trim().to_string();
            if text.is_empty() {
                format!("status {}", response.status)
            } else {
                text
            }
        }
    }
}
