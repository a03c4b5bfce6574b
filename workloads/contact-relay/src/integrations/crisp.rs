//! Chat-widget client: opens a Crisp conversation for a submission.

use std::fmt;

use edge_sdk::edge_data::{DependencyTag, FetchClient, Response, SharedTransport};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::{check_status, encode_error, transport_error};
use crate::config::CrispConfig;
use crate::error::IntegrationError;

pub const SERVICE: &str = "crisp";

/// Session id of a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visitor details shown alongside the conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<String>,
}

/// Every Crisp response is wrapped in this envelope.
///
/// The API can answer 2xx with `"error": true`; that is a failure too.
#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
    data: Option<T>,
}

#[derive(Deserialize)]
struct ConversationCreated {
    session_id: String,
}

/// Client for one Crisp website.
#[derive(Clone)]
pub struct CrispClient {
    client: FetchClient,
    website_id: String,
    identifier: String,
    key: String,
}

impl CrispClient {
    pub fn new(transport: SharedTransport, config: &CrispConfig) -> Self {
        let client = FetchClient::new(transport, DependencyTag::Messaging)
            .with_base_url(config.base_url.clone())
            .with_default_header("x-crisp-tier", "plugin");
        Self {
            client,
            website_id: config.website_id.clone(),
            identifier: config.identifier.clone(),
            key: config.key.clone(),
        }
    }

    fn conversation_path(&self) -> String {
        format!("/v1/website/{}/conversation", self.website_id)
    }

    /// Open a new conversation.
    pub async fn create_conversation(&self) -> Result<SessionId, IntegrationError> {
        let response = self
            .client
            .post(self.conversation_path())
            .basic_auth(&self.identifier, Some(self.key.as_str()))
            .send()
            .await
            .map_err(transport_error(SERVICE))?;

        let created: ConversationCreated =
            unwrap_envelope(response)?.ok_or_else(|| IntegrationError::MalformedResponse {
                service: SERVICE,
                detail: "conversation response has no data".to_string(),
            })?;

        info!(session_id = %created.session_id, "conversation created");
        Ok(SessionId(created.session_id))
    }

    /// Attach visitor details to a conversation.
    pub async fn update_meta(
        &self,
        session: &SessionId,
        meta: &ConversationMeta,
    ) -> Result<(), IntegrationError> {
        let response = self
            .client
            .patch(format!("{}/{}/meta", self.conversation_path(), session))
            .basic_auth(&self.identifier, Some(self.key.as_str()))
            .json(meta)
            .map_err(encode_error(SERVICE))?
            .send()
            .await
            .map_err(transport_error(SERVICE))?;

        unwrap_envelope::<Value>(response)?;
        Ok(())
    }

    /// Post `content` as a text message from the visitor.
    pub async fn send_message(
        &self,
        session: &SessionId,
        content: &str,
    ) -> Result<(), IntegrationError> {
        let message = json!({
            "type": "text",
            "from": "user",
            "origin": "chat",
            "content": content,
        });

        let response = self
            .client
            .post(format!("{}/{}/message", self.conversation_path(), session))
            .basic_auth(&self.identifier, Some(self.key.as_str()))
            .json(&message)
            .map_err(encode_error(SERVICE))?
            .send()
            .await
            .map_err(transport_error(SERVICE))?;

        unwrap_envelope::<Value>(response)?;
        Ok(())
    }
}

fn unwrap_envelope<T: DeserializeOwned>(response: Response) -> Result<Option<T>, IntegrationError> {
    let envelope: Envelope<T> =
        check_status(SERVICE, response)?
            .json()
            .map_err(|e| IntegrationError::MalformedResponse {
                service: SERVICE,
                detail: e.to_string(),
            })?;

    if envelope.error {
        return Err(IntegrationError::Rejected {
            service: SERVICE,
            reason: envelope.reason.unwrap_or_else(|| "unknown error".to_string()),
        });
    }
    Ok(envelope.data)
}
