//! `POST /api/contact-us`: open a chat conversation, then record it in the CMS.

use edge_sdk::edge_core::{EdgeResponse, Environment, RequestContext};
use edge_sdk::edge_data::SharedTransport;
use edge_sdk::edge_security::BodyLimit;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::form;
use crate::config::{self, CrispConfig, NotionConfig};
use crate::error::{RelayError, ValidationError};
use crate::integrations::{ConversationMeta, CrispClient, NotionClient, Record, SessionId};

/// Segment tagged on every conversation opened here.
const CONTACT_SEGMENT: &str = "contact-us";

#[derive(Debug, Deserialize)]
struct ContactUsForm {
    name: Option<String>,
    email: Option<String>,
    message: Option<String>,
    company: Option<String>,
    subject: Option<String>,
}

/// A validated contact-us submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactUs {
    pub name: String,
    pub email: String,
    pub message: String,
    pub company: Option<String>,
    pub subject: Option<String>,
}

impl ContactUs {
    pub fn from_request(req: &RequestContext, limit: &BodyLimit) -> Result<Self, ValidationError> {
        let raw: ContactUsForm = form::parse_body(req, limit)?;
        Ok(Self {
            name: form::required(raw.name, "name", form::MAX_NAME_CHARS)?,
            email: form::email(raw.email)?,
            message: form::required(raw.message, "message", form::MAX_MESSAGE_CHARS)?,
            company: form::optional(raw.company, "company", form::MAX_SHORT_TEXT_CHARS)?,
            subject: form::optional(raw.subject, "subject", form::MAX_SHORT_TEXT_CHARS)?,
        })
    }

    fn meta(&self) -> ConversationMeta {
        ConversationMeta {
            nickname: Some(self.name.clone()),
            email: Some(self.email.clone()),
            subject: self.subject.clone(),
            segments: vec![CONTACT_SEGMENT.to_string()],
        }
    }

    fn to_record(&self, session: &SessionId) -> Record {
        Record::new()
            .title("Name", &self.name)
            .email("Email", &self.email)
            .optional_text("Company", self.company.as_deref())
            .optional_text("Subject", self.subject.as_deref())
            .text("Message", &self.message)
            .text("Crisp Session", &session.0)
    }
}

pub async fn handle<E: Environment + ?Sized>(
    req: &RequestContext,
    env: &E,
    transport: &SharedTransport,
) -> Result<EdgeResponse, RelayError> {
    let crisp = CrispConfig::from_env(env)?;
    let notion = NotionConfig::from_env(env)?;
    let database_id = config::required(env, config::NOTION_CONTACT_US_DATABASE_ID)?;

    let contact = ContactUs::from_request(req, &BodyLimit::default())?;

    let chat = CrispClient::new(transport.clone(), &crisp);
    let session = chat.create_conversation().await?;
    chat.update_meta(&session, &contact.meta()).await?;
    chat.send_message(&session, &contact.message).await?;

    let id = NotionClient::new(transport.clone(), &notion)
        .create_record(&database_id, &contact.to_record(&session))
        .await?;

    info!(record_id = %id, session_id = %session, "contact request relayed");
    Ok(EdgeResponse::json(
        200,
        &json!({ "ok": true, "id": id.0, "session_id": session.0 }),
    ))
}

#[cfg(test)]
mod tests {
    use edge_sdk::edge_core::Method;
    use edge_sdk::edge_data::FetchError;
    use serde_json::Value;

    use super::*;
    use crate::testing::{full_env, happy_stub, post};

    const BODY: &str =
        r#"{"name":"Bob","email":"bob@example.com","message":"Need a demo","subject":"Sales"}"#;

    #[tokio::test]
    async fn test_relays_in_order() {
        let stub = happy_stub();
        let response = handle(&post("/api/contact-us", BODY), &full_env(), &stub.shared())
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(
            body,
            json!({"ok": true, "id": "page-123", "session_id": "session_abc"})
        );

        let calls = stub.calls();
        let steps: Vec<(Method, &str)> = calls
            .iter()
            .map(|c| (c.method.clone(), c.url.rsplit('/').next().unwrap_or_default()))
            .collect();
        assert_eq!(
            steps,
            vec![
                (Method::Post, "conversation"),
                (Method::Patch, "meta"),
                (Method::Post, "message"),
                (Method::Post, "pages"),
            ]
        );

        let meta = calls[1].body_json().unwrap();
        assert_eq!(meta["nickname"], "Bob");
        assert_eq!(meta["subject"], "Sales");
        assert_eq!(meta["segments"], json!(["contact-us"]));

        let record = calls[3].body_json().unwrap();
        assert_eq!(record["parent"]["database_id"], "db-contact");
        assert_eq!(
            record["properties"]["Crisp Session"]["rich_text"][0]["text"]["content"],
            "session_abc"
        );
    }

    #[tokio::test]
    async fn test_message_is_required() {
        let stub = happy_stub();
        let req = post("/api/contact-us", r#"{"name":"Bob","email":"bob@example.com"}"#);
        let err = handle(&req, &full_env(), &stub.shared()).await.unwrap_err();
        assert!(matches!(
            err,
            RelayError::Validation(ValidationError::MissingField("message"))
        ));
        assert!(stub.calls().is_empty());
    }

    #[tokio::test]
    async fn test_chat_failure_stops_before_cms() {
        let stub = happy_stub();
        stub.fail(
            "/conversation",
            FetchError::RequestError("connection reset".to_string()),
        );
        let err = handle(&post("/api/contact-us", BODY), &full_env(), &stub.shared())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "integration");
        assert_eq!(stub.calls().len(), 1);
        assert_eq!(stub.calls_to("/v1/pages"), 0);
    }

    #[tokio::test]
    async fn test_bad_crisp_token() {
        let env = full_env().with(config::CRISP_TOKEN, "no-colon");
        let err = handle(&post("/api/contact-us", BODY), &env, &happy_stub().shared())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed configuration value crisp_token: expected <identifier>:<key>"
        );
    }
}
