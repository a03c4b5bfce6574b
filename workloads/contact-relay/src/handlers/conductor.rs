//! `POST /api/conductor`: record a conductor enquiry in the CMS.

use edge_sdk::edge_core::{EdgeResponse, Environment, RequestContext};
use edge_sdk::edge_data::SharedTransport;
use edge_sdk::edge_security::BodyLimit;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::form;
use crate::config::{self, NotionConfig};
use crate::error::{RelayError, ValidationError};
use crate::integrations::{NotionClient, Record};

#[derive(Debug, Deserialize)]
struct ConductorForm {
    name: Option<String>,
    email: Option<String>,
    company: Option<String>,
    role: Option<String>,
    message: Option<String>,
}

/// A validated conductor enquiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConductorContact {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub role: Option<String>,
    pub message: Option<String>,
}

impl ConductorContact {
    pub fn from_request(req: &RequestContext, limit: &BodyLimit) -> Result<Self, ValidationError> {
        let raw: ConductorForm = form::parse_body(req, limit)?;
        Ok(Self {
            name: form::required(raw.name, "name", form::MAX_NAME_CHARS)?,
            email: form::email(raw.email)?,
            company: form::optional(raw.company, "company", form::MAX_SHORT_TEXT_CHARS)?,
            role: form::optional(raw.role, "role", form::MAX_SHORT_TEXT_CHARS)?,
            message: form::optional(raw.message, "message", form::MAX_MESSAGE_CHARS)?,
        })
    }

    pub fn to_record(&self) -> Record {
        Record::new()
            .title("Name", &self.name)
            .email("Email", &self.email)
            .optional_text("Company", self.company.as_deref())
            .optional_text("Role", self.role.as_deref())
            .optional_text("Message", self.message.as_deref())
            .select("Source", "website")
    }
}

pub async fn handle<E: Environment + ?Sized>(
    req: &RequestContext,
    env: &E,
    transport: &SharedTransport,
) -> Result<EdgeResponse, RelayError> {
    let notion = NotionConfig::from_env(env)?;
    let database_id = config::required(env, config::NOTION_CONDUCTOR_DATABASE_ID)?;

    let contact = ConductorContact::from_request(req, &BodyLimit::default())?;

    let id = NotionClient::new(transport.clone(), &notion)
        .create_record(&database_id, &contact.to_record())
        .await?;

    info!(record_id = %id, "conductor enquiry recorded");
    Ok(EdgeResponse::json(200, &json!({ "ok": true, "id": id.0 })))
}

#[cfg(test)]
mod tests {
    use edge_sdk::edge_core::Method;
    use serde_json::Value;

    use super::*;
    use crate::handlers::contact_us;
    use crate::testing::{full_env, happy_stub, post};

    #[test]
    fn test_from_request() {
        let req = post(
            "/api/conductor",
            r#"{"name":" Alice ","email":"a@example.com","role":"Maestro","company":""}"#,
        );
        let contact = ConductorContact::from_request(&req, &BodyLimit::default()).unwrap();
        assert_eq!(contact.name, "Alice");
        assert_eq!(contact.role.as_deref(), Some("Maestro"));
        assert_eq!(contact.company, None);

        let props = contact.to_record().to_properties();
        assert_eq!(props["Name"]["title"][0]["text"]["content"], "Alice");
        assert_eq!(props["Role"]["rich_text"][0]["text"]["content"], "Maestro");
        assert_eq!(props["Source"], json!({"select": {"name": "website"}}));
        assert!(!props.contains_key("Company"));
    }

    #[test]
    fn test_missing_name() {
        let req = post("/api/conductor", r#"{"email":"a@example.com"}"#);
        assert_eq!(
            ConductorContact::from_request(&req, &BodyLimit::default()),
            Err(ValidationError::MissingField("name"))
        );
    }

    #[tokio::test]
    async fn test_records_enquiry() {
        let stub = happy_stub();
        let req = post("/api/conductor", r#"{"name":"Alice","email":"a@example.com"}"#);

        let response = handle(&req, &full_env(), &stub.shared()).await.unwrap();
        assert_eq!(response.status(), 200);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, json!({"ok": true, "id": "page-123"}));

        let calls = stub.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::Post);
        let sent = calls[0].body_json().unwrap();
        assert_eq!(sent["parent"]["database_id"], "db-conductor");
    }

    #[tokio::test]
    async fn test_needs_only_cms_config() {
        let env = full_env()
            .without(config::CRISP_TOKEN)
            .without(config::CRISP_WEBSITE_ID)
            .without(config::NOTION_CONTACT_US_DATABASE_ID);
        let req = post("/api/conductor", r#"{"name":"Alice","email":"a@example.com"}"#);
        assert!(handle(&req, &env, &happy_stub().shared()).await.is_ok());
    }

    #[tokio::test]
    async fn test_blank_chat_variables_count_as_unset() {
        let env = full_env()
            .with(config::CRISP_TOKEN, "")
            .with(config::CRISP_WEBSITE_ID, "")
            .with(config::NOTION_CONTACT_US_DATABASE_ID, " ");
        let req = post("/api/conductor", r#"{"name":"Alice","email":"a@example.com"}"#);
        assert!(handle(&req, &env, &happy_stub().shared()).await.is_ok());

        let req = post(
            "/api/contact-us",
            r#"{"name":"Bob","email":"b@example.com","message":"hi"}"#,
        );
        let err = contact_us::handle(&req, &env, &happy_stub().shared())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "missing configuration value: crisp_token");
    }

    #[tokio::test]
    async fn test_missing_database_id() {
        let env = full_env().without(config::NOTION_CONDUCTOR_DATABASE_ID);
        let req = post("/api/conductor", r#"{"name":"Alice","email":"a@example.com"}"#);
        let stub = happy_stub();
        let err = handle(&req, &env, &stub.shared()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing configuration value: notion_conductor_database_id"
        );
        assert!(stub.calls().is_empty());
    }
}
