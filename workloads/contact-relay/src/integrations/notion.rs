//! Content-management client: one page per submission in a Notion database.

use std::fmt;

use edge_sdk::edge_data::{DependencyTag, FetchClient, SharedTransport};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use super::{check_status, encode_error, transport_error};
use crate::config::NotionConfig;
use crate::error::IntegrationError;

pub const SERVICE: &str = "notion";

/// API version pinned in every request.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Longest content of one rich-text object.
const MAX_TEXT_CHUNK: usize = 2000;

/// Id of a created page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordId(pub String);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A typed database property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Title(String),
    RichText(String),
    Email(String),
    Select(String),
}

impl PropertyValue {
    fn to_json(&self) -> Value {
        match self {
            Self::Title(text) => json!({ "title": text_objects(text) }),
            Self::RichText(text) => json!({ "rich_text": text_objects(text) }),
            Self::Email(email) => json!({ "email": email }),
            Self::Select(name) => json!({ "select": { "name": name } }),
        }
    }
}

/// Rich-text array, split so no object exceeds the API's length limit.
fn text_objects(text: &str) -> Vec<Value> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }
    chars
        .chunks(MAX_TEXT_CHUNK)
        .map(|chunk| json!({ "text": { "content": chunk.iter().collect::<String>() } }))
        .collect()
}

/// Properties of one page, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    properties: Vec<(String, PropertyValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(self, name: &str, value: impl Into<String>) -> Self {
        self.with(name, PropertyValue::Title(value.into()))
    }

    pub fn text(self, name: &str, value: impl Into<String>) -> Self {
        self.with(name, PropertyValue::RichText(value.into()))
    }

    /// Rich text, skipped when absent.
    pub fn optional_text(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.text(name, value),
            None => self,
        }
    }

    pub fn email(self, name: &str, value: impl Into<String>) -> Self {
        self.with(name, PropertyValue::Email(value.into()))
    }

    pub fn select(self, name: &str, value: impl Into<String>) -> Self {
        self.with(name, PropertyValue::Select(value.into()))
    }

    fn with(mut self, name: &str, value: PropertyValue) -> Self {
        self.properties.push((name.to_string(), value));
        self
    }

    /// The `properties` object of a create-page request.
    pub fn to_properties(&self) -> Map<String, Value> {
        self.properties
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect()
    }
}

#[derive(Deserialize)]
struct PageCreated {
    id: String,
}

/// Client for the pages endpoint.
#[derive(Clone)]
pub struct NotionClient {
    client: FetchClient,
    token: String,
}

impl NotionClient {
    pub fn new(transport: SharedTransport, config: &NotionConfig) -> Self {
        let client = FetchClient::new(transport, DependencyTag::Cms)
            .with_base_url(config.base_url.clone())
            .with_default_header("notion-version", NOTION_VERSION);
        Self {
            client,
            token: config.token.clone(),
        }
    }

    /// Create one page in `database_id`.
    pub async fn create_record(
        &self,
        database_id: &str,
        record: &Record,
    ) -> Result<RecordId, IntegrationError> {
        let payload = json!({
            "parent": { "database_id": database_id },
            "properties": record.to_properties(),
        });

        let response = self
            .client
            .post("/v1/pages")
            .bearer_auth(&self.token)
            .json(&payload)
            .map_err(encode_error(SERVICE))?
            .send()
            .await
            .map_err(transport_error(SERVICE))?;

        let page: PageCreated = check_status(SERVICE, response)?.json().map_err(|e| {
            IntegrationError::MalformedResponse {
                service: SERVICE,
                detail: e.to_string(),
            }
        })?;

        info!(record_id = %page.id, database_id, "record created");
        Ok(RecordId(page.id))
    }
}

#[cfg(test)]
mod tests {
    use edge_sdk::edge_core::Method;
    use edge_sdk::edge_data::FetchError;

    use super::*;
    use crate::testing::StubTransport;

    fn config() -> NotionConfig {
        NotionConfig {
            token: "secret_abc".to_string(),
            base_url: "https://api.notion.com".to_string(),
        }
    }

    fn record() -> Record {
        Record::new()
            .title("Name", "Alice")
            .email("Email", "a@example.com")
            .optional_text("Company", None)
            .select("Source", "website")
    }

    #[test]
    fn test_properties_json() {
        let props = record().to_properties();
        assert_eq!(props["Name"], json!({"title": [{"text": {"content": "Alice"}}]}));
        assert_eq!(props["Email"], json!({"email": "a@example.com"}));
        assert_eq!(props["Source"], json!({"select": {"name": "website"}}));
        assert!(!props.contains_key("Company"));
    }

    #[test]
    fn test_long_text_is_chunked() {
        let long = "é".repeat(MAX_TEXT_CHUNK + 5);
        let props = Record::new().text("Message", long).to_properties();
        let chunks = props["Message"]["rich_text"].as_array().unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(
            chunks[1]["text"]["content"].as_str().unwrap().chars().count(),
            5
        );
    }

    #[tokio::test]
    async fn test_create_record_request() {
        let stub = StubTransport::new();
        stub.on(Method::Post, "/v1/pages", 200, json!({"object": "page", "id": "page-1"}));

        let client = NotionClient::new(stub.shared(), &config());
        let id = client.create_record("db-1", &record()).await.unwrap();
        assert_eq!(id, RecordId("page-1".to_string()));

        let calls = stub.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url, "https://api.notion.com/v1/pages");
        assert_eq!(calls[0].header_value("authorization"), Some("Bearer secret_abc"));
        assert_eq!(calls[0].header_value("notion-version"), Some(NOTION_VERSION));
        let body = calls[0].body_json().unwrap();
        assert_eq!(body["parent"]["database_id"], "db-1");
        assert_eq!(body["properties"]["Name"]["title"][0]["text"]["content"], "Alice");
    }

    #[tokio::test]
    async fn test_api_error_message() {
        let stub = StubTransport::new();
        stub.on(
            Method::Post,
            "/v1/pages",
            400,
            json!({
                "object": "error",
                "code": "validation_error",
                "message": "Email is not a property"
            }),
        );
        let err = NotionClient::new(stub.shared(), &config())
            .create_record("db-1", &record())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "notion returned HTTP 400: Email is not a property");
    }

    #[tokio::test]
    async fn test_missing_id_is_malformed() {
        let stub = StubTransport::new();
        stub.on(Method::Post, "/v1/pages", 200, json!({"object": "page"}));
        let err = NotionClient::new(stub.shared(), &config())
            .create_record("db-1", &record())
            .await
            .unwrap_err();
        assert!(matches!(err, IntegrationError::MalformedResponse { service: SERVICE, .. }));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let stub = StubTransport::new();
        stub.fail("/v1/pages", FetchError::RequestError("dns failure".to_string()));
        let err = NotionClient::new(stub.shared(), &config())
            .create_record("db-1", &record())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "notion request failed: request failed: dns failure");
    }
}
