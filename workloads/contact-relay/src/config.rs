//! Typed configuration resolved from application variables.
//!
//! Each route reads only the values it needs, so a route never fails
//! because another route's integration is unconfigured.

use edge_sdk::edge_core::Environment;
use edge_sdk::edge_observability::{Dsn, LoggingConfig};
use edge_sdk::edge_security::CorsPolicy;
use tracing::warn;

use crate::error::ConfigError;

pub const SENTRY_DSN: &str = "sentry_dsn";
pub const SENTRY_ENVIRONMENT: &str = "sentry_environment";
pub const CRISP_TOKEN: &str = "crisp_token";
pub const CRISP_WEBSITE_ID: &str = "crisp_website_id";
pub const NOTION_TOKEN: &str = "notion_token";
pub const NOTION_CONDUCTOR_DATABASE_ID: &str = "notion_conductor_database_id";
pub const NOTION_CONTACT_US_DATABASE_ID: &str = "notion_contact_us_database_id";
pub const CORS_ALLOWED_ORIGINS: &str = "cors_allowed_origins";
pub const LOG_FORMAT: &str = "log_format";
pub const LOG_LEVEL: &str = "log_level";

pub const NOTION_API_BASE: &str = "https://api.notion.com";
pub const CRISP_API_BASE: &str = "https://api.crisp.chat";

/// Trimmed value of a required variable.
pub fn required<E: Environment + ?Sized>(
    env: &E,
    name: &'static str,
) -> Result<String, ConfigError> {
    env.value(name).ok_or(ConfigError::Missing(name))
}

/// Content-management API credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotionConfig {
    pub token: String,
    pub base_url: String,
}

impl NotionConfig {
    pub fn from_env<E: Environment + ?Sized>(env: &E) -> Result<Self, ConfigError> {
        Ok(Self {
            token: required(env, NOTION_TOKEN)?,
            base_url: NOTION_API_BASE.to_string(),
        })
    }
}

/// Chat-widget API credentials.
///
/// The token is `<identifier>:<key>`, sent as basic credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrispConfig {
    pub website_id: String,
    pub identifier: String,
    pub key: String,
    pub base_url: String,
}

impl CrispConfig {
    pub fn from_env<E: Environment + ?Sized>(env: &E) -> Result<Self, ConfigError> {
        let token = required(env, CRISP_TOKEN)?;
        let (identifier, key) = token
            .split_once(':')
            .map(|(id, key)| (id.trim(), key.trim()))
            .filter(|(id, key)| !id.is_empty() && !key.is_empty())
            .ok_or_else(|| ConfigError::Malformed {
                name: CRISP_TOKEN,
                reason: "expected <identifier>:<key>".to_string(),
            })?;

        Ok(Self {
            website_id: required(env, CRISP_WEBSITE_ID)?,
            identifier: identifier.to_string(),
            key: key.to_string(),
            base_url: CRISP_API_BASE.to_string(),
        })
    }
}

/// Error-collector settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportingConfig {
    pub dsn: Dsn,
    pub environment: Option<String>,
}

impl ReportingConfig {
    /// `Ok(None)` when no DSN is configured.
    pub fn from_env<E: Environment + ?Sized>(env: &E) -> Result<Option<Self>, ConfigError> {
        let Some(raw) = env.value(SENTRY_DSN) else {
            return Ok(None);
        };
        let dsn = raw.parse::<Dsn>().map_err(|e| ConfigError::Malformed {
            name: SENTRY_DSN,
            reason: e.to_string(),
        })?;
        Ok(Some(Self {
            dsn,
            environment: env.value(SENTRY_ENVIRONMENT),
        }))
    }

    /// Like [`ReportingConfig::from_env`], but a bad DSN only disables reporting.
    pub fn resolve<E: Environment + ?Sized>(env: &E) -> Option<Self> {
        match Self::from_env(env) {
            Ok(config) => config,
            Err(error) => {
                warn!(%error, "error reporting disabled");
                None
            }
        }
    }
}

/// CORS policy from `cors_allowed_origins` (default: any origin).
pub fn cors_policy<E: Environment + ?Sized>(env: &E) -> CorsPolicy {
    let list = env.value(CORS_ALLOWED_ORIGINS).unwrap_or_else(|| "*".to_string());
    let (policy, rejected) = CorsPolicy::from_origin_list(&list);
    for error in rejected {
        warn!(%error, variable = CORS_ALLOWED_ORIGINS, "ignoring allowed origin");
    }
    policy
}

/// Logging settings; unusable values fall back to defaults.
pub fn logging<E: Environment + ?Sized>(env: &E) -> LoggingConfig {
    LoggingConfig::from_values(
        env.value(LOG_FORMAT).as_deref(),
        env.value(LOG_LEVEL).as_deref(),
    )
}
