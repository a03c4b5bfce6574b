//! Cross-origin resource sharing policy.

use serde::{Deserialize, Serialize};

/// Default methods advertised to browsers.
pub const DEFAULT_ALLOW_METHODS: &[&str] = &["GET", "HEAD", "POST", "OPTIONS"];

/// Default request headers advertised when the preflight does not name any.
pub const DEFAULT_ALLOW_HEADERS: &[&str] = &["Content-Type"];

/// Default preflight cache lifetime (one day).
pub const DEFAULT_MAX_AGE_SECS: u32 = 86_400;

/// Errors from parsing an allowed-origin entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CorsError {
    #[error("origin must include a scheme: {0}")]
    MissingScheme(String),

    #[error("origin must not include a path: {0}")]
    HasPath(String),

    #[error("only one wildcard is supported: {0}")]
    TooManyWildcards(String),
}

/// Which origins may read responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OriginRule {
    /// Any origin; answered with `*`.
    Any,
    /// Listed origins; exact matches or patterns with a single `*`.
    List(Vec<String>),
}

/// CORS policy for a workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsPolicy {
    origins: OriginRule,
    allow_methods: Vec<String>,
    allow_headers: Vec<String>,
    max_age_secs: u32,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::permissive()
    }
}

impl CorsPolicy {
    /// Allow any origin with the default methods and headers.
    pub fn permissive() -> Self {
        Self {
            origins: OriginRule::Any,
            allow_methods: DEFAULT_ALLOW_METHODS.iter().map(|m| m.to_string()).collect(),
            allow_headers: DEFAULT_ALLOW_HEADERS.iter().map(|h| h.to_string()).collect(),
            max_age_secs: DEFAULT_MAX_AGE_SECS,
        }
    }

    /// Allow only the given origins.
    pub fn with_origins(origins: Vec<String>) -> Self {
        Self {
            origins: OriginRule::List(origins),
            ..Self::permissive()
        }
    }

    /// Parse one origin entry (`https://www.example.com`, `https://*.example.com`).
    pub fn parse_origin(entry: &str) -> Result<String, CorsError> {
        let entry = entry.trim().trim_end_matches('/').to_ascii_lowercase();
        let (_, authority) = entry
            .split_once("://")
            .ok_or_else(|| CorsError::MissingScheme(entry.clone()))?;
        if authority.contains('/') {
            return Err(CorsError::HasPath(entry));
        }
        if entry.matches('*').count() > 1 {
            return Err(CorsError::TooManyWildcards(entry));
        }
        Ok(entry)
    }

    /// Build from a comma-separated list. `*` anywhere allows every origin.
    ///
    /// Entries that fail to parse are returned alongside the policy so the
    /// caller can log them; they never widen the policy.
    pub fn from_origin_list(list: &str) -> (Self, Vec<CorsError>) {
        let entries: Vec<&str> = list
            .split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .collect();
        if entries.is_empty() || entries.contains(&"*") {
            return (Self::permissive(), Vec::new());
        }

        let mut origins = Vec::new();
        let mut rejected = Vec::new();
        for entry in entries {
            match Self::parse_origin(entry) {
                Ok(origin) => origins.push(origin),
                Err(e) => rejected.push(e),
            }
        }
        (Self::with_origins(origins), rejected)
    }

    /// Check if an `Origin` header value is allowed.
    pub fn allows_origin(&self, origin: &str) -> bool {
        match &self.origins {
            OriginRule::Any => true,
            OriginRule::List(list) => {
                let origin = origin.trim().to_ascii_lowercase();
                list.iter().any(|pattern| matches_pattern(&origin, pattern))
            }
        }
    }

    /// Compute CORS response headers.
    ///
    /// `origin` is the request's `Origin`, `requested_headers` its
    /// `Access-Control-Request-Headers`. `preflight` adds the cache lifetime.
    pub fn headers_for(
        &self,
        origin: Option<&str>,
        requested_headers: Option<&str>,
        preflight: bool,
    ) -> Vec<(String, String)> {
        let mut headers = Vec::new();

        match (&self.origins, origin) {
            (OriginRule::Any, _) => {
                headers.push(("access-control-allow-origin".to_string(), "*".to_string()));
            }
            (OriginRule::List(_), Some(origin)) if self.allows_origin(origin) => {
                headers.push((
                    "access-control-allow-origin".to_string(),
                    origin.trim().to_string(),
                ));
                headers.push(("vary".to_string(), "Origin".to_string()));
            }
            (OriginRule::List(_), _) => {
                // Response still varies by origin even when this one is refused.
                headers.push(("vary".to_string(), "Origin".to_string()));
            }
        }

        headers.push((
            "access-control-allow-methods".to_string(),
            self.allow_methods.join(", "),
        ));

        let allow_headers = match requested_headers.map(str::trim) {
            Some(requested) if !requested.is_empty() => requested.to_string(),
            _ => self.allow_headers.join(", "),
        };
        headers.push(("access-control-allow-headers".to_string(), allow_headers));

        if preflight {
            headers.push((
                "access-control-max-age".to_string(),
                self.max_age_secs.to_string(),
            ));
        }

        headers
    }
}

fn matches_pattern(origin: &str, pattern: &str) -> bool {
    match pattern.split_once('*') {
        None => origin == pattern,
        // "https://*.example.com": the wildcard must cover at least one character.
        Some((prefix, suffix)) => {
            origin.len() > prefix.len() + suffix.len()
                && origin.starts_with(prefix)
                && origin.ends_with(suffix)
        }
    }
}
