//! Inbound request limits.

use serde::{Deserialize, Serialize};

/// Default maximum request body (64 KiB); contact forms are small.
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// Error when a limit is exceeded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LimitError {
    #[error("request body too large: {actual} bytes (max {max})")]
    BodyTooLarge { actual: usize, max: usize },

    #[error("request body is empty")]
    EmptyBody,
}

/// Request body size limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyLimit {
    /// Maximum request body size in bytes.
    pub max_bytes: usize,
    /// Whether an empty body is refused.
    pub require_body: bool,
}

impl Default for BodyLimit {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BODY_BYTES,
            require_body: true,
        }
    }
}

impl BodyLimit {
    /// Create a limit of `max_bytes`.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            ..Self::default()
        }
    }

    /// Allow or refuse empty bodies.
    pub fn require_body(mut self, require: bool) -> Self {
        self.require_body = require;
        self
    }

    /// Check a body length against the limit.
    pub fn check(&self, len: usize) -> Result<(), LimitError> {
        if len == 0 && self.require_body {
            return Err(LimitError::EmptyBody);
        }
        if len > self.max_bytes {
            return Err(LimitError::BodyTooLarge {
                actual: len,
                max: self.max_bytes,
            });
        }
        Ok(())
    }
}
