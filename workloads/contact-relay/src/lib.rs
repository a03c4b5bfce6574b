//! Contact-form relay for the marketing site.
//!
//! Routes:
//! - `OPTIONS *` - CORS preflight, 204
//! - `POST /api/conductor` - record a conductor enquiry in the CMS
//! - `POST /api/contact-us` - open a chat conversation and record it in the CMS
//!
//! Everything else is a 404. Route failures become a 500 `{"error": ..}`
//! and are reported to the error collector after the response is sent.

pub mod config;
pub mod error;
pub mod handlers;
pub mod integrations;
pub mod router;

#[cfg(target_arch = "wasm32")]
mod component;

#[cfg(test)]
mod testing;

pub use error::{ConfigError, IntegrationError, RelayError, ValidationError};
pub use router::{handle, Handled, Route};
