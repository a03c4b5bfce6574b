//! Security infrastructure for edge workloads.
//!
//! This crate provides:
//! - `CorsPolicy` - Cross-origin header computation for browser callers
//! - `BodyLimit` - Inbound request body size limit
//!
//! # Example
//!
//! ```ignore
//! use edge_security::{BodyLimit, CorsPolicy};
//!
//! let (cors, _rejected) =
//!     CorsPolicy::from_origin_list("https://www.example.com, https://*.example.dev");
//! let headers = cors.headers_for(Some("https://www.example.com"), None, false);
//!
//! BodyLimit::default().check(body.len())?;
//! ```

mod cors;
mod limits;

pub use cors::*;
pub use limits::*;
