//! Outbound HTTP for edge workloads.
//!
//! This crate provides:
//! - `FetchClient` - Builder API for JSON requests to a third-party service
//! - `HttpTransport` - The seam between workloads and the host's outbound HTTP
//! - `DependencyTag` - Which collaborator a request is for, used in logs and errors
//!
//! # Example
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use edge_data::{DependencyTag, FetchClient, SpinTransport};
//!
//! let client = FetchClient::new(Rc::new(SpinTransport), DependencyTag::Cms)
//!     .with_base_url("https://api.notion.com")
//!     .with_default_header("notion-version", "2022-06-28");
//!
//! let page: serde_json::Value = client
//!     .post("/v1/pages")
//!     .bearer_auth(token)
//!     .json(&payload)?
//!     .send()
//!     .await?
//!     .error_for_status()?
//!     .json()?;
//! ```

mod client;
mod dependency;
mod error;
mod request;
mod response;
mod transport;

pub use client::*;
pub use dependency::*;
pub use error::*;
pub use request::*;
pub use response::*;
pub use transport::*;
