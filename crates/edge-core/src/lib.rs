//! Core abstractions for edge workloads.
//!
//! This crate provides the fundamental, host-neutral types:
//! - `RequestContext` - Inbound request with typed method, query and headers
//! - `EdgeResponse` - Platform-neutral response
//! - `Environment` - Named configuration values resolved per invocation
//! - `TimingContext` - Request timing

mod config;
mod context;
mod lifecycle;
mod response;

pub use config::*;
pub use context::*;
pub use lifecycle::*;
pub use response::*;
