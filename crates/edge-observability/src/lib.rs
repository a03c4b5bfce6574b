//! Observability infrastructure for edge workloads.
//!
//! This crate provides:
//! - `init_logging` - `tracing` subscriber setup, JSON or human-readable, on stderr
//! - `Dsn` / `ErrorReporter` - Client for the error collector
//! - `ErrorScope` - Per-request error capture with deferred delivery

mod logging;
mod report;

pub use logging::*;
pub use report::*;

// Re-export RequestId from edge-core for convenience
pub use edge_core::RequestId;
