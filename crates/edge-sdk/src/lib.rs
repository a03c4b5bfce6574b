//! Public SDK for edge workloads.
//!
//! This crate re-exports all platform functionality:
//!
//! ```ignore
//! use edge_sdk::prelude::*;
//!
//! async fn handle(
//!     ctx: &RequestContext,
//!     env: &impl Environment,
//!     transport: SharedTransport,
//! ) -> EdgeResponse {
//!     let scope = ErrorScope::new(ctx, None);
//!     let cors = CorsPolicy::permissive();
//!
//!     let client = FetchClient::new(transport, DependencyTag::Cms)
//!         .with_base_url("https://api.example.com");
//!     match client.get("/v1/items").send().await {
//!         Ok(resp) => {
//!             let body: serde_json::Value = resp.json().unwrap_or_default();
//!             EdgeResponse::json(200, &body)
//!         }
//!         Err(e) => {
//!             let _pending = scope.capture("FetchError", &e.to_string(), &[]);
//!             EdgeResponse::json_error(500, &e.to_string())
//!         }
//!     }
//! }
//! ```

pub use edge_core;
pub use edge_data;
pub use edge_observability;
pub use edge_security;

/// Prelude for convenient imports.
pub mod prelude {
    pub use edge_core::*;
    pub use edge_data::*;
    pub use edge_observability::*;
    pub use edge_security::*;
}
