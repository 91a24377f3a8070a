//! HTTP API server for the Chute ephemeral file relay.
//!
//! This crate provides the HTTP surface:
//! - Multipart upload of up to ten files per request
//! - Listing of live files with remaining lifetime
//! - Streaming download with the original filename suggested
//! - Manual deletion
//! - Liveness probe

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
