//! Application state shared across handlers.

use chute_core::config::AppConfig;
use chute_registry::Registry;
use chute_storage::BlobStore;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Blob storage backend.
    pub storage: Arc<dyn BlobStore>,
    /// Ephemeral file registry.
    pub registry: Registry,
    /// Process start time, for the liveness probe.
    pub started_at: Instant,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Panics
    ///
    /// Panics if the server configuration fails validation; misconfiguration
    /// is caught at startup, not at request time.
    pub fn new(config: AppConfig, storage: Arc<dyn BlobStore>) -> Self {
        if let Err(error) = config.server.validate() {
            panic!("invalid server configuration: {error}");
        }

        let registry = Registry::new(
            storage.clone(),
            config.server.lifetime(),
            config.server.grace_period(),
        );

        Self {
            config: Arc::new(config),
            storage,
            registry,
            started_at: Instant::now(),
        }
    }

    /// Total request body limit for the upload endpoint: every file at the
    /// per-file cap, plus headroom for multipart framing.
    pub fn upload_body_limit(&self) -> usize {
        let files = self.config.server.max_files_per_upload as u64;
        let cap = files * self.config.server.max_file_size + 64 * 1024;
        usize::try_from(cap).unwrap_or(usize::MAX)
    }
}
