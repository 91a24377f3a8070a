//! Blob storage abstraction and backends for Chute.
//!
//! This crate provides:
//! - The `BlobStore` trait: streaming writes with atomic publish, streaming
//!   reads, and delete-by-key
//! - The local filesystem backend that keeps uploaded bytes under a root
//!   directory created at startup

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::filesystem::FilesystemBackend;
pub use error::{StorageError, StorageResult};
pub use traits::{BlobMeta, BlobStore, ByteStream, StreamingUpload};

use chute_core::config::StorageConfig;
use std::sync::Arc;

/// Create a blob store from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn BlobStore>> {
    config.validate().map_err(StorageError::Config)?;

    match config {
        StorageConfig::Filesystem { path } => {
            let backend = FilesystemBackend::new(path).await?;
            Ok(Arc::new(backend))
        }
    }
}
