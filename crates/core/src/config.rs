//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum size of a single uploaded file in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Maximum number of files accepted in one upload request.
    #[serde(default = "default_max_files_per_upload")]
    pub max_files_per_upload: usize,
    /// Record lifetime in milliseconds. Fixed at registration, never extended.
    #[serde(default = "default_lifetime_ms")]
    pub lifetime_ms: u64,
    /// Extra delay in milliseconds added to the scheduled deletion timer
    /// beyond the nominal lifetime.
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_max_file_size() -> u64 {
    crate::MAX_FILE_SIZE
}

fn default_max_files_per_upload() -> usize {
    crate::MAX_FILES_PER_UPLOAD
}

fn default_lifetime_ms() -> u64 {
    crate::DEFAULT_LIFETIME_MS
}

fn default_grace_period_ms() -> u64 {
    crate::DEFAULT_GRACE_PERIOD_MS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_file_size: default_max_file_size(),
            max_files_per_upload: default_max_files_per_upload(),
            lifetime_ms: default_lifetime_ms(),
            grace_period_ms: default_grace_period_ms(),
        }
    }
}

impl ServerConfig {
    /// Get the record lifetime as a Duration.
    pub fn lifetime(&self) -> Duration {
        Duration::from_millis(self.lifetime_ms)
    }

    /// Get the expiry timer grace period as a Duration.
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    /// Validate the configuration, returning an error message for settings
    /// the server cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.lifetime_ms == 0 {
            return Err("lifetime_ms must be greater than zero".to_string());
        }
        if self.max_file_size == 0 {
            return Err("max_file_size must be greater than zero".to_string());
        }
        if self.max_files_per_upload == 0 {
            return Err("max_files_per_upload must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage.
    Filesystem {
        /// Root directory for uploaded blobs. Created at startup if absent.
        path: PathBuf,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Filesystem {
            path: PathBuf::from("uploads"),
        }
    }
}

impl StorageConfig {
    /// Validate the storage configuration.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            StorageConfig::Filesystem { path } => {
                if path.as_os_str().is_empty() {
                    return Err("storage path must not be empty".to_string());
                }
                Ok(())
            }
        }
    }
}

/// Top-level application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage backend configuration. Defaults to a local `uploads`
    /// directory created at startup if absent.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Create a test configuration rooted at the given scratch directory.
    ///
    /// **For testing only.**
    pub fn for_testing(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::Filesystem {
                path: storage_root.into(),
            },
        }
    }
}
