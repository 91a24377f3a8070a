//! Core domain types and shared logic for the Chute ephemeral file relay.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Opaque file handles
//! - Configuration types
//! - Shared size and lifetime constants

pub mod config;
pub mod error;
pub mod handle;

pub use config::{AppConfig, ServerConfig, StorageConfig};
pub use error::{Error, Result};
pub use handle::FileHandle;

/// Maximum size of a single uploaded file: 10 MiB.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Maximum number of files accepted in one upload request.
pub const MAX_FILES_PER_UPLOAD: usize = 10;

/// Default record lifetime: 2 minutes.
pub const DEFAULT_LIFETIME_MS: u64 = 2 * 60 * 1000;

/// Default grace period added to the scheduled deletion timer: 2 seconds.
///
/// The grace period lets lazy expiry on the read path win the race against
/// the timer, so clients polling right at the deadline see the record vanish
/// from listings before the reaper touches it.
pub const DEFAULT_GRACE_PERIOD_MS: u64 = 2 * 1000;
