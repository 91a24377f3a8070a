//! Registry record types.

use chute_core::FileHandle;
use time::OffsetDateTime;
use tokio::task::JoinHandle;

/// One registry entry per uploaded file.
///
/// The record owns its blob location exclusively until deletion, and holds
/// the handle of the scheduled deletion task so a manual delete can cancel
/// the pending timer.
pub struct Record {
    /// The handle this record is keyed by.
    pub handle: FileHandle,
    /// Blob store key for the uploaded bytes. Never derived from the
    /// client-supplied filename.
    pub location: String,
    /// Original client-supplied filename. Untrusted; used only as the
    /// suggested filename on download.
    pub display_name: String,
    /// Size of the stored blob in bytes.
    pub size: u64,
    /// Registration timestamp.
    pub created_at: OffsetDateTime,
    /// `created_at + lifetime`. Fixed at creation, never extended.
    pub expires_at: OffsetDateTime,
    /// Scheduled deletion task, aborted when any other trigger deletes the
    /// record first.
    pub(crate) timer: Option<JoinHandle<()>>,
}

/// Summary returned to the caller after a successful registration.
#[derive(Clone, Debug)]
pub struct RegisteredFile {
    pub handle: FileHandle,
    pub display_name: String,
    pub expires_at: OffsetDateTime,
}

/// One row of a live listing.
#[derive(Clone, Debug)]
pub struct FileEntry {
    pub handle: FileHandle,
    pub display_name: String,
    /// Time left until expiry. Always positive for listed entries.
    pub remaining: time::Duration,
}

/// Snapshot of a live record returned by `Registry::get`.
#[derive(Clone, Debug)]
pub struct FileInfo {
    pub handle: FileHandle,
    pub location: String,
    pub display_name: String,
    pub size: u64,
    pub expires_at: OffsetDateTime,
}

impl From<&Record> for FileInfo {
    fn from(record: &Record) -> Self {
        Self {
            handle: record.handle.clone(),
            location: record.location.clone(),
            display_name: record.display_name.clone(),
            size: record.size,
            expires_at: record.expires_at,
        }
    }
}
