//! The handle → record map, its expiry scheduler, and the shared deletion
//! routine.

use crate::record::{FileEntry, FileInfo, Record, RegisteredFile};
use chute_core::FileHandle;
use chute_storage::BlobStore;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Thread-safe registry of ephemeral file records.
///
/// Cheap to clone; all clones share the same map. Mutations and reads that
/// may trigger lazy deletion are serialized through one async mutex, which is
/// only ever held for O(1) map operations. Blob I/O never happens under the
/// lock.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<Inner>,
}

struct Inner {
    entries: Mutex<HashMap<FileHandle, Record>>,
    store: Arc<dyn BlobStore>,
    lifetime: Duration,
    grace_period: Duration,
}

impl Registry {
    /// Create a new registry.
    ///
    /// `lifetime` is fixed for all records registered through this instance;
    /// `grace_period` is the extra delay added to each record's deletion
    /// timer beyond the nominal lifetime.
    pub fn new(store: Arc<dyn BlobStore>, lifetime: Duration, grace_period: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                store,
                lifetime,
                grace_period,
            }),
        }
    }

    /// Register an uploaded blob and return its freshly generated handle.
    ///
    /// The record expires at `now + lifetime` and its deletion timer fires at
    /// `lifetime + grace_period`. Handles are 128-bit random values; the
    /// collision probability is negligible, so no uniqueness check is made.
    pub async fn register(
        &self,
        location: String,
        display_name: String,
        size: u64,
        now: OffsetDateTime,
    ) -> RegisteredFile {
        let handle = FileHandle::generate();
        let expires_at = now + self.inner.lifetime;
        let timer = self.spawn_expiry_timer(handle.clone());

        let record = Record {
            handle: handle.clone(),
            location,
            display_name: display_name.clone(),
            size,
            created_at: now,
            expires_at,
            timer: Some(timer),
        };

        self.inner
            .entries
            .lock()
            .await
            .insert(handle.clone(), record);

        tracing::debug!(handle = %handle, expires_at = %expires_at, "file registered");

        RegisteredFile {
            handle,
            display_name,
            expires_at,
        }
    }

    /// Snapshot all live records, lazily evicting expired ones.
    ///
    /// Every listed entry carries a strictly positive `remaining` duration.
    /// Order is unspecified.
    pub async fn list(&self, now: OffsetDateTime) -> Vec<FileEntry> {
        let mut live = Vec::new();
        let mut expired = Vec::new();

        {
            let entries = self.inner.entries.lock().await;
            for record in entries.values() {
                if record.expires_at <= now {
                    expired.push(record.handle.clone());
                } else {
                    live.push(FileEntry {
                        handle: record.handle.clone(),
                        display_name: record.display_name.clone(),
                        remaining: record.expires_at - now,
                    });
                }
            }
        }

        for handle in expired {
            Inner::remove(&self.inner, &handle).await;
        }

        live
    }

    /// Look up a live record by handle.
    ///
    /// Returns `None` for handles never issued or already deleted. A record
    /// found past its expiry is evicted as a side effect and reported as
    /// `None`, indistinguishable from "already gone".
    pub async fn get(&self, handle: &FileHandle, now: OffsetDateTime) -> Option<FileInfo> {
        {
            let entries = self.inner.entries.lock().await;
            match entries.get(handle) {
                None => return None,
                Some(record) if record.expires_at > now => {
                    return Some(FileInfo::from(record));
                }
                Some(_) => {}
            }
        }

        // Expired: evict through the shared deletion routine
        Inner::remove(&self.inner, handle).await;
        None
    }

    /// Delete a record by handle.
    ///
    /// Returns `true` if the record was present and is now deleted, `false`
    /// if the handle is unknown or already gone. Idempotent: for any handle
    /// this returns `true` at most once.
    pub async fn delete(&self, handle: &FileHandle) -> bool {
        Inner::remove(&self.inner, handle).await
    }

    /// Number of records currently in the map, live or awaiting lazy expiry.
    pub async fn len(&self) -> usize {
        self.inner.entries.lock().await.len()
    }

    /// Whether the registry holds no records.
    pub async fn is_empty(&self) -> bool {
        self.inner.entries.lock().await.is_empty()
    }

    /// Arm the one-shot deletion timer for a handle.
    ///
    /// The task holds only a weak reference to the registry internals so a
    /// pending timer never keeps a dropped registry alive.
    fn spawn_expiry_timer(&self, handle: FileHandle) -> JoinHandle<()> {
        let delay = self.inner.lifetime + self.inner.grace_period;
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                tracing::debug!(handle = %handle, "expiry timer fired");
                Inner::remove(&inner, &handle).await;
            }
        })
    }
}

impl Inner {
    /// Shared deletion routine used by manual delete, lazy expiry, and timer
    /// fire.
    ///
    /// Removes the map entry, cancels any still-pending timer, and issues a
    /// fire-and-forget blob deletion. Absent entries are a no-op, which makes
    /// every pair of concurrent triggers race-safe: exactly one caller
    /// observes the record.
    ///
    /// The blob delete runs in its own task: the timer task calls this
    /// routine and aborts its own join handle here, so any await after the
    /// abort would be cancelled mid-flight.
    async fn remove(inner: &Arc<Inner>, handle: &FileHandle) -> bool {
        let record = inner.entries.lock().await.remove(handle);
        let Some(mut record) = record else {
            return false;
        };

        if let Some(timer) = record.timer.take() {
            timer.abort();
        }

        let store = inner.store.clone();
        let location = record.location;
        let handle = handle.clone();
        tokio::spawn(async move {
            if let Err(e) = store.delete(&location).await {
                // Best effort: the handle is already invalid either way, the
                // bytes just linger until the process exits.
                tracing::warn!(
                    handle = %handle,
                    location = %location,
                    error = %e,
                    "failed to delete blob during cleanup"
                );
            } else {
                tracing::debug!(handle = %handle, "record deleted");
            }
        });

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chute_storage::FilesystemBackend;

    const LIFETIME: Duration = Duration::from_secs(120);
    const GRACE: Duration = Duration::from_secs(2);

    async fn registry() -> (tempfile::TempDir, Registry) {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn BlobStore> =
            Arc::new(FilesystemBackend::new(dir.path()).await.unwrap());
        (dir, Registry::new(store, LIFETIME, GRACE))
    }

    async fn register_blob(
        registry: &Registry,
        name: &str,
        now: OffsetDateTime,
    ) -> RegisteredFile {
        let location = FileHandle::generate().to_string();
        registry
            .register(location, name.to_string(), 3, now)
            .await
    }

    #[tokio::test]
    async fn register_returns_distinct_handles() {
        let (_dir, registry) = registry().await;
        let now = OffsetDateTime::now_utc();

        let a = register_blob(&registry, "a.txt", now).await;
        let b = register_blob(&registry, "b.txt", now).await;

        assert_ne!(a.handle, b.handle);
        assert_eq!(a.expires_at, now + LIFETIME);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn list_reports_positive_remaining_until_expiry() {
        let (_dir, registry) = registry().await;
        let now = OffsetDateTime::now_utc();

        let file = register_blob(&registry, "a.txt", now).await;

        let just_before = now + LIFETIME - Duration::from_millis(1);
        let listed = registry.list(just_before).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].handle, file.handle);
        assert_eq!(listed[0].display_name, "a.txt");
        assert!(listed[0].remaining.is_positive());

        // At the exact expiry instant the record is evicted and excluded
        let at_expiry = now + LIFETIME;
        assert!(registry.list(at_expiry).await.is_empty());
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn get_lazily_evicts_expired_records() {
        let (_dir, registry) = registry().await;
        let now = OffsetDateTime::now_utc();

        let file = register_blob(&registry, "a.txt", now).await;

        let info = registry.get(&file.handle, now).await.unwrap();
        assert_eq!(info.display_name, "a.txt");
        assert_eq!(info.expires_at, file.expires_at);

        // Expired on read: gone, and the entry is evicted without any list
        assert!(registry.get(&file.handle, now + LIFETIME).await.is_none());
        assert_eq!(registry.len().await, 0);

        // Permanently invalid afterwards, even at an earlier timestamp
        assert!(registry.get(&file.handle, now).await.is_none());
    }

    #[tokio::test]
    async fn get_unknown_handle_is_none() {
        let (_dir, registry) = registry().await;
        let never_issued = FileHandle::generate();
        assert!(
            registry
                .get(&never_issued, OffsetDateTime::now_utc())
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_dir, registry) = registry().await;
        let now = OffsetDateTime::now_utc();

        let file = register_blob(&registry, "a.txt", now).await;

        assert!(registry.delete(&file.handle).await);
        assert!(!registry.delete(&file.handle).await);
        assert!(registry.get(&file.handle, now).await.is_none());
    }

    #[tokio::test]
    async fn delete_succeeds_when_blob_is_already_gone() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn BlobStore> =
            Arc::new(FilesystemBackend::new(dir.path()).await.unwrap());
        let registry = Registry::new(store.clone(), LIFETIME, GRACE);

        let now = OffsetDateTime::now_utc();
        let location = FileHandle::generate().to_string();
        store
            .put(&location, Bytes::from("payload"))
            .await
            .unwrap();
        let file = registry
            .register(location.clone(), "a.txt".to_string(), 7, now)
            .await;

        // Blob vanishes out from under the registry; the entry must still be
        // removed and the failure only logged.
        store.delete(&location).await.unwrap();
        assert!(registry.delete(&file.handle).await);
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn expiry_is_never_extended_by_reads() {
        let (_dir, registry) = registry().await;
        let now = OffsetDateTime::now_utc();

        let file = register_blob(&registry, "a.txt", now).await;

        for i in 0..5 {
            let t = now + Duration::from_secs(i * 10);
            let info = registry.get(&file.handle, t).await.unwrap();
            assert_eq!(info.expires_at, file.expires_at);
        }
    }
}
