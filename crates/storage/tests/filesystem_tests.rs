//! Integration tests for the filesystem backend.

use bytes::Bytes;
use chute_storage::{BlobStore, FilesystemBackend, StorageError};
use futures::StreamExt;

async fn backend() -> (tempfile::TempDir, FilesystemBackend) {
    let dir = tempfile::tempdir().unwrap();
    let backend = FilesystemBackend::new(dir.path()).await.unwrap();
    (dir, backend)
}

#[tokio::test]
async fn streaming_upload_publishes_on_finish() {
    let (dir, backend) = backend().await;

    let mut upload = backend.put_stream("blob1").await.unwrap();
    upload.write(Bytes::from("hello ")).await.unwrap();

    // Nothing visible under the key until finish
    assert!(!backend.exists("blob1").await.unwrap());

    upload.write(Bytes::from("world")).await.unwrap();
    let written = upload.finish().await.unwrap();
    assert_eq!(written, 11);

    assert_eq!(backend.get("blob1").await.unwrap(), Bytes::from("hello world"));
    assert_eq!(backend.head("blob1").await.unwrap().size, 11);

    // No temp files left behind
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().contains(".tmp."))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn aborted_upload_leaves_no_trace() {
    let (dir, backend) = backend().await;

    let mut upload = backend.put_stream("blob2").await.unwrap();
    upload.write(Bytes::from(vec![0u8; 4096])).await.unwrap();
    upload.abort().await.unwrap();

    assert!(!backend.exists("blob2").await.unwrap());
    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert!(entries.is_empty(), "expected empty root, got {entries:?}");
}

#[tokio::test]
async fn get_stream_yields_full_content() {
    let (_dir, backend) = backend().await;

    // Larger than one read chunk so the stream yields multiple items
    let data = Bytes::from(vec![7u8; 200 * 1024]);
    backend.put("big", data.clone()).await.unwrap();

    let mut stream = backend.get_stream("big").await.unwrap();
    let mut collected = Vec::new();
    while let Some(chunk) = stream.next().await {
        collected.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(collected.len(), data.len());
    assert_eq!(Bytes::from(collected), data);
}

#[tokio::test]
async fn get_missing_blob_is_not_found() {
    let (_dir, backend) = backend().await;

    assert!(matches!(
        backend.get("nope").await.unwrap_err(),
        StorageError::NotFound(_)
    ));
    assert!(matches!(
        backend.get_stream("nope").await.map(|_| ()).unwrap_err(),
        StorageError::NotFound(_)
    ));
    assert!(matches!(
        backend.head("nope").await.unwrap_err(),
        StorageError::NotFound(_)
    ));
}

#[tokio::test]
async fn delete_removes_blob() {
    let (_dir, backend) = backend().await;

    backend.put("gone", Bytes::from("x")).await.unwrap();
    backend.delete("gone").await.unwrap();
    assert!(!backend.exists("gone").await.unwrap());

    // Second delete reports NotFound
    assert!(matches!(
        backend.delete("gone").await.unwrap_err(),
        StorageError::NotFound(_)
    ));
}

#[tokio::test]
async fn health_check_passes_for_existing_root() {
    let (_dir, backend) = backend().await;
    backend.health_check().await.unwrap();
}
