//! Upload, list, download, and delete handlers.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use chute_core::FileHandle;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// One registered file in the upload response.
#[derive(Debug, Serialize)]
pub struct UploadedFile {
    /// The opaque handle to retrieve the file with.
    pub id: FileHandle,
    /// Client-supplied display name, echoed back verbatim.
    pub name: String,
    /// When the file stops being retrievable.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// Upload response.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub files: Vec<UploadedFile>,
}

/// One row of the listing response.
#[derive(Debug, Serialize)]
pub struct ListedFile {
    pub id: FileHandle,
    pub name: String,
    /// Milliseconds left until expiry.
    pub remaining_ms: u64,
}

/// Listing response.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub files: Vec<ListedFile>,
}

/// Deletion response.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: &'static str,
}

/// A blob persisted to storage but not yet registered.
struct StoredFile {
    location: String,
    display_name: String,
    size: u64,
}

/// POST /upload
///
/// Accepts a multipart form carrying up to `max_files_per_upload` files, each
/// capped at `max_file_size`. All files are persisted to the blob store
/// first; registration happens only after every part was accepted, so a
/// rejected request leaves neither registry entries nor blobs behind.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut stored: Vec<StoredFile> = Vec::new();

    if let Err(err) = receive_files(&state, &mut multipart, &mut stored).await {
        discard_stored(&state, &stored).await;
        return Err(err);
    }

    if stored.is_empty() {
        return Err(ApiError::BadRequest("no files attached".to_string()));
    }

    let now = OffsetDateTime::now_utc();
    let mut files = Vec::with_capacity(stored.len());
    for file in stored {
        let registered = state
            .registry
            .register(file.location, file.display_name, file.size, now)
            .await;
        tracing::info!(
            handle = %registered.handle,
            name = %registered.display_name,
            "file uploaded"
        );
        files.push(UploadedFile {
            id: registered.handle,
            name: registered.display_name,
            expires_at: registered.expires_at,
        });
    }

    Ok(Json(UploadResponse {
        success: true,
        files,
    }))
}

/// Drain multipart parts into the blob store, enforcing the per-request file
/// count and the per-file size cap while streaming.
async fn receive_files(
    state: &AppState,
    multipart: &mut Multipart,
    stored: &mut Vec<StoredFile>,
) -> ApiResult<()> {
    let max_files = state.config.server.max_files_per_upload;
    let max_size = state.config.server.max_file_size;

    while let Some(mut field) = multipart.next_field().await? {
        // Only parts carrying a filename are files; other form fields are
        // ignored.
        let Some(file_name) = field.file_name() else {
            continue;
        };
        let display_name = if file_name.is_empty() {
            "unnamed".to_string()
        } else {
            file_name.to_string()
        };

        if stored.len() >= max_files {
            return Err(ApiError::BadRequest(format!(
                "too many files: at most {max_files} per upload"
            )));
        }

        // Blobs are keyed by a fresh random id, never by the client name.
        let location = Uuid::new_v4().simple().to_string();
        let mut blob = state.storage.put_stream(&location).await?;
        let mut size: u64 = 0;

        loop {
            let chunk = match field.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    blob.abort().await.ok();
                    return Err(e.into());
                }
            };

            size += chunk.len() as u64;
            if size > max_size {
                blob.abort().await.ok();
                return Err(ApiError::PayloadTooLarge(format!(
                    "{display_name} exceeds the {max_size} byte limit"
                )));
            }

            if let Err(e) = blob.write(chunk).await {
                blob.abort().await.ok();
                return Err(e.into());
            }
        }

        let size = blob.finish().await?;
        stored.push(StoredFile {
            location,
            display_name,
            size,
        });
    }

    Ok(())
}

/// Best-effort removal of blobs persisted before a rejected upload.
async fn discard_stored(state: &AppState, stored: &[StoredFile]) {
    for file in stored {
        if let Err(e) = state.storage.delete(&file.location).await {
            tracing::warn!(
                location = %file.location,
                error = %e,
                "failed to discard blob after rejected upload"
            );
        }
    }
}

/// GET /files
pub async fn list_files(State(state): State<AppState>) -> ApiResult<Json<ListResponse>> {
    let now = OffsetDateTime::now_utc();
    let files = state
        .registry
        .list(now)
        .await
        .into_iter()
        .map(|entry| ListedFile {
            id: entry.handle,
            name: entry.display_name,
            remaining_ms: u64::try_from(entry.remaining.whole_milliseconds()).unwrap_or(0),
        })
        .collect();

    Ok(Json(ListResponse {
        success: true,
        files,
    }))
}

/// DELETE /files/{handle}
pub async fn delete_file(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let handle = FileHandle::parse(&handle)
        .map_err(|_| ApiError::NotFound("unknown file handle".to_string()))?;

    if state.registry.delete(&handle).await {
        tracing::info!(handle = %handle, "file deleted by request");
        Ok(Json(DeleteResponse {
            success: true,
            message: "file deleted",
        }))
    } else {
        Err(ApiError::NotFound("unknown file handle".to_string()))
    }
}

/// GET /download/{handle}
///
/// Streams the blob back with the original display name as the suggested
/// filename. Unknown and expired handles both answer 410: the file is
/// deliberately gone, and the two cases are indistinguishable by design.
pub async fn download(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> ApiResult<Response> {
    let handle = FileHandle::parse(&handle).map_err(|_| ApiError::Gone)?;
    let now = OffsetDateTime::now_utc();

    let info = state.registry.get(&handle, now).await.ok_or(ApiError::Gone)?;
    let stream = state.storage.get_stream(&info.location).await?;

    let filename = sanitize_filename(&info.display_name);
    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, "application/octet-stream".to_string()),
            (CONTENT_LENGTH, info.size.to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

/// Make an untrusted display name safe for a quoted Content-Disposition
/// parameter. The name is display-only data; it is never used as a path.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();
    if cleaned.is_empty() {
        "download".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_quotes_and_control_chars() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("a\"b\\c.txt"), "abc.txt");
        assert_eq!(sanitize_filename("line\r\nbreak"), "linebreak");
    }

    #[test]
    fn sanitize_falls_back_for_empty_names() {
        assert_eq!(sanitize_filename(""), "download");
        assert_eq!(sanitize_filename("\"\""), "download");
    }
}
