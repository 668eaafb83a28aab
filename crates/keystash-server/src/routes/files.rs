use axum::body::Body;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::path::Path as FsPath;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::{debug, info};

use crate::error::AppError;
use crate::server::SharedState;
use crate::storage::{stored_file_name, upload_extension, validate_key};
use crate::types::StoreFileResponse;

/// POST /store/{key}
/// Saves the multipart field `file` as `<key>.<ext>` in the files namespace.
pub async fn store_file(
    State(state): State<SharedState>,
    Path(key): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<StoreFileResponse>, AppError> {
    validate_key(&key)?;
    let mut multipart = multipart?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        // A `file` field without a filename is a plain form value, not an upload
        let Some(filename) = field
            .file_name()
            .filter(|_| field.name() == Some("file"))
            .map(str::to_string)
        else {
            continue;
        };
        upload = Some((filename, field.bytes().await?));
        break;
    }

    let (filename, data) =
        upload.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    let file_name = stored_file_name(&key, upload_extension(&filename))?;
    state
        .storage
        .write_file(&key, &file_name, &data)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to save file for key {key}: {e}")))?;

    info!(key = %key, filename = %filename, size = data.len(), "Stored file");

    Ok(Json(StoreFileResponse {
        message: format!("File saved, key: {}", key),
        filename,
    }))
}

/// GET /get/{key}
/// Streams the stored file for `key`, whatever its extension.
pub async fn get_file(
    State(state): State<SharedState>,
    Path(key): Path<String>,
    request: Request,
) -> Result<Response, AppError> {
    validate_key(&key)?;

    let path = state
        .storage
        .find_file(&key)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

    debug!(key = %key, path = ?path, "Serving file");
    serve_file(&path, request).await
}

/// Stream `path` with a content type guessed from its extension.
/// A file that vanished after lookup is reported like any missing key.
async fn serve_file(path: &FsPath, request: Request) -> Result<Response, AppError> {
    let response = match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    if response.status() == StatusCode::NOT_FOUND {
        return Err(AppError::NotFound("File not found".to_string()));
    }
    Ok(response.map(Body::new).into_response())
}
