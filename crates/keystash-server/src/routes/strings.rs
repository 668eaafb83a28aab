use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, State};
use axum::Json;
use keystash_cache::Namespace;
use tracing::{debug, info};

use crate::error::AppError;
use crate::server::SharedState;
use crate::storage::validate_key;
use crate::types::{MessageResponse, StoreStringRequest, StringValueResponse};

/// POST /string/{key}
/// Body: `{"value": "..."}`. Content-Type is not enforced.
pub async fn store_string(
    State(state): State<SharedState>,
    Path(key): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    validate_key(&key)?;

    let request: StoreStringRequest = serde_json::from_slice(&body?)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?;

    state
        .storage
        .write_string(&key, &request.value)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to save string for key {key}: {e}")))?;

    // Drop the stale copy; the next read repopulates from disk
    state.cache.invalidate(Namespace::Strings, &key).await;

    info!(key = %key, size = request.value.len(), "Stored string");

    Ok(Json(MessageResponse {
        message: format!("String saved, key: {}", key),
    }))
}

/// GET /string/{key}
/// Served from the cache when possible, otherwise read from disk and cached.
pub async fn get_string(
    State(state): State<SharedState>,
    Path(key): Path<String>,
) -> Result<Json<StringValueResponse>, AppError> {
    validate_key(&key)?;

    if let Some(value) = state.cache.get(Namespace::Strings, &key).await {
        return Ok(Json(StringValueResponse { value }));
    }

    let value = state
        .storage
        .read_string(&key)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to read string for key {key}: {e}")))?
        .ok_or_else(|| AppError::NotFound("String not found".to_string()))?;

    debug!(key = %key, "Loaded string from disk");
    state
        .cache
        .put(Namespace::Strings, &key, value.clone())
        .await;

    Ok(Json(StringValueResponse { value }))
}
