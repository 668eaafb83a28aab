use axum::extract::{Path, State};
use axum::Json;
use tracing::warn;

use crate::server::SharedState;
use crate::storage::validate_key;
use crate::types::{ExistsDetails, ExistsResponse};

/// GET /exists/{key}
/// Reports which namespaces hold `key`. Never fails and never touches the
/// cache; keys that could not be stored are simply absent.
pub async fn exists(
    State(state): State<SharedState>,
    Path(key): Path<String>,
) -> Json<ExistsResponse> {
    if validate_key(&key).is_err() {
        return Json(ExistsDetails::default().into());
    }

    let string = state.storage.string_exists(&key).await;
    let file = state.storage.file_exists(&key).await.unwrap_or_else(|e| {
        warn!(key = %key, error = %e, "Failed to scan files namespace");
        false
    });

    Json(ExistsDetails { string, file }.into())
}
