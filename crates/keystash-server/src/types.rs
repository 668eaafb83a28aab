//! Request and response bodies

use keystash_cache::CacheStats;
use serde::{Deserialize, Serialize};

/// Body of `POST /string/{key}`
#[derive(Debug, Deserialize)]
pub struct StoreStringRequest {
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct StoreFileResponse {
    pub message: String,
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StringValueResponse {
    pub value: String,
}

/// Per-namespace breakdown for `GET /exists/{key}`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ExistsDetails {
    pub string: bool,
    pub file: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExistsResponse {
    pub exists: bool,
    pub details: ExistsDetails,
}

impl From<ExistsDetails> for ExistsResponse {
    fn from(details: ExistsDetails) -> Self {
        Self {
            exists: details.string || details.file,
            details,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub cache: CacheStats,
}
