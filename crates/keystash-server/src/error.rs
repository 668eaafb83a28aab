//! Error types for keystash

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::fmt;

use crate::storage::KeyError;

/// Service-level errors that abort startup
#[derive(Debug)]
pub enum KeystashError {
    Io(Box<std::io::Error>),
    Config(String),
}

impl fmt::Display for KeystashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeystashError::Io(err) => write!(f, "IO error: {}", err),
            KeystashError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for KeystashError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KeystashError::Io(err) => Some(err.as_ref()),
            KeystashError::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for KeystashError {
    fn from(err: std::io::Error) -> Self {
        KeystashError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for KeystashError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        KeystashError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KeystashError>;

/// Request error type that converts to HTTP responses
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    PayloadTooLarge(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<KeyError> for AppError {
    fn from(e: KeyError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(e: MultipartRejection) -> Self {
        AppError::BadRequest(format!("Expected a multipart upload: {}", e.body_text()))
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        match e.status() {
            StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(e.body_text()),
            _ => AppError::BadRequest(e.body_text()),
        }
    }
}

impl From<BytesRejection> for AppError {
    fn from(e: BytesRejection) -> Self {
        match e.status() {
            StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(e.body_text()),
            _ => AppError::BadRequest(e.body_text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn error_body(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_config_error_display() {
        let err = KeystashError::Config("bad PORT".to_string());
        assert_eq!(format!("{}", err), "Configuration error: bad PORT");
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error;

        let err: KeystashError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(format!("{}", err).contains("denied"));
        assert!(err.source().is_some());
    }

    #[tokio::test]
    async fn test_not_found_response() {
        let (status, json) = error_body(AppError::NotFound("String not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "String not found");
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let (status, json) = error_body(AppError::Internal("disk full at /srv".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_key_error_is_bad_request() {
        let (status, json) = error_body(KeyError::Traversal.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("key"));
    }
}
