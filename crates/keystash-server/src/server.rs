//! HTTP server for the key-value endpoints
//!
//! Provides /store/{key}, /get/{key}, /string/{key}, /exists/{key} and /health.

use crate::routes;
use crate::storage::Storage;
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Request},
    http::{header, Method, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use keystash_cache::TtlCache;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Shared state for the HTTP server
pub struct ServerState {
    pub storage: Storage,
    pub cache: TtlCache<String>,
    pub max_upload_bytes: usize,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(storage: Storage, cache: TtlCache<String>) -> Self {
        Self {
            storage,
            cache,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            started_at: Utc::now(),
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

pub type SharedState = Arc<ServerState>;

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(routes::health::health))
        .route("/store/{key}", post(routes::files::store_file))
        .route("/get/{key}", get(routes::files::get_file))
        .route(
            "/string/{key}",
            get(routes::strings::get_string).post(routes::strings::store_string),
        )
        .route("/exists/{key}", get(routes::exists::exists))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(cors)
        .layer(middleware::from_fn(options_no_content))
        .with_state(state)
}

/// Answer every OPTIONS request with 204 and no body, keeping the CORS
/// headers added further in.
async fn options_no_content(request: Request, next: Next) -> Response {
    if request.method() != Method::OPTIONS {
        return next.run(request).await;
    }

    let mut response = next.run(request).await;
    *response.status_mut() = StatusCode::NO_CONTENT;
    *response.body_mut() = Body::empty();
    let headers = response.headers_mut();
    headers.remove(header::CONTENT_LENGTH);
    headers.remove(header::CONTENT_TYPE);
    headers.remove(header::ALLOW);
    response
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::http::Request;
    use keystash_cache::ManualClock;
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    pub const BOUNDARY: &str = "keystash-test-boundary";

    /// Isolated server with its own storage root and a manual clock
    pub struct TestServer {
        pub dir: TempDir,
        pub state: SharedState,
        pub clock: Arc<ManualClock>,
    }

    impl TestServer {
        pub async fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let storage = Storage::new(dir.path().join("storage"));
            storage.ensure_directories().await.unwrap();

            let clock = Arc::new(ManualClock::default());
            let cache = TtlCache::with_clock(Duration::from_secs(600), 1000, clock.clone());
            let state = Arc::new(
                ServerState::new(storage, cache).with_max_upload_bytes(1024 * 1024),
            );

            Self { dir, state, clock }
        }

        pub async fn send(&self, request: Request<Body>) -> Response {
            create_router(self.state.clone())
                .oneshot(request)
                .await
                .unwrap()
        }

        pub async fn get(&self, uri: &str) -> Response {
            self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
        }

        pub async fn post_json(&self, uri: &str, body: &str) -> Response {
            self.send(
                Request::builder()
                    .method(Method::POST)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
        }

        pub async fn upload(&self, key: &str, filename: &str, data: &[u8]) -> Response {
            self.send(multipart_request(
                &format!("/store/{}", key),
                "file",
                Some(filename),
                data,
            ))
            .await
        }
    }

    /// Build a single-part multipart/form-data request
    pub fn multipart_request(
        uri: &str,
        field: &str,
        filename: Option<&str>,
        data: &[u8],
    ) -> Request<Body> {
        let disposition = match filename {
            Some(name) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, name
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", field),
        };

        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    pub async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    pub async fn body_json(response: Response) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }
}
