use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::server::SharedState;
use crate::types::HealthResponse;

/// GET /health
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let cache = state.cache.stats().await;
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        cache,
    })
}

#[cfg(test)]
mod tests {
    use crate::server::test_support::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health_endpoint() {
        let server = TestServer::new().await;
        server.post_json("/string/k", r#"{"value":"v"}"#).await;
        server.get("/string/k").await;
        server.get("/string/k").await;

        let response = server.get("/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert!(json["uptime_secs"].as_u64().is_some());
        assert_eq!(json["cache"]["entries"], 1);
        assert_eq!(json["cache"]["hits"], 1);
        assert_eq!(json["cache"]["misses"], 1);
    }
}
