//! HTTP server implementation

use axum::{
    extract::State,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::ServerState;

/// Keep-alive API for managing the HTTP server
#[derive(Clone)]
pub struct KeepAliveApi {
    state: ServerState,
}

impl KeepAliveApi {
    pub fn new(state: ServerState) -> Self {
        Self { state }
    }

    /// Create the axum router with all routes configured
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(ping))
            .route("/health", get(health_check))
            .with_state(self.state.clone())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    /// Start the keep-alive server
    ///
    /// # Arguments
    /// * `host` - Host to bind to (e.g., "0.0.0.0")
    /// * `port` - Port to bind to (e.g., 7860)
    pub async fn serve(self, host: &str, port: u16) -> crate::Result<()> {
        let addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        tracing::info!("Keep-alive server listening on {}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}

/// Plain ping endpoint for platform uptime checks
async fn ping() -> &'static str {
    "OK"
}

#[derive(Debug, Serialize)]
struct HealthPayload {
    status: &'static str,
    uptime_secs: i64,
    active_jobs: usize,
}

/// Health report with uptime and running job count
async fn health_check(State(state): State<ServerState>) -> impl IntoResponse {
    Json(HealthPayload {
        status: "ok",
        uptime_secs: state.uptime_secs(),
        active_jobs: state.active_jobs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::JobGauge;

    #[test]
    fn test_health_payload_shape() {
        let payload = HealthPayload {
            status: "ok",
            uptime_secs: 12,
            active_jobs: 3,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["uptime_secs"], 12);
        assert_eq!(json["active_jobs"], 3);
    }

    #[test]
    fn test_router_builds() {
        let state = ServerState::new(JobGauge::new());
        let _ = KeepAliveApi::new(state).router();
    }
}
