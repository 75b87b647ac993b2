use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

const DB_PING_TIMEOUT: Duration = Duration::from_secs(2);

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/live", get(live))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    storage: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    database_latency_ms: Option<u64>,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct LivenessResponse {
    status: &'static str,
    timestamp: String,
    uptime: u64,
    started_at: String,
}

enum StorageCheck {
    InMemory,
    Connected { latency_ms: u64 },
    Disconnected,
}

async fn root(State(state): State<AppState>) -> Response {
    let check = storage_check(&state).await;

    let (status_code, response) = match check {
        StorageCheck::InMemory => (
            StatusCode::OK,
            HealthResponse {
                status: "ok",
                storage: "memory",
                database_latency_ms: None,
                timestamp: now_iso(),
            },
        ),
        StorageCheck::Connected { latency_ms } => (
            StatusCode::OK,
            HealthResponse {
                status: "ok",
                storage: "connected",
                database_latency_ms: Some(latency_ms),
                timestamp: now_iso(),
            },
        ),
        StorageCheck::Disconnected => (
            StatusCode::SERVICE_UNAVAILABLE,
            HealthResponse {
                status: "degraded",
                storage: "disconnected",
                database_latency_ms: None,
                timestamp: now_iso(),
            },
        ),
    };

    (status_code, Json(response)).into_response()
}

async fn live(State(state): State<AppState>) -> Response {
    let started: chrono::DateTime<chrono::Utc> = state.started_at_system().into();
    Json(LivenessResponse {
        status: "healthy",
        timestamp: now_iso(),
        uptime: state.uptime_seconds(),
        started_at: started.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    })
    .into_response()
}

async fn storage_check(state: &AppState) -> StorageCheck {
    let Some(proxy) = state.db_proxy() else {
        return StorageCheck::InMemory;
    };

    match proxy.ping(DB_PING_TIMEOUT).await {
        Some(latency) => StorageCheck::Connected {
            latency_ms: latency.as_millis() as u64,
        },
        None => StorageCheck::Disconnected,
    }
}

fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
