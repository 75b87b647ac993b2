use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Router};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::mastery::UserStats;
use crate::response::{ok, AppError};
use crate::services::retention::RetentionInsight;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/stats", get(stats))
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    #[serde(flatten)]
    stats: UserStats,
    retention: RetentionInsight,
}

async fn stats(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, AppError> {
    let stats = state.engine().user_stats(user.id).await?;
    let retention = state.retention().predict_or_offline(&stats).await;
    Ok(ok(StatsResponse { stats, retention }))
}
