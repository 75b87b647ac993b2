use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::mastery::{EventId, ItemId, Outcome, Tier, TierFilter};
use crate::response::{ok, AppError};
use crate::state::AppState;

const EXP_PER_REVIEW: u32 = 10;
const BROWSE_LIMIT: usize = 50;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/flashcards", get(flashcards))
        .route("/review", post(submit_review))
        .route("/vocabularies", get(vocabularies))
}

#[derive(Debug, Deserialize)]
struct ReviewRequest {
    vocab_id: ItemId,
    result: i64,
}

#[derive(Debug, Serialize)]
struct ReviewResponse {
    event_id: EventId,
    exp_gained: u32,
}

#[derive(Debug, Deserialize)]
struct VocabularyQuery {
    tier: Option<Tier>,
}

async fn flashcards(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, AppError> {
    let selection = state.engine().select_session(user.id).await?;
    Ok(ok(selection))
}

async fn submit_review(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload.map_err(|err| AppError::validation(err.body_text()))?;

    let outcome = Outcome::from_code(payload.result).ok_or_else(|| {
        AppError::validation(format!(
            "result must be 0, 1 or 2, got {}",
            payload.result
        ))
    })?;

    let event_id = state
        .engine()
        .submit_review(user.id, payload.vocab_id, outcome)
        .await?;

    Ok(ok(ReviewResponse {
        event_id,
        exp_gained: EXP_PER_REVIEW,
    }))
}

async fn vocabularies(
    State(state): State<AppState>,
    Query(query): Query<VocabularyQuery>,
) -> Result<Response, AppError> {
    let filter = query.tier.map(TierFilter::single).unwrap_or_default();
    let items = state.engine().browse_items(&filter, BROWSE_LIMIT).await?;
    Ok(ok(items))
}
