use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Router};

use crate::auth::AuthUser;
use crate::mastery::ExamOutcome;
use crate::response::{exam_locked, ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/exam-questions", get(exam_questions))
}

async fn exam_questions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, AppError> {
    match state.engine().compose_exam(user.id).await? {
        composed @ ExamOutcome::Composed(_) => Ok(ok(composed)),
        ExamOutcome::Locked(lock) => Ok(exam_locked(lock)),
    }
}
