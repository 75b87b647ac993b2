use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::mastery::{EngineError, ExamLock};
use crate::store::StorageError;

#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Response {
    Json(SuccessResponse {
        success: true,
        data,
    })
    .into_response()
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
    is_operational: bool,
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    /// Retryable failure of the event log or catalog.
    pub fn storage_unavailable() -> Self {
        Self::operational(
            StatusCode::SERVICE_UNAVAILABLE,
            "STORAGE_UNAVAILABLE",
            "Storage temporarily unavailable, please retry",
        )
    }

    /// The write may have landed; the client should re-read before retrying.
    pub fn append_unconfirmed() -> Self {
        Self::operational(
            StatusCode::GATEWAY_TIMEOUT,
            "APPEND_UNCONFIRMED",
            "Review not confirmed in time; check progress before resubmitting",
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
            is_operational: false,
        }
    }

    fn operational(
        status: StatusCode,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            is_operational: true,
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnknownItem(id) => Self::not_found(format!("Vocabulary {id} not found")),
            EngineError::Storage(StorageError::Corrupt(detail)) => {
                tracing::error!(%detail, "corrupt review log row");
                Self::internal(detail)
            }
            EngineError::Storage(err) => {
                tracing::warn!(error = %err, "storage failure");
                Self::storage_unavailable()
            }
            EngineError::AppendUnconfirmed => Self::append_unconfirmed(),
            EngineError::AppendAborted(detail) => {
                tracing::error!(%detail, "append task aborted");
                Self::internal(detail)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = if self.is_operational {
            self.message
        } else {
            "Internal server error".to_string()
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: self.code,
        };

        (self.status, Json(body)).into_response()
    }
}

pub fn json_error(
    status: StatusCode,
    code: impl Into<String>,
    message: impl Into<String>,
) -> AppError {
    AppError {
        status,
        code: code.into(),
        message: message.into(),
        is_operational: true,
    }
}

#[derive(Debug, Serialize)]
struct LockedResponse {
    success: bool,
    code: &'static str,
    error: String,
    state: &'static str,
    current: usize,
    required: usize,
}

/// Exam not yet available. Not a fault: carries progress data for the client.
pub fn exam_locked(lock: ExamLock) -> Response {
    let body = LockedResponse {
        success: false,
        code: "EXAM_LOCKED",
        error: format!(
            "Need {} mastered words. You have {}.",
            lock.required, lock.current
        ),
        state: "locked",
        current: lock.current,
        required: lock.required,
    };
    (StatusCode::FORBIDDEN, Json(body)).into_response()
}
