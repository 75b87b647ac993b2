use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::auth::{extract_token, verify_token, AuthError};
use crate::response::AppError;
use crate::state::AppState;

/// Rejects the request with 401 unless it carries a valid token; on
/// success the caller's [`crate::auth::AuthUser`] is placed in the request
/// extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(secret) = state.config().jwt_secret.as_deref() else {
        tracing::error!("JWT_SECRET not configured; rejecting authenticated route");
        return AppError::unauthorized(AuthError::MissingSecret.to_string()).into_response();
    };

    let Some(token) = extract_token(req.headers()) else {
        return AppError::unauthorized(AuthError::MissingToken.to_string()).into_response();
    };

    match verify_token(&token, secret) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(err) => {
            tracing::debug!(error = %err, "token rejected");
            AppError::unauthorized(err.to_string()).into_response()
        }
    }
}
