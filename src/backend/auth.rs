use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::backend::AppState;
use crate::error::AppError;

/// Static bearer-token gate for the /api routes.
///
/// Does nothing unless API_TOKEN is configured. /health stays outside this
/// middleware so probes keep working.
pub async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.config.api_token.as_deref() else {
        return next.run(request).await;
    };

    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if presented == Some(expected) {
        next.run(request).await
    } else {
        AppError::Unauthorized.into_response()
    }
}
