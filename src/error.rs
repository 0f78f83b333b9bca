use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by handlers and background jobs.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("no exchange rate for {0}")]
    MissingRate(String),

    #[error("exchange rate fetch failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("unauthorized")]
    Unauthorized,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Database(e) => match constraint_kind(e) {
                Some(sqlx::error::ErrorKind::UniqueViolation) => StatusCode::CONFLICT,
                Some(sqlx::error::ErrorKind::ForeignKeyViolation) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::MissingRate(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Database(e) => match constraint_kind(e) {
                Some(sqlx::error::ErrorKind::UniqueViolation) => {
                    "a row with that name already exists".to_string()
                }
                Some(sqlx::error::ErrorKind::ForeignKeyViolation) => {
                    "referenced row does not exist".to_string()
                }
                _ => self.to_string(),
            },
            _ => self.to_string(),
        }
    }
}

fn constraint_kind(e: &sqlx::Error) -> Option<sqlx::error::ErrorKind> {
    match e {
        sqlx::Error::Database(db) => Some(db.kind()),
        _ => None,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}
