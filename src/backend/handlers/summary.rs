use axum::extract::{Query, State};
use axum::Json;
use chrono::{Datelike, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::backend::AppState;
use crate::database::db::queries;
use crate::database::models::MonthlySummary;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct MonthlyParams {
    pub year: Option<i32>,
}

pub async fn monthly(
    State(state): State<AppState>,
    Query(params): Query<MonthlyParams>,
) -> Result<Json<Vec<MonthlySummary>>, AppError> {
    let year = params.year.unwrap_or_else(|| Utc::now().year());
    Ok(Json(queries::list_summary(&state.db, year).await?))
}

pub async fn rebuild(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    queries::rebuild_summary(&state.db).await?;
    Ok(Json(json!({ "status": "rebuilt" })))
}
