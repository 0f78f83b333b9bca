use axum::extract::State;
use axum::Json;
use serde_json::json;

use crate::backend::AppState;
use crate::database::db::queries;
use crate::database::models::ExchangeRate;
use crate::error::AppError;
use crate::jobs::exchange;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ExchangeRate>>, AppError> {
    Ok(Json(queries::list_rates(&state.db).await?))
}

// Same code path as the daily job, on demand.
pub async fn refresh(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let updated = exchange::refresh_rates(&state).await?;
    Ok(Json(json!({ "updated": updated })))
}
