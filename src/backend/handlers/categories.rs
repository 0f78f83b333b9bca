use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::backend::AppState;
use crate::database::db::queries;
use crate::database::models::{Category, NewCategory};
use crate::error::AppError;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(queries::list_categories(&state.db).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewCategory>,
) -> Result<impl IntoResponse, AppError> {
    if new.category_name.trim().is_empty() {
        return Err(AppError::Validation("category_name must not be empty".into()));
    }

    let id = queries::create_category(&state.db, new.category_name.trim(), &new.icon).await?;
    Ok((StatusCode::CREATED, Json(json!({ "category_id": id }))))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(upd): Json<NewCategory>,
) -> Result<StatusCode, AppError> {
    if upd.category_name.trim().is_empty() {
        return Err(AppError::Validation("category_name must not be empty".into()));
    }

    if queries::update_category(&state.db, id, upd.category_name.trim(), &upd.icon).await? {
        Ok(StatusCode::OK)
    } else {
        Err(AppError::NotFound("category"))
    }
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    // id 1 is the fallback that delete rules re-point rows to
    if id == 1 {
        return Err(AppError::Validation(
            "the fallback category cannot be deleted".into(),
        ));
    }

    if queries::delete_category(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("category"))
    }
}
