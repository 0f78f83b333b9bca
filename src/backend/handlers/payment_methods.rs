use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::backend::AppState;
use crate::database::db::queries;
use crate::database::models::{NewPaymentMethod, PaymentMethod};
use crate::error::AppError;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<PaymentMethod>>, AppError> {
    Ok(Json(queries::list_payment_methods(&state.db).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewPaymentMethod>,
) -> Result<impl IntoResponse, AppError> {
    if new.method_name.trim().is_empty() {
        return Err(AppError::Validation("method_name must not be empty".into()));
    }

    let id = queries::create_payment_method(&state.db, new.method_name.trim(), &new.icon).await?;
    Ok((StatusCode::CREATED, Json(json!({ "payment_method_id": id }))))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(upd): Json<NewPaymentMethod>,
) -> Result<StatusCode, AppError> {
    if upd.method_name.trim().is_empty() {
        return Err(AppError::Validation("method_name must not be empty".into()));
    }

    if queries::update_payment_method(&state.db, id, upd.method_name.trim(), &upd.icon).await? {
        Ok(StatusCode::OK)
    } else {
        Err(AppError::NotFound("payment method"))
    }
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if id == 1 {
        return Err(AppError::Validation(
            "the fallback payment method cannot be deleted".into(),
        ));
    }

    if queries::delete_payment_method(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("payment method"))
    }
}
