use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::backend::AppState;
use crate::billing;
use crate::currency;
use crate::database::db::queries;
use crate::database::models::{NewPayment, Payment, PaymentStatus};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub subscription_id: Option<i64>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// Manual backfill of a billing event. Amount and period end default from the
/// subscription when omitted.
#[derive(Debug, Deserialize)]
pub struct CreatePayment {
    pub subscription_id: i64,
    pub amount: Option<Decimal>,
    pub period_start: NaiveDate,
    pub period_end: Option<NaiveDate>,
    #[serde(default)]
    pub status: PaymentStatus,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Payment>>, AppError> {
    if let Some(month) = params.month {
        if !(1..=12).contains(&month) {
            return Err(AppError::Validation("month must be 1-12".into()));
        }
    }

    let rows = queries::list_payments(
        &state.db,
        params.subscription_id,
        params.year,
        params.month,
    )
    .await?;
    Ok(Json(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreatePayment>,
) -> Result<impl IntoResponse, AppError> {
    let sub = queries::get_subscription(&state.db, req.subscription_id)
        .await?
        .ok_or(AppError::NotFound("subscription"))?;

    let amount = req.amount.unwrap_or(sub.amount);
    if amount <= Decimal::ZERO {
        return Err(AppError::Validation("amount must be positive".into()));
    }

    let period_end = req
        .period_end
        .unwrap_or_else(|| billing::period_end(req.period_start, sub.billing_cycle));
    if period_end < req.period_start {
        return Err(AppError::Validation(
            "period_end must not precede period_start".into(),
        ));
    }

    let settings = queries::get_settings(&state.db).await?;
    let rates = queries::get_rate_map(&state.db, &settings.base_currency).await?;
    let base_amount =
        currency::convert_to_base(amount, &sub.currency, &settings.base_currency, &rates)
            .ok_or_else(|| AppError::MissingRate(sub.currency.clone()))?;

    let payment = NewPayment {
        subscription_id: sub.subscription_id,
        category_id: sub.category_id,
        amount,
        currency: sub.currency.clone(),
        base_amount,
        period_start: req.period_start,
        period_end,
        status: req.status,
    };

    let payment_id = queries::insert_payment(&state.db, &payment).await?;
    Ok((StatusCode::CREATED, Json(json!({ "payment_id": payment_id }))))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if queries::delete_payment(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("payment"))
    }
}
