use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Days, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::backend::AppState;
use crate::billing;
use crate::currency;
use crate::database::db::queries;
use crate::database::models::{
    NewSubscription, Subscription, SubscriptionStatus, UpdateSubscription,
};
use crate::error::AppError;
use crate::jobs::renewal;

/// List row: the stored subscription plus its amount in the base currency
/// (absent when no rate is known for the subscription's currency).
#[derive(Debug, Serialize)]
pub struct SubscriptionOut {
    #[serde(flatten)]
    pub subscription: Subscription,
    pub base_amount: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<SubscriptionStatus>,
    pub category_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpcomingParams {
    pub days: Option<i64>,
}

fn validate(name: &str, amount: Decimal, currency: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }
    if amount <= Decimal::ZERO {
        return Err(AppError::Validation("amount must be positive".into()));
    }
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::Validation(
            "currency must be a 3-letter code".into(),
        ));
    }
    Ok(())
}

async fn with_base_amounts(
    state: &AppState,
    subscriptions: Vec<Subscription>,
) -> Result<Vec<SubscriptionOut>, AppError> {
    let settings = queries::get_settings(&state.db).await?;
    let rates = queries::get_rate_map(&state.db, &settings.base_currency).await?;

    Ok(subscriptions
        .into_iter()
        .map(|sub| {
            let base_amount = currency::convert_to_base(
                sub.amount,
                &sub.currency,
                &settings.base_currency,
                &rates,
            );
            SubscriptionOut {
                subscription: sub,
                base_amount,
            }
        })
        .collect())
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<SubscriptionOut>>, AppError> {
    let rows = queries::list_subscriptions(&state.db, params.status, params.category_id).await?;
    Ok(Json(with_base_amounts(&state, rows).await?))
}

pub async fn upcoming(
    State(state): State<AppState>,
    Query(params): Query<UpcomingParams>,
) -> Result<Json<Vec<SubscriptionOut>>, AppError> {
    let days = params.days.unwrap_or(state.config.upcoming_days);
    if !(0..=3650).contains(&days) {
        return Err(AppError::Validation("days must be between 0 and 3650".into()));
    }

    let today = Utc::now().date_naive();
    let until = today
        .checked_add_days(Days::new(days as u64))
        .unwrap_or(today);

    let rows = queries::list_upcoming_subscriptions(&state.db, until).await?;
    Ok(Json(with_base_amounts(&state, rows).await?))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Subscription>, AppError> {
    let sub = queries::get_subscription(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("subscription"))?;
    Ok(Json(sub))
}

pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewSubscription>,
) -> Result<impl IntoResponse, AppError> {
    validate(&new.name, new.amount, &new.currency)?;

    let id = queries::create_subscription(&state.db, &new).await?;
    let sub = queries::get_subscription(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("subscription"))?;

    Ok((StatusCode::CREATED, Json(sub)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(upd): Json<UpdateSubscription>,
) -> Result<Json<Subscription>, AppError> {
    validate(&upd.name, upd.amount, &upd.currency)?;

    if !queries::update_subscription(&state.db, id, &upd).await? {
        return Err(AppError::NotFound("subscription"));
    }
    let sub = queries::get_subscription(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("subscription"))?;
    Ok(Json(sub))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if queries::delete_subscription(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("subscription"))
    }
}

/// Manual renewal: records the payment(s) and rolls the billing dates, the
/// same write path the daily job takes. Overdue subscriptions catch up all
/// elapsed periods; an on-time click renews exactly one.
pub async fn renew(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<renewal::RenewalOutcome>, AppError> {
    let sub = queries::get_subscription(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("subscription"))?;

    if sub.status != SubscriptionStatus::Active {
        return Err(AppError::Validation("subscription is not active".into()));
    }

    let settings = queries::get_settings(&state.db).await?;
    let rates = queries::get_rate_map(&state.db, &settings.base_currency).await?;

    let today = Utc::now().date_naive();
    let (_, elapsed) = billing::roll_forward(sub.next_billing_date, sub.billing_cycle, today);
    let periods = elapsed.max(1);

    let outcome =
        renewal::renew_periods(&state.db, &sub, periods, &settings.base_currency, &rates).await?;
    Ok(Json(outcome))
}
