use axum::extract::State;
use axum::Json;

use crate::backend::AppState;
use crate::database::db::queries;
use crate::database::models::{Settings, UpdateSettings};
use crate::error::AppError;
use crate::jobs::exchange;

pub async fn get_settings(State(state): State<AppState>) -> Result<Json<Settings>, AppError> {
    Ok(Json(queries::get_settings(&state.db).await?))
}

/// Partial update of the singleton row. Changing the base currency clears the
/// rate table (stored pairs are against the old base) and kicks off a refresh
/// in the background.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(upd): Json<UpdateSettings>,
) -> Result<Json<Settings>, AppError> {
    let current = queries::get_settings(&state.db).await?;

    let base_currency = match upd.base_currency {
        Some(c) => {
            let c = c.trim().to_ascii_uppercase();
            if c.len() != 3 || !c.chars().all(|ch| ch.is_ascii_alphabetic()) {
                return Err(AppError::Validation(
                    "base_currency must be a 3-letter code".into(),
                ));
            }
            c
        }
        None => current.base_currency.clone(),
    };

    let rate_refresh_hour = match upd.rate_refresh_hour {
        Some(h) if h > 23 => {
            return Err(AppError::Validation("rate_refresh_hour must be 0-23".into()))
        }
        Some(h) => h,
        None => current.rate_refresh_hour,
    };

    let merged = Settings {
        base_currency,
        theme: upd.theme.unwrap_or(current.theme),
        rate_refresh_hour,
    };

    let base_changed = merged.base_currency != current.base_currency;

    queries::update_settings(&state.db, &merged).await?;

    if base_changed {
        queries::clear_rates(&state.db).await?;
        let state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = exchange::refresh_rates(&state).await {
                tracing::warn!(error = %e, "rate refresh after base change failed");
            }
        });
    }

    Ok(Json(merged))
}
