use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::backend::AppState;
use crate::database::db::queries;
use crate::error::AppError;

// frankfurter-style payload: {"base":"CNY","rates":{"USD":0.14,...}}
#[derive(Debug, Deserialize)]
struct FxResponse {
    rates: HashMap<String, Decimal>,
}

/// Fetch current rates for the configured base currency and upsert them.
/// Returns the number of stored rows. On failure the previous table stays in
/// place and the next tick retries.
pub async fn refresh_rates(state: &AppState) -> Result<usize, AppError> {
    let settings = queries::get_settings(&state.db).await?;
    let base = settings.base_currency;

    let url = format!(
        "{}/latest?base={}",
        state.config.fx_api_url.trim_end_matches('/'),
        base
    );
    tracing::debug!(%url, "fetching exchange rates");

    let body: FxResponse = state
        .http
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    // the base itself pins the identity rate
    queries::upsert_rate(&state.db, &base, &base, Decimal::ONE).await?;
    let mut updated = 1;

    for (currency, rate) in &body.rates {
        if rate.is_sign_negative() || rate.is_zero() {
            tracing::warn!(%currency, %rate, "ignoring non-positive rate");
            continue;
        }
        queries::upsert_rate(&state.db, &base, currency, *rate).await?;
        updated += 1;
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_fx_payload() {
        let body: FxResponse = serde_json::from_str(
            r#"{"amount":1.0,"base":"CNY","date":"2025-05-20","rates":{"USD":0.1389,"EUR":0.1241}}"#,
        )
        .unwrap();

        assert_eq!(body.rates.len(), 2);
        assert_eq!(
            body.rates.get("USD"),
            Some(&Decimal::from_str("0.1389").unwrap())
        );
    }
}
