use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

/// rate is units of `currency` per one unit of `base_currency`.
#[derive(Debug, Clone, Serialize)]
pub struct ExchangeRate {
    pub base_currency: String,
    pub currency: String,
    pub rate: Decimal,
    pub fetched_at: NaiveDateTime,
}
