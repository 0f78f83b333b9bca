use rust_decimal::Decimal;
use serde::Serialize;

/// Precomputed per-month spending aggregate in the base currency.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlySummary {
    pub year: i64,
    pub month: i64,
    pub category_id: i64,
    pub category_name: String,
    pub total_base_amount: Decimal,
    pub payment_count: i64,
}
