use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Failed,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Paid
    }
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Pending => "pending",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "paid" => Some(Self::Paid),
            "pending" => Some(Self::Pending),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// One row per billing event. `base_amount` is the amount converted into the
/// base currency when the payment was recorded; `category_id` is a snapshot of
/// the subscription's category at that moment.
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub payment_id: i64,
    pub subscription_id: i64,
    pub category_id: i64,
    pub amount: Decimal,
    pub currency: String,
    pub base_amount: Decimal,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub paid_at: NaiveDateTime,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub subscription_id: i64,
    pub category_id: i64,
    pub amount: Decimal,
    pub currency: String,
    pub base_amount: Decimal,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub status: PaymentStatus,
}
