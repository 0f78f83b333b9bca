use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(FromRow, Debug, Clone, Serialize)]
pub struct PaymentMethod {
    pub payment_method_id: i64,
    pub method_name: String,
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPaymentMethod {
    pub method_name: String,
    #[serde(default)]
    pub icon: String,
}
