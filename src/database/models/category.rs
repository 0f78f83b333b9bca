use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(FromRow, Debug, Clone, Serialize)]
pub struct Category {
    pub category_id: i64,
    pub category_name: String,
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub category_name: String,
    #[serde(default)]
    pub icon: String,
}
