#![allow(dead_code)]

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use subscription_tracker::backend::AppState;
use subscription_tracker::config::Config;
use subscription_tracker::database::db::queries;
use subscription_tracker::database::models::{
    BillingCycle, NewSubscription, RenewalType, SubscriptionStatus,
};

// One connection only: every pooled connection to sqlite::memory: would
// otherwise get its own empty database.
pub async fn test_pool() -> Pool<Sqlite> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("memory options")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("in-memory pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    queries::seed_defaults(&pool).await.expect("seed");

    pool
}

pub fn test_config(api_token: Option<&str>) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        bind_addr: "127.0.0.1:0".parse().expect("addr"),
        // unroutable on purpose: no test should reach a real FX API
        fx_api_url: "http://127.0.0.1:9".to_string(),
        api_token: api_token.map(str::to_string),
        upcoming_days: 7,
    }
}

pub fn test_state(pool: Pool<Sqlite>) -> AppState {
    AppState::new(pool, test_config(None))
}

pub fn test_state_with_token(pool: Pool<Sqlite>, token: &str) -> AppState {
    AppState::new(pool, test_config(Some(token)))
}

pub fn subscription(
    name: &str,
    amount: &str,
    currency: &str,
    cycle: BillingCycle,
    next_billing_date: NaiveDate,
) -> NewSubscription {
    NewSubscription {
        name: name.to_string(),
        plan: None,
        billing_cycle: cycle,
        amount: Decimal::from_str(amount).expect("amount"),
        currency: currency.to_string(),
        next_billing_date,
        status: SubscriptionStatus::Active,
        renewal_type: RenewalType::Auto,
        category_id: None,
        payment_method_id: None,
        notes: None,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}
