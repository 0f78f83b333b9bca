use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::database::models::{
    BillingCycle, Category, ExchangeRate, MonthlySummary, NewPayment, NewSubscription, Payment,
    PaymentMethod, PaymentStatus, RenewalType, Settings, Subscription, SubscriptionStatus, Theme,
    UpdateSubscription,
};

/*
This file contains the SQL query and CRUD logic
and is responsible for interacting with the database.
 */

// Amounts live in TEXT columns and go through Decimal, never floats.
fn text_decimal(row: &SqliteRow, col: &str) -> Result<Decimal, sqlx::Error> {
    let text: String = row.try_get(col)?;
    Decimal::from_str_exact(&text).map_err(|e| {
        sqlx::Error::Decode(format!("invalid decimal in {}: {}", col, e).into())
    })
}

fn bad_enum(col: &str, value: &str) -> sqlx::Error {
    sqlx::Error::Decode(format!("unexpected {} value: {}", col, value).into())
}

/*==========Subscription Queries=========== */

fn row_to_subscription(row: &SqliteRow) -> Result<Subscription, sqlx::Error> {
    let cycle: String = row.try_get("billing_cycle")?;
    let status: String = row.try_get("status")?;
    let renewal: String = row.try_get("renewal_type")?;

    Ok(Subscription {
        subscription_id: row.try_get("subscription_id")?,
        name: row.try_get("name")?,
        plan: row.try_get("plan")?,
        billing_cycle: BillingCycle::parse(&cycle)
            .ok_or_else(|| bad_enum("billing_cycle", &cycle))?,
        amount: text_decimal(row, "amount")?,
        currency: row.try_get("currency")?,
        next_billing_date: row.try_get("next_billing_date")?,
        last_billing_date: row.try_get("last_billing_date")?,
        status: SubscriptionStatus::parse(&status).ok_or_else(|| bad_enum("status", &status))?,
        renewal_type: RenewalType::parse(&renewal)
            .ok_or_else(|| bad_enum("renewal_type", &renewal))?,
        category_id: row.try_get("category_id")?,
        payment_method_id: row.try_get("payment_method_id")?,
        notes: row.try_get("notes")?,
        sub_created_at: row.try_get("sub_created_at")?,
    })
}

pub async fn create_subscription(
    pool: &Pool<Sqlite>,
    new: &NewSubscription,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO subscriptions (
            name, plan, billing_cycle, amount, currency, next_billing_date,
            status, renewal_type, category_id, payment_method_id, notes, sub_created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, datetime('now'))
        RETURNING subscription_id
        "#,
    )
    .bind(&new.name)
    .bind(&new.plan)
    .bind(new.billing_cycle.as_str())
    .bind(new.amount.to_string())
    .bind(new.currency.to_ascii_uppercase())
    .bind(new.next_billing_date)
    .bind(new.status.as_str())
    .bind(new.renewal_type.as_str())
    .bind(new.category_id.unwrap_or(1))
    .bind(new.payment_method_id.unwrap_or(1))
    .bind(&new.notes)
    .fetch_one(pool)
    .await?;

    row.try_get("subscription_id")
}

pub async fn get_subscription(
    pool: &Pool<Sqlite>,
    subscription_id: i64,
) -> Result<Option<Subscription>, sqlx::Error> {
    let row = sqlx::query("SELECT * FROM subscriptions WHERE subscription_id = ?")
        .bind(subscription_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_subscription).transpose()
}

pub async fn list_subscriptions(
    pool: &Pool<Sqlite>,
    status: Option<SubscriptionStatus>,
    category_id: Option<i64>,
) -> Result<Vec<Subscription>, sqlx::Error> {
    let status = status.map(|s| s.as_str());
    sqlx::query(
        r#"
        SELECT *
        FROM subscriptions
        WHERE (? IS NULL OR status = ?)
          AND (? IS NULL OR category_id = ?)
        ORDER BY next_billing_date ASC, subscription_id ASC
        "#,
    )
    .bind(status)
    .bind(status)
    .bind(category_id)
    .bind(category_id)
    .fetch_all(pool)
    .await?
    .iter()
    .map(row_to_subscription)
    .collect()
}

// Active subscriptions falling due on or before `until`, soonest first.
pub async fn list_upcoming_subscriptions(
    pool: &Pool<Sqlite>,
    until: NaiveDate,
) -> Result<Vec<Subscription>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT *
        FROM subscriptions
        WHERE status = 'active' AND next_billing_date <= ?
        ORDER BY next_billing_date ASC, subscription_id ASC
        "#,
    )
    .bind(until)
    .fetch_all(pool)
    .await?
    .iter()
    .map(row_to_subscription)
    .collect()
}

// The renewal job's work list.
pub async fn list_due_auto_subscriptions(
    pool: &Pool<Sqlite>,
    today: NaiveDate,
) -> Result<Vec<Subscription>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT *
        FROM subscriptions
        WHERE status = 'active' AND renewal_type = 'auto' AND next_billing_date <= ?
        ORDER BY subscription_id ASC
        "#,
    )
    .bind(today)
    .fetch_all(pool)
    .await?
    .iter()
    .map(row_to_subscription)
    .collect()
}

pub async fn update_subscription(
    pool: &Pool<Sqlite>,
    subscription_id: i64,
    upd: &UpdateSubscription,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE subscriptions
        SET name = ?, plan = ?, billing_cycle = ?, amount = ?, currency = ?,
            next_billing_date = ?, status = ?, renewal_type = ?,
            category_id = ?, payment_method_id = ?, notes = ?
        WHERE subscription_id = ?
        "#,
    )
    .bind(&upd.name)
    .bind(&upd.plan)
    .bind(upd.billing_cycle.as_str())
    .bind(upd.amount.to_string())
    .bind(upd.currency.to_ascii_uppercase())
    .bind(upd.next_billing_date)
    .bind(upd.status.as_str())
    .bind(upd.renewal_type.as_str())
    .bind(upd.category_id.unwrap_or(1))
    .bind(upd.payment_method_id.unwrap_or(1))
    .bind(&upd.notes)
    .bind(subscription_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_subscription(
    pool: &Pool<Sqlite>,
    subscription_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM subscriptions WHERE subscription_id = ?")
        .bind(subscription_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/* The core write path of a renewal:
one database transaction inserts the payment rows, folds paid amounts into the
monthly summary, and moves the billing dates forward. If any step fails the
whole renewal rolls back. */
pub async fn apply_renewal(
    pool: &Pool<Sqlite>,
    subscription_id: i64,
    new_last: NaiveDate,
    new_next: NaiveDate,
    payments: &[NewPayment],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    for payment in payments {
        insert_payment_tx(&mut tx, payment).await?;
    }

    sqlx::query(
        r#"
        UPDATE subscriptions
        SET last_billing_date = ?, next_billing_date = ?
        WHERE subscription_id = ?
        "#,
    )
    .bind(new_last)
    .bind(new_next)
    .bind(subscription_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(())
}

/*==========Payment History Queries=========== */

fn row_to_payment(row: &SqliteRow) -> Result<Payment, sqlx::Error> {
    let status: String = row.try_get("status")?;

    Ok(Payment {
        payment_id: row.try_get("payment_id")?,
        subscription_id: row.try_get("subscription_id")?,
        category_id: row.try_get("category_id")?,
        amount: text_decimal(row, "amount")?,
        currency: row.try_get("currency")?,
        base_amount: text_decimal(row, "base_amount")?,
        period_start: row.try_get("period_start")?,
        period_end: row.try_get("period_end")?,
        paid_at: row.try_get("paid_at")?,
        status: PaymentStatus::parse(&status).ok_or_else(|| bad_enum("status", &status))?,
    })
}

async fn insert_payment_tx(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    payment: &NewPayment,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO payment_history (
            subscription_id, category_id, amount, currency, base_amount,
            period_start, period_end, paid_at, status
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, datetime('now'), ?)
        RETURNING payment_id
        "#,
    )
    .bind(payment.subscription_id)
    .bind(payment.category_id)
    .bind(payment.amount.to_string())
    .bind(payment.currency.to_ascii_uppercase())
    .bind(payment.base_amount.to_string())
    .bind(payment.period_start)
    .bind(payment.period_end)
    .bind(payment.status.as_str())
    .fetch_one(&mut **tx)
    .await?;

    let payment_id: i64 = row.try_get("payment_id")?;

    if payment.status == PaymentStatus::Paid {
        add_to_summary(
            &mut **tx,
            payment.period_start,
            payment.category_id,
            payment.base_amount,
            1,
        )
        .await?;
    }

    Ok(payment_id)
}

// Insert one payment and keep the summary in step.
pub async fn insert_payment(
    pool: &Pool<Sqlite>,
    payment: &NewPayment,
) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let payment_id = insert_payment_tx(&mut tx, payment).await?;
    tx.commit().await?;
    Ok(payment_id)
}

pub async fn list_payments(
    pool: &Pool<Sqlite>,
    subscription_id: Option<i64>,
    year: Option<i32>,
    month: Option<u32>,
) -> Result<Vec<Payment>, sqlx::Error> {
    let year = year.map(|y| format!("{:04}", y));
    let month = month.map(|m| format!("{:02}", m));

    sqlx::query(
        r#"
        SELECT *
        FROM payment_history
        WHERE (? IS NULL OR subscription_id = ?)
          AND (? IS NULL OR strftime('%Y', period_start) = ?)
          AND (? IS NULL OR strftime('%m', period_start) = ?)
        ORDER BY period_start DESC, payment_id DESC
        "#,
    )
    .bind(subscription_id)
    .bind(subscription_id)
    .bind(&year)
    .bind(&year)
    .bind(&month)
    .bind(&month)
    .fetch_all(pool)
    .await?
    .iter()
    .map(row_to_payment)
    .collect()
}

// Deleting a paid payment backs its amount out of the summary first.
pub async fn delete_payment(pool: &Pool<Sqlite>, payment_id: i64) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query("SELECT * FROM payment_history WHERE payment_id = ?")
        .bind(payment_id)
        .fetch_optional(&mut *tx)
        .await?;

    let Some(row) = row else {
        return Ok(false);
    };
    let payment = row_to_payment(&row)?;

    if payment.status == PaymentStatus::Paid {
        add_to_summary(
            &mut *tx,
            payment.period_start,
            payment.category_id,
            -payment.base_amount,
            -1,
        )
        .await?;
    }

    sqlx::query("DELETE FROM payment_history WHERE payment_id = ?")
        .bind(payment_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(true)
}

/*==========Category Queries=========== */

pub async fn create_category(
    pool: &Pool<Sqlite>,
    category_name: &str,
    icon: &str,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO categories (category_name, icon)
        VALUES (?, ?)
        RETURNING category_id
        "#,
    )
    .bind(category_name)
    .bind(icon)
    .fetch_one(pool)
    .await?;

    row.try_get("category_id")
}

pub async fn list_categories(pool: &Pool<Sqlite>) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY category_id ASC")
        .fetch_all(pool)
        .await
}

pub async fn update_category(
    pool: &Pool<Sqlite>,
    category_id: i64,
    category_name: &str,
    icon: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE categories SET category_name = ?, icon = ? WHERE category_id = ?",
    )
    .bind(category_name)
    .bind(icon)
    .bind(category_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_category(pool: &Pool<Sqlite>, category_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM categories WHERE category_id = ?")
        .bind(category_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/*==========Payment Method Queries=========== */

pub async fn create_payment_method(
    pool: &Pool<Sqlite>,
    method_name: &str,
    icon: &str,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO payment_methods (method_name, icon)
        VALUES (?, ?)
        RETURNING payment_method_id
        "#,
    )
    .bind(method_name)
    .bind(icon)
    .fetch_one(pool)
    .await?;

    row.try_get("payment_method_id")
}

pub async fn list_payment_methods(pool: &Pool<Sqlite>) -> Result<Vec<PaymentMethod>, sqlx::Error> {
    sqlx::query_as::<_, PaymentMethod>(
        "SELECT * FROM payment_methods ORDER BY payment_method_id ASC",
    )
    .fetch_all(pool)
    .await
}

pub async fn update_payment_method(
    pool: &Pool<Sqlite>,
    payment_method_id: i64,
    method_name: &str,
    icon: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE payment_methods SET method_name = ?, icon = ? WHERE payment_method_id = ?",
    )
    .bind(method_name)
    .bind(icon)
    .bind(payment_method_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_payment_method(
    pool: &Pool<Sqlite>,
    payment_method_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM payment_methods WHERE payment_method_id = ?")
        .bind(payment_method_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/*==========Exchange Rate Queries=========== */

pub async fn upsert_rate(
    pool: &Pool<Sqlite>,
    base_currency: &str,
    currency: &str,
    rate: Decimal,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO exchange_rates (base_currency, currency, rate, fetched_at)
        VALUES (?, ?, ?, datetime('now'))
        ON CONFLICT (base_currency, currency)
        DO UPDATE SET rate = excluded.rate, fetched_at = excluded.fetched_at
        "#,
    )
    .bind(base_currency.to_ascii_uppercase())
    .bind(currency.to_ascii_uppercase())
    .bind(rate.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn list_rates(pool: &Pool<Sqlite>) -> Result<Vec<ExchangeRate>, sqlx::Error> {
    sqlx::query(
        "SELECT * FROM exchange_rates ORDER BY base_currency ASC, currency ASC",
    )
    .fetch_all(pool)
    .await?
    .iter()
    .map(|row| {
        Ok(ExchangeRate {
            base_currency: row.try_get("base_currency")?,
            currency: row.try_get("currency")?,
            rate: text_decimal(row, "rate")?,
            fetched_at: row.try_get("fetched_at")?,
        })
    })
    .collect()
}

// Quote currency -> rate, for the conversion helper.
pub async fn get_rate_map(
    pool: &Pool<Sqlite>,
    base_currency: &str,
) -> Result<HashMap<String, Decimal>, sqlx::Error> {
    let rows = sqlx::query("SELECT currency, rate FROM exchange_rates WHERE base_currency = ?")
        .bind(base_currency.to_ascii_uppercase())
        .fetch_all(pool)
        .await?;

    let mut map = HashMap::with_capacity(rows.len());
    for row in &rows {
        let currency: String = row.try_get("currency")?;
        map.insert(currency, text_decimal(row, "rate")?);
    }
    Ok(map)
}

pub async fn clear_rates(pool: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM exchange_rates").execute(pool).await?;
    Ok(())
}

/*==========Settings Queries=========== */

pub async fn get_settings(pool: &Pool<Sqlite>) -> Result<Settings, sqlx::Error> {
    let row = sqlx::query(
        "SELECT base_currency, theme, rate_refresh_hour FROM settings WHERE settings_id = 1",
    )
    .fetch_one(pool)
    .await?;

    let theme: String = row.try_get("theme")?;
    let hour: i64 = row.try_get("rate_refresh_hour")?;

    Ok(Settings {
        base_currency: row.try_get("base_currency")?,
        theme: Theme::parse(&theme).ok_or_else(|| bad_enum("theme", &theme))?,
        rate_refresh_hour: hour as u8,
    })
}

pub async fn update_settings(pool: &Pool<Sqlite>, settings: &Settings) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE settings
        SET base_currency = ?, theme = ?, rate_refresh_hour = ?
        WHERE settings_id = 1
        "#,
    )
    .bind(settings.base_currency.to_ascii_uppercase())
    .bind(settings.theme.as_str())
    .bind(settings.rate_refresh_hour as i64)
    .execute(pool)
    .await?;

    Ok(())
}

/*==========Monthly Summary Queries=========== */

async fn add_to_summary(
    conn: &mut SqliteConnection,
    period_start: NaiveDate,
    category_id: i64,
    base_amount: Decimal,
    count_delta: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO monthly_category_summary (year, month, category_id, total_base_amount, payment_count)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (year, month, category_id)
        DO UPDATE SET
            total_base_amount = CAST(ROUND(CAST(total_base_amount AS NUMERIC)
                                           + CAST(excluded.total_base_amount AS NUMERIC), 2) AS TEXT),
            payment_count = payment_count + excluded.payment_count
        "#,
    )
    .bind(period_start.year() as i64)
    .bind(period_start.month() as i64)
    .bind(category_id)
    .bind(base_amount.to_string())
    .bind(count_delta)
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn list_summary(
    pool: &Pool<Sqlite>,
    year: i32,
) -> Result<Vec<MonthlySummary>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT s.year, s.month, s.category_id, c.category_name,
               s.total_base_amount, s.payment_count
        FROM monthly_category_summary s
        JOIN categories c ON c.category_id = s.category_id
        WHERE s.year = ?
        ORDER BY s.month ASC, s.category_id ASC
        "#,
    )
    .bind(year as i64)
    .fetch_all(pool)
    .await?
    .iter()
    .map(|row| {
        Ok(MonthlySummary {
            year: row.try_get("year")?,
            month: row.try_get("month")?,
            category_id: row.try_get("category_id")?,
            category_name: row.try_get("category_name")?,
            total_base_amount: text_decimal(row, "total_base_amount")?,
            payment_count: row.try_get("payment_count")?,
        })
    })
    .collect()
}

// Recompute the whole table from payment history.
pub async fn rebuild_summary(pool: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM monthly_category_summary")
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO monthly_category_summary (year, month, category_id, total_base_amount, payment_count)
        SELECT CAST(strftime('%Y', period_start) AS INTEGER),
               CAST(strftime('%m', period_start) AS INTEGER),
               category_id,
               CAST(ROUND(SUM(CAST(base_amount AS NUMERIC)), 2) AS TEXT),
               COUNT(*)
        FROM payment_history
        WHERE status = 'paid'
        GROUP BY 1, 2, 3
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(())
}

/*==========Seeding=========== */

// Fixed label dictionaries plus the singleton settings row. The first category
// and payment method (id 1) are the fallback targets for delete rules.
pub async fn seed_defaults(pool: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
    const CATEGORIES: &[(&str, &str)] = &[
        ("other", "📦"),
        ("software", "💻"),
        ("entertainment", "🎬"),
        ("music", "🎵"),
        ("cloud", "☁️"),
        ("utilities", "🔌"),
        ("news", "📰"),
        ("fitness", "🏃"),
        ("education", "📚"),
    ];

    const PAYMENT_METHODS: &[(&str, &str)] = &[
        ("other", "💳"),
        ("credit card", "💳"),
        ("debit card", "💳"),
        ("alipay", "📱"),
        ("wechat pay", "📱"),
        ("paypal", "🅿️"),
        ("bank transfer", "🏦"),
        ("apple pay", "🍎"),
    ];

    for (name, icon) in CATEGORIES {
        sqlx::query("INSERT OR IGNORE INTO categories (category_name, icon) VALUES (?, ?)")
            .bind(name)
            .bind(icon)
            .execute(pool)
            .await?;
    }

    for (name, icon) in PAYMENT_METHODS {
        sqlx::query("INSERT OR IGNORE INTO payment_methods (method_name, icon) VALUES (?, ?)")
            .bind(name)
            .bind(icon)
            .execute(pool)
            .await?;
    }

    sqlx::query("INSERT OR IGNORE INTO settings (settings_id) VALUES (1)")
        .execute(pool)
        .await?;

    Ok(())
}
