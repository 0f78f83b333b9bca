use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{Pool, Sqlite};

use crate::billing;
use crate::currency;
use crate::database::db::queries;
use crate::database::models::{NewPayment, PaymentStatus, Subscription};
use crate::error::AppError;

#[derive(Debug, Default)]
pub struct RenewalReport {
    pub renewed: usize,
    pub payments: usize,
    /// subscriptions left untouched because their currency has no rate
    pub skipped: usize,
}

#[derive(Debug, Serialize)]
pub struct RenewalOutcome {
    pub subscription_id: i64,
    pub periods: u32,
    pub last_billing_date: NaiveDate,
    pub next_billing_date: NaiveDate,
}

/// Advance every active auto-renewing subscription whose due date has
/// arrived. A subscription whose currency cannot be converted is skipped and
/// retried next tick; the rest still process.
pub async fn process_due(pool: &Pool<Sqlite>, today: NaiveDate) -> Result<RenewalReport, AppError> {
    let settings = queries::get_settings(pool).await?;
    let rates = queries::get_rate_map(pool, &settings.base_currency).await?;
    let due = queries::list_due_auto_subscriptions(pool, today).await?;

    let mut report = RenewalReport::default();

    for sub in &due {
        let (_, periods) = billing::roll_forward(sub.next_billing_date, sub.billing_cycle, today);

        match renew_periods(pool, sub, periods, &settings.base_currency, &rates).await {
            Ok(outcome) => {
                tracing::info!(
                    subscription_id = sub.subscription_id,
                    name = %sub.name,
                    periods = outcome.periods,
                    next = %outcome.next_billing_date,
                    "subscription renewed"
                );
                report.renewed += 1;
                report.payments += outcome.periods as usize;
            }
            Err(AppError::MissingRate(c)) => {
                tracing::warn!(
                    subscription_id = sub.subscription_id,
                    name = %sub.name,
                    currency = %c,
                    "no exchange rate, subscription left for next tick"
                );
                report.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(report)
}

/// Record `periods` consecutive billing events starting at the subscription's
/// current due date, then move last/next billing dates forward. One database
/// transaction covers the whole renewal.
pub async fn renew_periods(
    pool: &Pool<Sqlite>,
    sub: &Subscription,
    periods: u32,
    base_currency: &str,
    rates: &HashMap<String, Decimal>,
) -> Result<RenewalOutcome, AppError> {
    let periods = periods.max(1);

    let base_amount = currency::convert_to_base(sub.amount, &sub.currency, base_currency, rates)
        .ok_or_else(|| AppError::MissingRate(sub.currency.clone()))?;

    let mut payments = Vec::with_capacity(periods as usize);
    let mut period_start = sub.next_billing_date;
    for _ in 0..periods {
        payments.push(NewPayment {
            subscription_id: sub.subscription_id,
            category_id: sub.category_id,
            amount: sub.amount,
            currency: sub.currency.clone(),
            base_amount,
            period_start,
            period_end: billing::period_end(period_start, sub.billing_cycle),
            status: PaymentStatus::Paid,
        });
        period_start = billing::advance_date(period_start, sub.billing_cycle);
    }

    // the last recorded period is the new "last billed" anchor
    let last_billing_date = payments[payments.len() - 1].period_start;
    let next_billing_date = period_start;

    queries::apply_renewal(
        pool,
        sub.subscription_id,
        last_billing_date,
        next_billing_date,
        &payments,
    )
    .await?;

    Ok(RenewalOutcome {
        subscription_id: sub.subscription_id,
        periods,
        last_billing_date,
        next_billing_date,
    })
}
