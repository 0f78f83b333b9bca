pub mod exchange;
pub mod renewal;

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use crate::backend::AppState;
use crate::database::db::queries;

pub fn spawn_scheduler(state: AppState) -> JoinHandle<()> {
    tokio::spawn(scheduler_loop(state))
}

// One tick per day at the configured UTC hour. The hour is re-read from
// settings before each sleep so changes apply without a restart.
async fn scheduler_loop(state: AppState) {
    loop {
        let hour = match queries::get_settings(&state.db).await {
            Ok(settings) => settings.rate_refresh_hour as u32,
            Err(e) => {
                tracing::warn!(error = %e, "could not read settings, using default tick hour");
                2
            }
        };

        let wait = duration_until_hour(Utc::now(), hour);
        tracing::info!(seconds = wait.as_secs(), hour, "next daily tick scheduled");
        tokio::time::sleep(wait).await;

        run_daily(&state).await;
    }
}

/// Time until the next occurrence of `hour`:00 UTC, strictly in the future.
pub fn duration_until_hour(now: DateTime<Utc>, hour: u32) -> Duration {
    let hour = hour.min(23);
    let today_run = now
        .date_naive()
        .and_hms_opt(hour, 0, 0)
        .unwrap_or_else(|| now.date_naive().and_hms_opt(0, 0, 0).expect("midnight"));

    let next = if now.naive_utc() < today_run {
        today_run
    } else {
        today_run + chrono::Duration::days(1)
    };

    (next - now.naive_utc())
        .to_std()
        .unwrap_or(Duration::from_secs(60))
}

// Rate refresh first so renewals convert with today's table. Each job logs and
// swallows its own failure; a dead FX API must not stop renewals.
pub async fn run_daily(state: &AppState) {
    match exchange::refresh_rates(state).await {
        Ok(updated) => tracing::info!(updated, "exchange rates refreshed"),
        Err(e) => tracing::warn!(error = %e, "exchange rate refresh failed"),
    }

    let today = Utc::now().date_naive();
    match renewal::process_due(&state.db, today).await {
        Ok(report) => tracing::info!(
            renewed = report.renewed,
            payments = report.payments,
            skipped = report.skipped,
            "renewal pass complete"
        ),
        Err(e) => tracing::error!(error = %e, "renewal pass failed"),
    }
}
