// src/main.rs
use std::env;

use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use subscription_tracker::backend::{self, AppState};
use subscription_tracker::config::Config;
use subscription_tracker::database::db::{connection, migrate, queries};
use subscription_tracker::jobs;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = connection::get_db_pool(&config.database_url).await?;
    migrate::run_migrations(&pool).await?;
    queries::seed_defaults(&pool).await?;

    let state = AppState::new(pool, config);

    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && args[1] == "tick" {
        // one daily pass for an external cron, then exit
        tracing::info!("running daily jobs once");
        jobs::run_daily(&state).await;
    } else {
        jobs::spawn_scheduler(state.clone());
        backend::run_server(state).await?;
    }

    Ok(())
}
