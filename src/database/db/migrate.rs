use anyhow::Result;
use sqlx::{Pool, Sqlite};

pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::debug!("database schema is up to date");
    Ok(())
}
