use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};

/// Runtime configuration, read once at startup from the environment
/// (with `.env` loaded by the binary beforehand).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub fx_api_url: String,
    /// When set, every /api request must carry `Authorization: Bearer <token>`.
    pub api_token: Option<String>,
    /// Default window for the "upcoming" listing, in days.
    pub upcoming_days: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./subscriptions.db".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR is not a valid socket address")?;

        let fx_api_url = env::var("FX_API_URL")
            .unwrap_or_else(|_| "https://api.frankfurter.app".to_string());

        let api_token = env::var("API_TOKEN").ok().filter(|t| !t.is_empty());

        let upcoming_days = match env::var("RENEWAL_LOOKAHEAD_DAYS") {
            Ok(v) => v
                .parse::<i64>()
                .context("RENEWAL_LOOKAHEAD_DAYS is not a number")?,
            Err(_) => 7,
        };

        Ok(Self {
            database_url,
            bind_addr,
            fx_api_url,
            api_token,
            upcoming_days,
        })
    }
}
