mod auth;
mod handlers;
mod routes;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use sqlx::{Pool, Sqlite};
use tower_http::cors::CorsLayer;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Sqlite>,
    pub config: Arc<Config>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(db: Pool<Sqlite>, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }
}

// Router assembly is separate from serving so tests can drive it directly.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "Backend is running" }))
        .merge(routes::api_routes(state.clone()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.bind_addr;
    let app = build_router(state);

    tracing::info!(%addr, "server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
