use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::backend::{auth, handlers, AppState};

pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/subscriptions",
            get(handlers::subscriptions::list).post(handlers::subscriptions::create),
        )
        .route(
            "/api/subscriptions/upcoming",
            get(handlers::subscriptions::upcoming),
        )
        .route(
            "/api/subscriptions/:id",
            get(handlers::subscriptions::get_one)
                .put(handlers::subscriptions::update)
                .delete(handlers::subscriptions::remove),
        )
        .route(
            "/api/subscriptions/:id/renew",
            post(handlers::subscriptions::renew),
        )
        .route(
            "/api/payments",
            get(handlers::payments::list).post(handlers::payments::create),
        )
        .route("/api/payments/:id", delete(handlers::payments::remove))
        .route(
            "/api/categories",
            get(handlers::categories::list).post(handlers::categories::create),
        )
        .route(
            "/api/categories/:id",
            put(handlers::categories::update).delete(handlers::categories::remove),
        )
        .route(
            "/api/payment_methods",
            get(handlers::payment_methods::list).post(handlers::payment_methods::create),
        )
        .route(
            "/api/payment_methods/:id",
            put(handlers::payment_methods::update).delete(handlers::payment_methods::remove),
        )
        .route("/api/rates", get(handlers::rates::list))
        .route("/api/rates/refresh", post(handlers::rates::refresh))
        .route("/api/summary/monthly", get(handlers::summary::monthly))
        .route("/api/summary/rebuild", post(handlers::summary::rebuild))
        .route(
            "/api/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .layer(middleware::from_fn_with_state(state, auth::require_token))
}
