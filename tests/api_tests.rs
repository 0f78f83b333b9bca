mod support;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use subscription_tracker::backend::build_router;

use support::{test_pool, test_state, test_state_with_token};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_endpoint_is_open() {
    let app = build_router(test_state(test_pool().await));

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_and_list_subscriptions() {
    let app = build_router(test_state(test_pool().await));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/subscriptions",
            json!({
                "name": "Netflix",
                "billing_cycle": "monthly",
                "amount": "29.90",
                "currency": "cny",
                "next_billing_date": "2025-06-01"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = body_json(response).await;
    assert_eq!(created["name"], "Netflix");
    assert_eq!(created["currency"], "CNY");
    assert_eq!(created["status"], "active");
    assert_eq!(created["renewal_type"], "auto");
    assert_eq!(created["category_id"], 1);

    let response = app
        .clone()
        .oneshot(get_request("/api/subscriptions"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let listed = body_json(response).await;
    let rows = listed.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    // base currency equals the subscription currency, so conversion is identity
    assert_eq!(rows[0]["base_amount"], "29.90");

    let response = app
        .oneshot(get_request("/api/subscriptions?status=paused"))
        .await
        .unwrap();
    let filtered = body_json(response).await;
    assert!(filtered.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_subscription_is_rejected() {
    let app = build_router(test_state(test_pool().await));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/subscriptions",
            json!({
                "name": "Bad",
                "billing_cycle": "monthly",
                "amount": "-5",
                "currency": "CNY",
                "next_billing_date": "2025-06-01"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("amount"));

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/subscriptions",
            json!({
                "name": "Bad",
                "billing_cycle": "monthly",
                "amount": "5",
                "currency": "RENMINBI",
                "next_billing_date": "2025-06-01"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_subscription_is_404() {
    let app = build_router(test_state(test_pool().await));

    let response = app.oneshot(get_request("/api/subscriptions/999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn manual_renew_records_payment_and_rolls_dates() {
    let app = build_router(test_state(test_pool().await));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/subscriptions",
            json!({
                "name": "Gym",
                "billing_cycle": "monthly",
                "amount": "199.00",
                "currency": "CNY",
                "next_billing_date": "2099-01-31",
                "renewal_type": "manual"
            }),
        ))
        .await
        .unwrap();
    let id = body_json(response).await["subscription_id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/subscriptions/{id}/renew"),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let outcome = body_json(response).await;
    assert_eq!(outcome["periods"], 1);
    assert_eq!(outcome["last_billing_date"], "2099-01-31");
    assert_eq!(outcome["next_billing_date"], "2099-02-28");

    let response = app
        .oneshot(get_request(&format!("/api/payments?subscription_id={id}")))
        .await
        .unwrap();
    let payments = body_json(response).await;
    assert_eq!(payments.as_array().unwrap().len(), 1);
    assert_eq!(payments[0]["status"], "paid");
}

#[tokio::test]
async fn categories_seeded_and_conflicts_reported() {
    let app = build_router(test_state(test_pool().await));

    let response = app.clone().oneshot(get_request("/api/categories")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let categories = body_json(response).await;
    assert!(!categories.as_array().unwrap().is_empty());

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/categories",
            json!({ "category_name": "software" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/categories/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn settings_partial_update() {
    let app = build_router(test_state(test_pool().await));

    let response = app.clone().oneshot(get_request("/api/settings")).await.unwrap();
    let settings = body_json(response).await;
    assert_eq!(settings["base_currency"], "CNY");
    assert_eq!(settings["theme"], "system");

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/settings",
            json!({ "theme": "dark", "rate_refresh_hour": 4 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get_request("/api/settings")).await.unwrap();
    let settings = body_json(response).await;
    assert_eq!(settings["theme"], "dark");
    assert_eq!(settings["rate_refresh_hour"], 4);
    assert_eq!(settings["base_currency"], "CNY");
}

#[tokio::test]
async fn bearer_token_gates_api_but_not_health() {
    let app = build_router(test_state_with_token(test_pool().await, "sesame"));

    let response = app.clone().oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get_request("/api/categories")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/categories")
                .header(header::AUTHORIZATION, "Bearer wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/categories")
                .header(header::AUTHORIZATION, "Bearer sesame")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn rates_listing_reflects_stored_table() {
    let pool = test_pool().await;
    subscription_tracker::database::db::queries::upsert_rate(
        &pool,
        "CNY",
        "USD",
        rust_decimal::Decimal::new(14, 2),
    )
    .await
    .unwrap();

    let app = build_router(test_state(pool));
    let response = app.oneshot(get_request("/api/rates")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let rates = body_json(response).await;
    assert_eq!(rates[0]["base_currency"], "CNY");
    assert_eq!(rates[0]["currency"], "USD");
    assert_eq!(rates[0]["rate"], "0.14");
}

#[tokio::test]
async fn summary_rebuild_endpoint_recomputes() {
    let app = build_router(test_state(test_pool().await));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/subscriptions",
            json!({
                "name": "S",
                "billing_cycle": "monthly",
                "amount": "30.00",
                "currency": "CNY",
                "next_billing_date": "2099-03-01"
            }),
        ))
        .await
        .unwrap();
    let id = body_json(response).await["subscription_id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/payments",
            json!({ "subscription_id": id, "period_start": "2025-03-01" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/summary/rebuild", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request("/api/summary/monthly?year=2025"))
        .await
        .unwrap();
    let summary = body_json(response).await;
    let rows = summary.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["month"], 3);
    let total: rust_decimal::Decimal = rows[0]["total_base_amount"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(total, rust_decimal::Decimal::new(3000, 2));
    assert_eq!(rows[0]["payment_count"], 1);
}
