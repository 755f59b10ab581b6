use actix_web::{http::StatusCode, test::TestRequest};
use serde_json::{json, Value};
use voucher_payment_engine::db_types::Order;

use super::helpers::{call, post_json, test_context};

fn new_order_body() -> Value {
    json!({
        "customer_email": "dev@example.com",
        "product_name": "Vue Mid: Voucher Only",
        "country_name": "India",
        "quantity": 2
    })
}

#[actix_web::test]
async fn health_check() {
    let ctx = test_context().await;
    let (status, body) = call(&ctx, TestRequest::get().uri("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn create_order_returns_the_pending_order() {
    let ctx = test_context().await;
    let (status, body) = call(&ctx, post_json("/api/orders", new_order_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    let order: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(order.customer_email, "dev@example.com");
    assert_eq!(order.status.to_string(), "Pending");
    assert!(order.unit_price.is_none());
}

#[actix_web::test]
async fn create_order_with_bad_email_is_rejected() {
    let ctx = test_context().await;
    let mut body = new_order_body();
    body["customer_email"] = json!("not-an-email");
    let (status, body) = call(&ctx, post_json("/api/orders", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("not-an-email"));
    assert_eq!(ctx.db.order_count(), 0);
}

#[actix_web::test]
async fn process_order_runs_the_pipeline() {
    let ctx = test_context().await;
    let (_, body) = call(&ctx, post_json("/api/orders", new_order_body())).await;
    let order: Order = serde_json::from_str(&body).unwrap();

    let path = format!("/api/orders/{}/process", order.id.value());
    let (status, body) = call(&ctx, post_json(&path, json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    let order: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(order.status.to_string(), "Processed");
    assert_eq!(order.session_id.as_deref(), Some("cs_test_1"));
    assert_eq!(ctx.notifier.sent().len(), 1);
}

#[actix_web::test]
async fn process_unknown_order_is_404() {
    let ctx = test_context().await;
    let (status, _) = call(&ctx, post_json("/api/orders/999/process", json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn double_processing_is_a_conflict() {
    let ctx = test_context().await;
    let (_, body) = call(&ctx, post_json("/api/orders", new_order_body())).await;
    let order: Order = serde_json::from_str(&body).unwrap();
    let path = format!("/api/orders/{}/process", order.id.value());

    let (status, _) = call(&ctx, post_json(&path, json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&ctx, post_json(&path, json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(ctx.payments.session_count(), 1);
}

#[actix_web::test]
async fn provider_outage_is_a_bad_gateway() {
    let ctx = test_context().await;
    let (_, body) = call(&ctx, post_json("/api/orders", new_order_body())).await;
    let order: Order = serde_json::from_str(&body).unwrap();
    ctx.payments.fail_next_requests(true);

    let path = format!("/api/orders/{}/process", order.id.value());
    let (status, _) = call(&ctx, post_json(&path, json!({}))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(ctx.notifier.sent().is_empty());
}

#[actix_web::test]
async fn pricing_endpoint_returns_a_quote() {
    let ctx = test_context().await;
    let body = json!({ "product_name": "Vue Mid: Voucher Only", "country_name": "India", "quantity": 2 });
    let (status, body) = call(&ctx, post_json("/api/pricing", body)).await;
    assert_eq!(status, StatusCode::OK);
    let quote: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(quote["unit_price"], json!(11_000));
    assert_eq!(quote["ppp_tier"], json!("Tier 3"));
    assert_eq!(quote["synthetic"], json!(false));
}

#[actix_web::test]
async fn pricing_with_nonpositive_quantity_is_rejected() {
    let ctx = test_context().await;
    let body = json!({ "product_name": "Vue Mid: Voucher Only", "country_name": "India", "quantity": 0 });
    let (status, _) = call(&ctx, post_json("/api/pricing", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
