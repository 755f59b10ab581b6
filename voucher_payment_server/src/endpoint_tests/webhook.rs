use actix_web::{http::StatusCode, test::TestRequest};
use serde_json::{json, Value};
use voucher_payment_engine::db_types::{Order, PaymentStatus};

use super::helpers::{call, post_json, test_context, TestContext, TEST_WEBHOOK_SECRET};
use crate::helpers::{sign_webhook_payload, STRIPE_SIGNATURE_HEADER};

async fn processed_order(ctx: &TestContext) -> Order {
    let body = json!({
        "customer_email": "dev@example.com",
        "product_name": "Vue Mid: Voucher Only",
        "country_name": "India",
        "quantity": 2
    });
    let (_, body) = call(ctx, post_json("/api/orders", body)).await;
    let order: Order = serde_json::from_str(&body).unwrap();
    let path = format!("/api/orders/{}/process", order.id.value());
    let (_, body) = call(ctx, post_json(&path, json!({}))).await;
    serde_json::from_str(&body).unwrap()
}

fn session_completed_event(order: &Order) -> Value {
    json!({
        "id": "evt_1",
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": order.session_id.clone().unwrap(),
            "metadata": { "order_id": order.id.value().to_string() },
            "amount_total": 22000,
            "payment_status": "paid"
        }}
    })
}

fn signed_webhook(event: &Value) -> TestRequest {
    let body = event.to_string();
    let header = sign_webhook_payload(TEST_WEBHOOK_SECRET, "1714501234", body.as_bytes());
    TestRequest::post()
        .uri("/webhook/stripe")
        .insert_header((STRIPE_SIGNATURE_HEADER, header))
        .insert_header(("Content-Type", "application/json"))
        .set_payload(body)
}

#[actix_web::test]
async fn completed_session_marks_the_order_paid() {
    let ctx = test_context().await;
    let order = processed_order(&ctx).await;

    let (status, body) = call(&ctx, signed_webhook(&session_completed_event(&order))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"success\":true"));

    let order = ctx.fetch_order(order.id).await;
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    assert_eq!(order.amount_paid.map(|a| a.value()), Some(22000));
}

#[actix_web::test]
async fn redelivered_webhooks_are_acknowledged_without_changes() {
    let ctx = test_context().await;
    let order = processed_order(&ctx).await;
    let event = session_completed_event(&order);

    call(&ctx, signed_webhook(&event)).await;
    let first = ctx.fetch_order(order.id).await;
    let (status, _) = call(&ctx, signed_webhook(&event)).await;
    assert_eq!(status, StatusCode::OK);
    let second = ctx.fetch_order(order.id).await;
    assert_eq!(first.paid_at, second.paid_at);
}

#[actix_web::test]
async fn missing_signature_is_unauthorized() {
    let ctx = test_context().await;
    let order = processed_order(&ctx).await;
    let body = session_completed_event(&order).to_string();
    let req = TestRequest::post()
        .uri("/webhook/stripe")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(body);
    let (status, _) = call(&ctx, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(ctx.fetch_order(order.id).await.payment_status, PaymentStatus::Unpaid);
}

#[actix_web::test]
async fn tampered_payloads_are_unauthorized() {
    let ctx = test_context().await;
    let order = processed_order(&ctx).await;
    let event = session_completed_event(&order);
    let header = sign_webhook_payload(TEST_WEBHOOK_SECRET, "1714501234", event.to_string().as_bytes());

    let mut tampered = event.clone();
    tampered["data"]["object"]["amount_total"] = json!(1);
    let req = TestRequest::post()
        .uri("/webhook/stripe")
        .insert_header((STRIPE_SIGNATURE_HEADER, header))
        .insert_header(("Content-Type", "application/json"))
        .set_payload(tampered.to_string());
    let (status, _) = call(&ctx, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn failed_payment_intents_are_recorded() {
    let ctx = test_context().await;
    let order = processed_order(&ctx).await;
    let event = json!({
        "id": "evt_2",
        "type": "payment_intent.payment_failed",
        "data": { "object": {
            "id": "pi_1",
            "metadata": { "order_id": order.id.value().to_string() },
            "last_payment_error": { "code": "card_declined", "message": "Your card was declined." }
        }}
    });
    let (status, body) = call(&ctx, signed_webhook(&event)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"success\":true"));
    let order = ctx.fetch_order(order.id).await;
    assert_eq!(order.payment_status, PaymentStatus::Failed);
    // The processing status is untouched by payment events.
    assert_eq!(order.status.to_string(), "Processed");
}

#[actix_web::test]
async fn unknown_event_types_are_acknowledged_and_ignored() {
    let ctx = test_context().await;
    let event = json!({
        "id": "evt_3",
        "type": "customer.created",
        "data": { "object": { "id": "cus_1" } }
    });
    let (status, body) = call(&ctx, signed_webhook(&event)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Ignored event type"));
}

#[actix_web::test]
async fn events_for_unknown_orders_are_acknowledged_as_failures() {
    let ctx = test_context().await;
    let event = json!({
        "id": "evt_4",
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": "cs_test_zzz",
            "metadata": { "order_id": "999" },
            "amount_total": 100
        }}
    });
    let (status, body) = call(&ctx, signed_webhook(&event)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"success\":false"));
}
