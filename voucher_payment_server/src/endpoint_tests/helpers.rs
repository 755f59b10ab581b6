use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    App,
};
use vpg_common::{Secret, UsdPrice};
use voucher_payment_engine::{
    db_types::{Order, OrderId, PppTier},
    test_utils::{MemoryStore, TestNotifier, TestPaymentProvider},
    tiers::volume_band,
    traits::ShopDatabase,
    OrderFlowApi,
};

use crate::routes::{configure_api, WebhookSecret};

pub const TEST_WEBHOOK_SECRET: &str = "whsec_endpoint_tests";

/// The fakes behind a test app instance. Kept so tests can seed data and assert on side effects
/// after the request comes back.
pub struct TestContext {
    pub db: MemoryStore,
    pub payments: TestPaymentProvider,
    pub notifier: TestNotifier,
}

impl TestContext {
    pub async fn fetch_order(&self, id: OrderId) -> Order {
        self.db.fetch_order_by_id(id).await.unwrap().expect("order should exist")
    }
}

pub async fn test_context() -> TestContext {
    let _ = env_logger::try_init();
    let db = MemoryStore::new();
    let product = db.upsert_product("Vue Mid: Voucher Only").await.unwrap();
    db.upsert_classification("India", PppTier::Tier3).await.unwrap();
    db.insert_rate(product.id, PppTier::Tier3, &volume_band(1), UsdPrice::from_cents(11_000)).await.unwrap();
    TestContext { db, payments: TestPaymentProvider::new(), notifier: TestNotifier::new() }
}

/// Runs one request against a freshly wired app over the context's fakes.
pub async fn call(ctx: &TestContext, req: TestRequest) -> (StatusCode, String) {
    let api = OrderFlowApi::new(ctx.db.clone(), ctx.payments.clone(), ctx.notifier.clone());
    let secret = WebhookSecret(Secret::new(TEST_WEBHOOK_SECRET.to_string()));
    let app = App::new()
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(secret))
        .configure(configure_api::<MemoryStore, TestPaymentProvider, TestNotifier>);
    let service = test::init_service(app).await;
    let (_, res) = test::call_service(&service, req.to_request()).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

pub fn post_json(path: &str, body: serde_json::Value) -> TestRequest {
    TestRequest::post().uri(path).set_json(body)
}
