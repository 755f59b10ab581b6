//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a line or two MUST go
//! into a separate module. Keep this module neat and tidy 🙏
//!
//! All handlers are generic over the engine traits so that endpoint tests can run the exact same
//! handler code against the in-memory fakes. [`configure_api`] wires the monomorphized handlers
//! into an actix `ServiceConfig`.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use stripe_tools::{CheckoutSessionObject, PaymentIntentObject, StripeEvent};
use vpg_common::{Secret, UsdPrice};
use voucher_payment_engine::{
    db_types::{NewOrder, OrderId},
    traits::{Notifier, PaymentProvider, ShopDatabase},
    OrderFlowApi,
    PaymentConfirmation,
    PaymentFailure,
};

use crate::{
    data_objects::{JsonResponse, NewOrderParams, PricingParams},
    errors::ServerError,
    helpers::{verify_webhook_signature, STRIPE_SIGNATURE_HEADER},
};

/// The webhook signing secret, injected as app data so the webhook handler stays generic.
#[derive(Debug, Clone, Default)]
pub struct WebhookSecret(pub Secret<String>);

pub fn configure_api<B, P, N>(cfg: &mut web::ServiceConfig)
where
    B: ShopDatabase + 'static,
    P: PaymentProvider + 'static,
    N: Notifier + 'static,
{
    cfg.service(health)
        .service(web::resource("/api/orders").route(web::post().to(create_order::<B, P, N>)))
        .service(web::resource("/api/orders/{id}/process").route(web::post().to(process_order::<B, P, N>)))
        .service(web::resource("/api/pricing").route(web::post().to(price_quote::<B, P, N>)))
        .service(web::resource("/webhook/stripe").route(web::post().to(stripe_webhook::<B, P, N>)));
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
pub async fn create_order<B, P, N>(
    body: web::Json<NewOrderParams>,
    api: web::Data<OrderFlowApi<B, P, N>>,
) -> Result<HttpResponse, ServerError>
where
    B: ShopDatabase + 'static,
    P: PaymentProvider + 'static,
    N: Notifier + 'static,
{
    let params = body.into_inner();
    trace!("💻️ Received new order request for \"{}\"", params.product_name);
    let new_order =
        NewOrder::new(params.customer_email, params.product_name, params.country_name, params.quantity);
    let order = api.create_order(new_order).await?;
    Ok(HttpResponse::Created().json(order))
}

pub async fn process_order<B, P, N>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B, P, N>>,
) -> Result<HttpResponse, ServerError>
where
    B: ShopDatabase + 'static,
    P: PaymentProvider + 'static,
    N: Notifier + 'static,
{
    let id = OrderId(path.into_inner());
    trace!("💻️ Received processing trigger for order {id}");
    let order = api.process_order(id).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Pricing  ----------------------------------------------------
pub async fn price_quote<B, P, N>(
    body: web::Json<PricingParams>,
    api: web::Data<OrderFlowApi<B, P, N>>,
) -> Result<HttpResponse, ServerError>
where
    B: ShopDatabase + 'static,
    P: PaymentProvider + 'static,
    N: Notifier + 'static,
{
    let params = body.into_inner();
    trace!("💻️ Received pricing request for \"{}\"", params.product_name);
    let quote =
        api.pricing().resolve_price(&params.product_name, &params.country_name, params.quantity).await?;
    Ok(HttpResponse::Ok().json(quote))
}

//----------------------------------------------   Webhook  ----------------------------------------------------
/// The Stripe event intake.
///
/// The raw body is verified against the `Stripe-Signature` header before any parsing; a bad or
/// missing signature is a 401. Once verified, responses are always 200-range so that Stripe does
/// not endlessly redeliver events this gateway cannot use; the outcome rides in the JSON body.
pub async fn stripe_webhook<B, P, N>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<OrderFlowApi<B, P, N>>,
    secret: web::Data<WebhookSecret>,
) -> Result<HttpResponse, ServerError>
where
    B: ShopDatabase + 'static,
    P: PaymentProvider + 'static,
    N: Notifier + 'static,
{
    trace!("💻️ Received webhook request: {}", req.uri());
    let header = req
        .headers()
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ServerError::InvalidWebhookSignature("Missing signature header".to_string()))?;
    verify_webhook_signature(secret.0.reveal(), header, &body)?;

    let event: StripeEvent = serde_json::from_slice(&body)
        .map_err(|e| ServerError::InvalidRequestBody(format!("Malformed event payload: {e}")))?;
    let result = match event.event_type.as_str() {
        "checkout.session.completed" => handle_session_completed(event, &api).await,
        "payment_intent.payment_failed" => handle_payment_failed(event, &api).await,
        other => {
            debug!("💻️ Ignoring webhook event type {other}");
            JsonResponse::success(format!("Ignored event type {other}"))
        },
    };
    Ok(HttpResponse::Ok().json(result))
}

async fn handle_session_completed<B, P, N>(event: StripeEvent, api: &OrderFlowApi<B, P, N>) -> JsonResponse
where
    B: ShopDatabase,
    P: PaymentProvider,
    N: Notifier,
{
    let session: CheckoutSessionObject = match serde_json::from_value(event.data.object) {
        Ok(s) => s,
        Err(e) => {
            warn!("💻️ Could not parse checkout session payload. {e}");
            return JsonResponse::failure("Malformed checkout session object");
        },
    };
    let Some(order_id) = session.order_id() else {
        warn!("💻️ Checkout session {} carries no order_id metadata. Ignoring.", session.id);
        return JsonResponse::failure("No order_id in session metadata");
    };
    let confirmation = PaymentConfirmation {
        order_id: OrderId(order_id),
        amount_paid: UsdPrice::from_cents(session.amount_total.unwrap_or_default()),
        session_id: session.id,
    };
    match api.confirm_payment(confirmation).await {
        Ok(order) => {
            info!("💻️ Payment confirmed for order {}", order.id);
            JsonResponse::success("Payment confirmed")
        },
        Err(e) => {
            warn!("💻️ Could not confirm payment for order #{order_id}. {e}");
            JsonResponse::failure(e.to_string())
        },
    }
}

async fn handle_payment_failed<B, P, N>(event: StripeEvent, api: &OrderFlowApi<B, P, N>) -> JsonResponse
where
    B: ShopDatabase,
    P: PaymentProvider,
    N: Notifier,
{
    let intent: PaymentIntentObject = match serde_json::from_value(event.data.object) {
        Ok(i) => i,
        Err(e) => {
            warn!("💻️ Could not parse payment intent payload. {e}");
            return JsonResponse::failure("Malformed payment intent object");
        },
    };
    let Some(order_id) = intent.order_id() else {
        warn!("💻️ Payment intent {} carries no order_id metadata. Ignoring.", intent.id);
        return JsonResponse::failure("No order_id in intent metadata");
    };
    let failure = PaymentFailure { order_id: OrderId(order_id), reason: intent.failure_reason() };
    match api.fail_payment(failure).await {
        Ok(order) => {
            info!("💻️ Payment failure recorded for order {}", order.id);
            JsonResponse::success("Payment failure recorded")
        },
        Err(e) => {
            warn!("💻️ Could not record payment failure for order #{order_id}. {e}");
            JsonResponse::failure(e.to_string())
        },
    }
}
