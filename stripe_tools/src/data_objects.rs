use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The inputs for a new Checkout Session. Amounts are integer cents, as Stripe expects.
#[derive(Debug, Clone, Serialize)]
pub struct NewCheckoutSession {
    pub order_id: i64,
    pub customer_email: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_amount_cents: i64,
}

/// The subset of Stripe's Checkout Session resource that the gateway reads back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeCheckoutSession {
    pub id: String,
    /// The hosted payment page. Present on freshly created sessions.
    pub url: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// A Stripe webhook event envelope. The payload shape under `data.object` depends on
/// `event_type`, so it is left as raw JSON for the handler to interpret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

/// `data.object` for `checkout.session.completed` events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSessionObject {
    pub id: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
}

/// `data.object` for `payment_intent.payment_failed` events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentObject {
    pub id: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub last_payment_error: Option<PaymentError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl CheckoutSessionObject {
    /// The order id the gateway stamped into the session metadata at creation time.
    pub fn order_id(&self) -> Option<i64> {
        self.metadata.get("order_id").and_then(|v| v.parse().ok())
    }
}

impl PaymentIntentObject {
    pub fn order_id(&self) -> Option<i64> {
        self.metadata.get("order_id").and_then(|v| v.parse().ok())
    }

    pub fn failure_reason(&self) -> String {
        self.last_payment_error
            .as_ref()
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| "unknown payment error".to_string())
    }
}
