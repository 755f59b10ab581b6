use serde::{Deserialize, Serialize};
use thiserror::Error;
use vpg_common::UsdPrice;

use crate::db_types::OrderId;

/// Everything the external payment provider needs to open a checkout session for one order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub order_id: OrderId,
    pub customer_email: String,
    /// The line-item description shown on the checkout page.
    pub line_item: String,
    pub quantity: i64,
    pub unit_amount: UsdPrice,
    pub total_amount: UsdPrice,
}

/// The provider's response: an opaque session reference and the URL the customer pays at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub session_id: String,
    pub checkout_url: String,
}

#[derive(Debug, Clone, Error)]
pub enum CheckoutSessionError {
    #[error("The payment provider rejected the session request: {0}")]
    Provider(String),
    #[error("The payment provider did not respond within {0}s")]
    Timeout(u64),
}

/// Creates checkout sessions with the external payment provider.
///
/// Implementations must be retry-safe for an order that does not yet hold a session: the order id
/// travels in the session metadata, so a duplicate session for the same order is wasteful but not
/// harmful. Timeouts surface as errors; the order flow treats them as a failed checkout step.
#[allow(async_fn_in_trait)]
pub trait PaymentProvider {
    async fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession, CheckoutSessionError>;
}
