use serde::{Deserialize, Serialize};
use vpg_common::UsdPrice;

use crate::db_types::OrderId;

/// A verified "payment completed" event from the payment provider, delivered at-least-once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub order_id: OrderId,
    /// The provider's final charged amount.
    pub amount_paid: UsdPrice,
    pub session_id: String,
}

/// A verified "payment failed" event from the payment provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentFailure {
    pub order_id: OrderId,
    pub reason: String,
}
