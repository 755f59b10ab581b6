use thiserror::Error;
use vpg_common::UsdPrice;

use crate::db_types::OrderId;

/// The data carried by an order-confirmation email.
#[derive(Debug, Clone)]
pub struct OrderConfirmation<'a> {
    pub order_id: OrderId,
    pub recipient: &'a str,
    pub product_name: &'a str,
    pub quantity: i64,
    pub total_price: UsdPrice,
    pub checkout_url: &'a str,
}

#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    #[error("The notifier rejected the message: {0}")]
    Send(String),
    #[error("The notifier did not respond within {0}s")]
    Timeout(u64),
}

/// Sends the order-confirmation email carrying the checkout link.
///
/// Failure here is non-fatal to the order lifecycle: the order flow logs it and carries on,
/// because the checkout session stays valid and the customer can still pay via other channels.
/// Retries, if any, belong to the implementation, not the core.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    /// Returns the provider's message id on success.
    async fn send_confirmation(&self, confirmation: &OrderConfirmation<'_>) -> Result<String, NotificationError>;
}
