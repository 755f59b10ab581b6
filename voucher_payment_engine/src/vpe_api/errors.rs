use thiserror::Error;

use crate::{
    db_types::{OrderId, OrderStatus},
    traits::{CheckoutSessionError, StoreError},
};

#[derive(Debug, Clone, Error)]
pub enum PricingError {
    /// Malformed request. Raised before any lookup is attempted; no state is touched.
    #[error("Invalid pricing input: {0}")]
    InvalidInput(String),
    /// A hard datastore failure. Distinct from "no matching row", which the resolver absorbs via
    /// the fallback chain and never surfaces.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    /// Malformed request (bad email, non-positive quantity, missing fields). Rejected at the
    /// boundary; no order row is written.
    #[error("Invalid order input: {0}")]
    InvalidInput(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    /// A processing trigger found the order already claimed or terminal. The losing trigger
    /// performs no side effects.
    #[error("Order {0} is not pending (current status: {1})")]
    OrderNotPending(OrderId, OrderStatus),
    /// The payment provider could not open a checkout session. The order has been moved to
    /// `Error` and no confirmation email was sent.
    #[error("Could not create a checkout session for order {0}: {1}")]
    CheckoutSession(OrderId, CheckoutSessionError),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
