//! The seams between the engine and its external collaborators.
//!
//! All durable state lives behind [`ShopDatabase`]; the payment provider and the email notifier
//! are reached through [`PaymentProvider`] and [`Notifier`]. Handles are passed into the API
//! constructors explicitly so that every collaborator can be faked in tests.
mod notifier;
mod payment_provider;
mod store;

pub use notifier::{NotificationError, Notifier, OrderConfirmation};
pub use payment_provider::{CheckoutRequest, CheckoutSession, CheckoutSessionError, PaymentProvider};
pub use store::{FinishedStatus, ShopDatabase, StoreError};
