//! A thin client for the parts of the Stripe API that the voucher payment gateway uses:
//! creating Checkout Sessions, and the event payloads delivered to the webhook endpoint.
mod api;
mod config;
mod error;

mod data_objects;

pub use api::StripeApi;
pub use config::StripeConfig;
pub use data_objects::{
    CheckoutSessionObject,
    NewCheckoutSession,
    PaymentIntentObject,
    StripeCheckoutSession,
    StripeEvent,
};
pub use error::StripeApiError;
