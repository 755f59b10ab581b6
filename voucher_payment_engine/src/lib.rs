//! Voucher Payment Engine
//!
//! The core of the certification-voucher order platform. This library turns a
//! (product, country, quantity) request into a unit price via two independently-applied discount
//! schedules (order-size volume bands and country purchasing-power-parity tiers), and drives an
//! order from creation through pricing, checkout-session issuance and payment confirmation.
//!
//! The library is divided into three main sections:
//! 1. The static tier catalog ([`mod@tiers`]) and the domain records ([`mod@db_types`]).
//! 2. The collaborator traits ([`mod@traits`]). The datastore ([`traits::ShopDatabase`]), the
//!    checkout-session creator ([`traits::PaymentProvider`]) and the confirmation notifier
//!    ([`traits::Notifier`]) are injected into the APIs explicitly; there are no process-wide
//!    singletons. SQLite is the bundled datastore backend.
//! 3. The public APIs ([`PricingApi`] and [`OrderFlowApi`]), which contain the pricing fallback
//!    policy and the order state machine respectively.
pub mod db_types;
pub mod helpers;
pub mod tiers;
pub mod traits;
mod vpe_api;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "test_utils")]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use vpe_api::{
    errors::{OrderFlowError, PricingError},
    order_flow_api::OrderFlowApi,
    order_objects::{PaymentConfirmation, PaymentFailure},
    pricing_api::{PriceQuote, PricingApi},
};
