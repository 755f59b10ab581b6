use thiserror::Error;
use vpg_common::UsdPrice;

use crate::{
    db_types::{NewOrder, Order, OrderId, PppTier, Product},
    tiers::VolumeBand,
    traits::CheckoutSession,
};

/// The datastore contract for the voucher shop.
///
/// The rate table, product catalog and country classifications are read-only from the order
/// path's perspective. The order row is the only entity mutated per request, and every status
/// transition is a single-row *conditional* write: the update applies only if the current status
/// still matches, and "no matching row" comes back as `None` rather than an error. That is what
/// makes duplicate processing triggers and at-least-once webhooks safe.
#[allow(async_fn_in_trait)]
pub trait ShopDatabase: Clone {
    /// The URL of the underlying database.
    fn url(&self) -> &str;

    //----------------------------------     Catalog (read)     ------------------------------------------------------

    /// Point lookup of a product by its (unique) display name.
    async fn fetch_product_by_name(&self, name: &str) -> Result<Option<Product>, StoreError>;

    /// The PPP tier for a country, or `None` if the country has never been classified.
    async fn fetch_ppp_tier(&self, country_name: &str) -> Result<Option<PppTier>, StoreError>;

    /// Exact-match lookup on the rate table for (product, tier, band). `None` means no row, which
    /// the pricing resolver treats as a signal to fall back, not as a failure.
    async fn fetch_rate(
        &self,
        product_id: i64,
        tier: PppTier,
        band: &VolumeBand,
    ) -> Result<Option<UsdPrice>, StoreError>;

    //----------------------------------     Catalog (admin setup)     -----------------------------------------------

    /// Creates the product if it does not exist yet, returning the stored record either way.
    async fn upsert_product(&self, name: &str) -> Result<Product, StoreError>;

    /// Creates or replaces the PPP classification for a country.
    async fn upsert_classification(&self, country_name: &str, tier: PppTier) -> Result<(), StoreError>;

    /// Inserts one pre-multiplied rate row. Part of admin product setup, never the order flow.
    async fn insert_rate(
        &self,
        product_id: i64,
        tier: PppTier,
        band: &VolumeBand,
        unit_price: UsdPrice,
    ) -> Result<(), StoreError>;

    //----------------------------------        Orders        --------------------------------------------------------

    /// Persists a new order with `Pending` status and no pricing. Exactly one row is created.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError>;

    async fn fetch_order_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Conditional write `Pending → Processing`. Returns the claimed order, or `None` if the
    /// order is missing or its status is no longer `Pending` (a competing trigger won the race).
    async fn claim_order_for_processing(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Reverts a processing claim (`Processing → Pending`) so that a retry is safe after a
    /// datastore failure during the pricing step.
    async fn release_processing_claim(&self, id: OrderId) -> Result<(), StoreError>;

    /// Persists the computed prices onto the order. The caller guarantees
    /// `total == unit × quantity`.
    async fn set_order_pricing(&self, id: OrderId, unit: UsdPrice, total: UsdPrice) -> Result<Order, StoreError>;

    /// Persists the payment-session reference and checkout URL onto the order.
    async fn set_checkout_session(&self, id: OrderId, session: &CheckoutSession) -> Result<Order, StoreError>;

    /// Conditional write `Processing → Processed` or `Processing → Error`. Returns `None` if the
    /// order was not in `Processing` (the claim was lost or never taken).
    async fn finish_processing(&self, id: OrderId, outcome: FinishedStatus) -> Result<Option<Order>, StoreError>;

    /// Idempotent payment confirmation: sets `Paid`, the paid timestamp and the provider's final
    /// charged amount, only where the order is not already `Paid`. Returns `None` when the update
    /// matched no row (duplicate event, or unknown order — callers disambiguate via
    /// [`Self::fetch_order_by_id`]).
    async fn mark_order_paid(
        &self,
        id: OrderId,
        amount: UsdPrice,
        session_id: &str,
    ) -> Result<Option<Order>, StoreError>;

    /// Records a failed payment (`payment_status = Failed`) unless the order is already `Paid`.
    async fn mark_payment_failed(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// The two legal outcomes of a processing claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishedStatus {
    Processed,
    Error,
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::DatabaseError(e.to_string())
    }
}
