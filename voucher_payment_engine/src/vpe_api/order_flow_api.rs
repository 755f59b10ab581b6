use log::*;

use crate::{
    db_types::{NewOrder, Order, OrderId},
    helpers::is_valid_email,
    tiers::MAX_ORDER_QUANTITY,
    traits::{
        CheckoutRequest,
        CheckoutSession,
        FinishedStatus,
        Notifier,
        OrderConfirmation,
        PaymentProvider,
        ShopDatabase,
        StoreError,
    },
    vpe_api::{
        errors::OrderFlowError,
        order_objects::{PaymentConfirmation, PaymentFailure},
        pricing_api::PricingApi,
    },
};

/// `OrderFlowApi` drives the order lifecycle: creation, the processing pipeline
/// (price → checkout session → confirmation email → finalize) and the asynchronous payment
/// events delivered by the provider's webhooks.
///
/// The pipeline is guarded by a persisted claim: an order is only processed by the caller that
/// wins the `Pending` → `Processing` transition, so concurrent triggers for the same order run
/// the side effects at most once.
pub struct OrderFlowApi<B, P, N> {
    db: B,
    pricing: PricingApi<B>,
    payments: P,
    notifier: N,
}

impl<B, P, N> OrderFlowApi<B, P, N>
where
    B: ShopDatabase,
    P: PaymentProvider,
    N: Notifier,
{
    pub fn new(db: B, payments: P, notifier: N) -> Self {
        let pricing = PricingApi::new(db.clone());
        Self { db, pricing, payments, notifier }
    }

    pub fn pricing(&self) -> &PricingApi<B> {
        &self.pricing
    }

    /// Creates a new order in `Pending` status.
    ///
    /// The product name is resolved against the catalog here, once, and the id (if any) is
    /// stored on the order. Unknown product names are accepted; they price via the synthetic
    /// fallback at processing time.
    pub async fn create_order(&self, mut order: NewOrder) -> Result<Order, OrderFlowError> {
        if !is_valid_email(&order.customer_email) {
            return Err(OrderFlowError::InvalidInput(format!(
                "\"{}\" is not a valid email address",
                order.customer_email
            )));
        }
        if order.product_name.trim().is_empty() {
            return Err(OrderFlowError::InvalidInput("product name must not be empty".into()));
        }
        if order.country_name.trim().is_empty() {
            return Err(OrderFlowError::InvalidInput("country name must not be empty".into()));
        }
        if order.quantity < 1 {
            return Err(OrderFlowError::InvalidInput(format!(
                "quantity must be a positive integer, got {}",
                order.quantity
            )));
        }
        if order.quantity > MAX_ORDER_QUANTITY {
            return Err(OrderFlowError::InvalidInput(format!(
                "quantity {} exceeds the maximum of {MAX_ORDER_QUANTITY}",
                order.quantity
            )));
        }
        if order.product_id.is_none() {
            order.product_id = self.db.fetch_product_by_name(&order.product_name).await?.map(|p| p.id);
            if order.product_id.is_none() {
                info!(
                    "📦️ New order for \"{}\" does not match a catalog product. It will use fallback pricing.",
                    order.product_name
                );
            }
        }
        let order = self.db.insert_order(order).await?;
        info!(
            "📦️ Order {} created for {} ({}x \"{}\", {})",
            order.id, order.customer_email, order.quantity, order.product_name, order.country_name
        );
        Ok(order)
    }

    pub async fn fetch_order(&self, id: OrderId) -> Result<Order, OrderFlowError> {
        self.db.fetch_order_by_id(id).await?.ok_or(OrderFlowError::OrderNotFound(id))
    }

    /// Runs the processing pipeline for a pending order.
    ///
    /// Exactly one of any set of concurrent calls for the same order wins the processing claim;
    /// the rest return [`OrderFlowError::OrderNotPending`] without side effects.
    ///
    /// On success the order is `Processed` and carries its pricing and checkout session. If the
    /// checkout session cannot be created, the order is moved to `Error` and no email is sent.
    /// A failed confirmation email does *not* fail the order: the checkout link is still live.
    pub async fn process_order(&self, id: OrderId) -> Result<Order, OrderFlowError> {
        let Some(order) = self.db.claim_order_for_processing(id).await? else {
            // Lost the claim, or no such order. Fetch to tell the two apart.
            return match self.db.fetch_order_by_id(id).await? {
                Some(order) => Err(OrderFlowError::OrderNotPending(id, order.status)),
                None => Err(OrderFlowError::OrderNotFound(id)),
            };
        };
        debug!("🔄️ Claimed order {id} for processing");
        match self.run_pipeline(order).await {
            Ok(order) => Ok(order),
            Err(e) => {
                if let Err(e2) = self.fail_order(id).await {
                    error!("🔄️ Could not mark order {id} as failed after a pipeline error: {e2}");
                }
                Err(e)
            },
        }
    }

    async fn run_pipeline(&self, order: Order) -> Result<Order, OrderFlowError> {
        let id = order.id;
        // Step 1: pricing. A datastore failure here has run no external side effects yet, so the
        // claim is released and the order stays retriable.
        let quote = match self.pricing.price_order(&order).await {
            Ok(quote) => quote,
            Err(e) => {
                self.release_claim(id).await;
                return Err(e.into());
            },
        };
        let unit_price = quote.unit_price;
        let total_price = unit_price * order.quantity;
        let order = match self.db.set_order_pricing(id, unit_price, total_price).await {
            Ok(order) => order,
            Err(e) => {
                self.release_claim(id).await;
                return Err(e.into());
            },
        };
        info!("🔄️ Order {id} priced at {unit_price}/unit, {total_price} total");

        // Step 2: checkout session. Once the provider call fails there is no payment link to
        // hand out, so the order is terminal.
        let request = CheckoutRequest {
            order_id: id,
            customer_email: order.customer_email.clone(),
            line_item: order.product_name.clone(),
            quantity: order.quantity,
            unit_amount: unit_price,
            total_amount: total_price,
        };
        let session = match self.payments.create_session(&request).await {
            Ok(session) => session,
            Err(e) => {
                warn!("🔄️ Checkout session creation failed for order {id}: {e}");
                return Err(OrderFlowError::CheckoutSession(id, e));
            },
        };
        let order = self.db.set_checkout_session(id, &session).await?;
        info!("🔄️ Order {id} has checkout session {}", session.session_id);

        // Step 3: confirmation email. Non-fatal.
        self.send_confirmation(&order, &session).await;

        // Step 4: finalize.
        let order = self
            .db
            .finish_processing(id, FinishedStatus::Processed)
            .await?
            .ok_or(StoreError::OrderNotFound(id))?;
        info!("🔄️ Order {id} processed");
        Ok(order)
    }

    async fn send_confirmation(&self, order: &Order, session: &CheckoutSession) {
        let confirmation = OrderConfirmation {
            order_id: order.id,
            recipient: &order.customer_email,
            product_name: &order.product_name,
            quantity: order.quantity,
            total_price: order.total_price.unwrap_or_default(),
            checkout_url: &session.checkout_url,
        };
        match self.notifier.send_confirmation(&confirmation).await {
            Ok(msg_id) => debug!("✉️ Confirmation for order {} sent ({msg_id})", order.id),
            Err(e) => warn!("✉️ Could not send the confirmation email for order {}: {e}", order.id),
        }
    }

    async fn release_claim(&self, id: OrderId) {
        if let Err(e) = self.db.release_processing_claim(id).await {
            error!("🔄️ Could not release the processing claim on order {id}: {e}");
        }
    }

    async fn fail_order(&self, id: OrderId) -> Result<(), StoreError> {
        match self.db.finish_processing(id, FinishedStatus::Error).await? {
            Some(_) => {
                warn!("🔄️ Order {id} moved to Error");
                Ok(())
            },
            // The claim was already released or never held. Nothing to do.
            None => Ok(()),
        }
    }

    /// Handles a verified payment confirmation from the provider.
    ///
    /// Idempotent: webhooks are delivered at-least-once, so a confirmation for an already-paid
    /// order is logged and returns the order unchanged.
    pub async fn confirm_payment(&self, confirmation: PaymentConfirmation) -> Result<Order, OrderFlowError> {
        let PaymentConfirmation { order_id, amount_paid, session_id } = confirmation;
        match self.db.mark_order_paid(order_id, amount_paid, &session_id).await? {
            Some(order) => {
                info!("💳️ Order {order_id} paid ({amount_paid}, session {session_id})");
                Ok(order)
            },
            None => match self.db.fetch_order_by_id(order_id).await? {
                Some(order) => {
                    info!("💳️ Duplicate payment confirmation for order {order_id} ignored");
                    Ok(order)
                },
                None => Err(OrderFlowError::OrderNotFound(order_id)),
            },
        }
    }

    /// Handles a verified payment failure from the provider.
    ///
    /// The failure is recorded on the payment status only. The processing status is untouched
    /// and a paid order is never downgraded; customers can retry the same checkout session.
    pub async fn fail_payment(&self, failure: PaymentFailure) -> Result<Order, OrderFlowError> {
        let PaymentFailure { order_id, reason } = failure;
        match self.db.mark_payment_failed(order_id).await? {
            Some(order) => {
                warn!("💳️ Payment for order {order_id} failed: {reason}");
                Ok(order)
            },
            None => match self.db.fetch_order_by_id(order_id).await? {
                Some(order) => {
                    info!(
                        "💳️ Ignoring a payment failure for order {order_id} ({}; current status {})",
                        reason, order.payment_status
                    );
                    Ok(order)
                },
                None => Err(OrderFlowError::OrderNotFound(order_id)),
            },
        }
    }
}

impl<B, P, N> OrderFlowApi<B, P, N> {
    pub fn db(&self) -> &B {
        &self.db
    }
}
