//! Adapts the Stripe client to the engine's [`PaymentProvider`] contract.
use log::*;
use stripe_tools::{NewCheckoutSession, StripeApi, StripeApiError, StripeConfig};
use voucher_payment_engine::traits::{CheckoutRequest, CheckoutSession, CheckoutSessionError, PaymentProvider};

#[derive(Clone)]
pub struct StripeCheckout {
    api: StripeApi,
}

impl StripeCheckout {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let api = StripeApi::new(config)?;
        Ok(Self { api })
    }
}

impl PaymentProvider for StripeCheckout {
    async fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession, CheckoutSessionError> {
        let params = NewCheckoutSession {
            order_id: request.order_id.value(),
            customer_email: request.customer_email.clone(),
            product_name: request.line_item.clone(),
            quantity: request.quantity,
            unit_amount_cents: request.unit_amount.value(),
        };
        let session = self.api.create_checkout_session(&params).await.map_err(|e| match e {
            StripeApiError::Timeout(secs) => CheckoutSessionError::Timeout(secs),
            e => CheckoutSessionError::Provider(e.to_string()),
        })?;
        // Freshly created sessions always carry the hosted page URL; a missing one is a
        // provider-side anomaly and the session is unusable.
        let checkout_url = session.url.ok_or_else(|| {
            warn!("💸️ Stripe session {} came back without a hosted URL", session.id);
            CheckoutSessionError::Provider("Checkout session has no hosted URL".to_string())
        })?;
        debug!("💸️ Checkout session {} created for order #{}", session.id, request.order_id);
        Ok(CheckoutSession { session_id: session.id, checkout_url })
    }
}
