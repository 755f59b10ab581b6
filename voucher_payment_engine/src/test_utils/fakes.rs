use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
    Mutex,
};

use vpg_common::UsdPrice;

use crate::{
    db_types::OrderId,
    traits::{
        CheckoutRequest,
        CheckoutSession,
        CheckoutSessionError,
        NotificationError,
        Notifier,
        OrderConfirmation,
        PaymentProvider,
    },
};

/// A payment provider that mints deterministic sessions, with a toggle to simulate an outage.
#[derive(Clone, Default)]
pub struct TestPaymentProvider {
    fail: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl TestPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_requests(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn session_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PaymentProvider for TestPaymentProvider {
    async fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession, CheckoutSessionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(CheckoutSessionError::Provider("simulated provider outage".to_string()));
        }
        let id = request.order_id.value();
        Ok(CheckoutSession {
            session_id: format!("cs_test_{id}"),
            checkout_url: format!("https://checkout.example.com/pay/cs_test_{id}"),
        })
    }
}

/// A record of one confirmation email the fake notifier "sent".
#[derive(Debug, Clone)]
pub struct SentConfirmation {
    pub order_id: OrderId,
    pub recipient: String,
    pub total_price: UsdPrice,
    pub checkout_url: String,
}

/// A notifier that records confirmations instead of emailing them.
#[derive(Clone, Default)]
pub struct TestNotifier {
    fail: Arc<AtomicBool>,
    sent: Arc<Mutex<Vec<SentConfirmation>>>,
}

impl TestNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_requests(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentConfirmation> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for TestNotifier {
    async fn send_confirmation(&self, confirmation: &OrderConfirmation<'_>) -> Result<String, NotificationError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotificationError::Send("simulated mail outage".to_string()));
        }
        let record = SentConfirmation {
            order_id: confirmation.order_id,
            recipient: confirmation.recipient.to_string(),
            total_price: confirmation.total_price,
            checkout_url: confirmation.checkout_url.to_string(),
        };
        let mut sent = self.sent.lock().unwrap();
        sent.push(record);
        Ok(format!("msg_{}", sent.len()))
    }
}
