use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::Utc;
use vpg_common::UsdPrice;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatus, PaymentStatus, PppTier, Product, RateEntry},
    tiers::VolumeBand,
    traits::{CheckoutSession, FinishedStatus, ShopDatabase, StoreError},
};

/// A `ShopDatabase` backed by plain maps behind a mutex.
///
/// It honours the same conditional-write semantics as the SQLite backend, and adds a fault
/// injection hook for the pricing write so that tests can drive the claim-release path.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    products: Vec<Product>,
    classifications: HashMap<String, PppTier>,
    rates: Vec<RateEntry>,
    orders: HashMap<i64, Order>,
    next_order_id: i64,
    fail_pricing_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, `set_order_pricing` fails with a datastore error until cleared.
    pub fn fail_pricing_writes(&self, fail: bool) {
        self.inner.lock().unwrap().fail_pricing_writes = fail;
    }

    pub fn order_count(&self) -> usize {
        self.inner.lock().unwrap().orders.len()
    }
}

impl ShopDatabase for MemoryStore {
    fn url(&self) -> &str {
        "memory://test"
    }

    async fn fetch_product_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.products.iter().find(|p| p.name == name).cloned())
    }

    async fn fetch_ppp_tier(&self, country_name: &str) -> Result<Option<PppTier>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.classifications.get(country_name).copied())
    }

    async fn fetch_rate(
        &self,
        product_id: i64,
        tier: PppTier,
        band: &VolumeBand,
    ) -> Result<Option<UsdPrice>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let rate = inner
            .rates
            .iter()
            .find(|r| {
                r.product_id == product_id &&
                    r.ppp_tier == tier &&
                    r.min_quantity == band.min &&
                    r.max_quantity == band.max
            })
            .map(|r| r.unit_price);
        Ok(rate)
    }

    async fn upsert_product(&self, name: &str) -> Result<Product, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(p) = inner.products.iter().find(|p| p.name == name) {
            return Ok(p.clone());
        }
        let product = Product { id: inner.products.len() as i64 + 1, name: name.to_string(), created_at: Utc::now() };
        inner.products.push(product.clone());
        Ok(product)
    }

    async fn upsert_classification(&self, country_name: &str, tier: PppTier) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.classifications.insert(country_name.to_string(), tier);
        Ok(())
    }

    async fn insert_rate(
        &self,
        product_id: i64,
        tier: PppTier,
        band: &VolumeBand,
        unit_price: UsdPrice,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.rates.len() as i64 + 1;
        inner.rates.push(RateEntry {
            id,
            product_id,
            ppp_tier: tier,
            min_quantity: band.min,
            max_quantity: band.max,
            unit_price,
        });
        Ok(())
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_order_id += 1;
        let now = Utc::now();
        let order = Order {
            id: OrderId(inner.next_order_id),
            customer_email: order.customer_email,
            product_id: order.product_id,
            product_name: order.product_name,
            country_name: order.country_name,
            quantity: order.quantity,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            unit_price: None,
            total_price: None,
            session_id: None,
            checkout_url: None,
            amount_paid: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        };
        inner.orders.insert(order.id.value(), order.clone());
        Ok(order)
    }

    async fn fetch_order_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.orders.get(&id.value()).cloned())
    }

    async fn claim_order_for_processing(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.orders.get_mut(&id.value()) {
            Some(order) if order.status == OrderStatus::Pending => {
                order.status = OrderStatus::Processing;
                order.updated_at = Utc::now();
                Ok(Some(order.clone()))
            },
            _ => Ok(None),
        }
    }

    async fn release_processing_claim(&self, id: OrderId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(order) = inner.orders.get_mut(&id.value()) {
            if order.status == OrderStatus::Processing {
                order.status = OrderStatus::Pending;
                order.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn set_order_pricing(&self, id: OrderId, unit: UsdPrice, total: UsdPrice) -> Result<Order, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_pricing_writes {
            return Err(StoreError::DatabaseError("injected pricing write failure".to_string()));
        }
        let order = inner.orders.get_mut(&id.value()).ok_or(StoreError::OrderNotFound(id))?;
        order.unit_price = Some(unit);
        order.total_price = Some(total);
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn set_checkout_session(&self, id: OrderId, session: &CheckoutSession) -> Result<Order, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let order = inner.orders.get_mut(&id.value()).ok_or(StoreError::OrderNotFound(id))?;
        order.session_id = Some(session.session_id.clone());
        order.checkout_url = Some(session.checkout_url.clone());
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn finish_processing(&self, id: OrderId, outcome: FinishedStatus) -> Result<Option<Order>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.orders.get_mut(&id.value()) {
            Some(order) if order.status == OrderStatus::Processing => {
                order.status = match outcome {
                    FinishedStatus::Processed => OrderStatus::Processed,
                    FinishedStatus::Error => OrderStatus::Error,
                };
                order.updated_at = Utc::now();
                Ok(Some(order.clone()))
            },
            _ => Ok(None),
        }
    }

    async fn mark_order_paid(
        &self,
        id: OrderId,
        amount: UsdPrice,
        session_id: &str,
    ) -> Result<Option<Order>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.orders.get_mut(&id.value()) {
            Some(order) if order.payment_status != PaymentStatus::Paid => {
                order.payment_status = PaymentStatus::Paid;
                order.amount_paid = Some(amount);
                if order.session_id.is_none() {
                    order.session_id = Some(session_id.to_string());
                }
                order.paid_at = Some(Utc::now());
                order.updated_at = Utc::now();
                Ok(Some(order.clone()))
            },
            _ => Ok(None),
        }
    }

    async fn mark_payment_failed(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.orders.get_mut(&id.value()) {
            Some(order) if order.payment_status != PaymentStatus::Paid => {
                order.payment_status = PaymentStatus::Failed;
                order.updated_at = Utc::now();
                Ok(Some(order.clone()))
            },
            _ => Ok(None),
        }
    }
}
