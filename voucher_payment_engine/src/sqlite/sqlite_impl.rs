//! `SqliteDatabase` is a concrete implementation of the voucher shop backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements the [`ShopDatabase`] trait by
//! delegating to the connection-level functions in [`super::db`].
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;
use vpg_common::UsdPrice;

use super::db::{catalog, db_url, new_pool, orders};
use crate::{
    db_types::{NewOrder, Order, OrderId, PppTier, Product},
    tiers::VolumeBand,
    traits::{CheckoutSession, FinishedStatus, ShopDatabase, StoreError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using `VPG_DATABASE_URL` (or the default).
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    /// Creates a new database API object and brings the schema up to date.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl ShopDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch_product_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        catalog::fetch_product_by_name(name, &mut conn).await
    }

    async fn fetch_ppp_tier(&self, country_name: &str) -> Result<Option<PppTier>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        catalog::fetch_ppp_tier(country_name, &mut conn).await
    }

    async fn fetch_rate(
        &self,
        product_id: i64,
        tier: PppTier,
        band: &VolumeBand,
    ) -> Result<Option<UsdPrice>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        catalog::fetch_rate(product_id, tier, band, &mut conn).await
    }

    async fn upsert_product(&self, name: &str) -> Result<Product, StoreError> {
        let mut conn = self.pool.acquire().await?;
        catalog::upsert_product(name, &mut conn).await
    }

    async fn upsert_classification(&self, country_name: &str, tier: PppTier) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        catalog::upsert_classification(country_name, tier, &mut conn).await
    }

    async fn insert_rate(
        &self,
        product_id: i64,
        tier: PppTier,
        band: &VolumeBand,
        unit_price: UsdPrice,
    ) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        catalog::insert_rate(product_id, tier, band, unit_price, &mut conn).await
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::insert_order(order, &mut conn).await?;
        debug!("🗃️ Order {} has been saved in the DB", order.id);
        Ok(order)
    }

    async fn fetch_order_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_id(id, &mut conn).await
    }

    async fn claim_order_for_processing(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::claim_order_for_processing(id, &mut conn).await
    }

    async fn release_processing_claim(&self, id: OrderId) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::release_processing_claim(id, &mut conn).await
    }

    async fn set_order_pricing(&self, id: OrderId, unit: UsdPrice, total: UsdPrice) -> Result<Order, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::set_order_pricing(id, unit, total, &mut conn).await
    }

    async fn set_checkout_session(&self, id: OrderId, session: &CheckoutSession) -> Result<Order, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::set_checkout_session(id, session, &mut conn).await
    }

    async fn finish_processing(&self, id: OrderId, outcome: FinishedStatus) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::finish_processing(id, outcome, &mut conn).await
    }

    async fn mark_order_paid(
        &self,
        id: OrderId,
        amount: UsdPrice,
        session_id: &str,
    ) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::mark_order_paid(id, amount, session_id, &mut conn).await
    }

    async fn mark_payment_failed(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::mark_payment_failed(id, &mut conn).await
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        self.pool.close().await;
        Ok(())
    }
}
