use sqlx::SqliteConnection;
use vpg_common::UsdPrice;

use crate::{
    db_types::{PppTier, Product},
    tiers::VolumeBand,
    traits::StoreError,
};

pub async fn fetch_product_by_name(name: &str, conn: &mut SqliteConnection) -> Result<Option<Product>, StoreError> {
    let product =
        sqlx::query_as("SELECT * FROM products WHERE name = $1").bind(name).fetch_optional(conn).await?;
    Ok(product)
}

pub async fn fetch_ppp_tier(country_name: &str, conn: &mut SqliteConnection) -> Result<Option<PppTier>, StoreError> {
    let tier: Option<(PppTier,)> =
        sqlx::query_as("SELECT ppp_tier FROM ppp_classifications WHERE country_name = $1")
            .bind(country_name)
            .fetch_optional(conn)
            .await?;
    Ok(tier.map(|(t,)| t))
}

/// Exact-match rate lookup. `IS` rather than `=` on `max_quantity` so that the unbounded top band
/// (stored as NULL) matches.
pub async fn fetch_rate(
    product_id: i64,
    tier: PppTier,
    band: &VolumeBand,
    conn: &mut SqliteConnection,
) -> Result<Option<UsdPrice>, StoreError> {
    let price: Option<(UsdPrice,)> = sqlx::query_as(
        r#"
        SELECT unit_price FROM product_prices
        WHERE product_id = $1 AND ppp_tier = $2 AND min_quantity = $3 AND max_quantity IS $4
        "#,
    )
    .bind(product_id)
    .bind(tier)
    .bind(band.min)
    .bind(band.max)
    .fetch_optional(conn)
    .await?;
    Ok(price.map(|(p,)| p))
}

pub async fn upsert_product(name: &str, conn: &mut SqliteConnection) -> Result<Product, StoreError> {
    let product = sqlx::query_as(
        r#"
        INSERT INTO products (name) VALUES ($1)
        ON CONFLICT (name) DO UPDATE SET name = excluded.name
        RETURNING *
        "#,
    )
    .bind(name)
    .fetch_one(conn)
    .await?;
    Ok(product)
}

pub async fn upsert_classification(
    country_name: &str,
    tier: PppTier,
    conn: &mut SqliteConnection,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO ppp_classifications (country_name, ppp_tier) VALUES ($1, $2)
        ON CONFLICT (country_name) DO UPDATE SET ppp_tier = excluded.ppp_tier
        "#,
    )
    .bind(country_name)
    .bind(tier)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn insert_rate(
    product_id: i64,
    tier: PppTier,
    band: &VolumeBand,
    unit_price: UsdPrice,
    conn: &mut SqliteConnection,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO product_prices (product_id, ppp_tier, min_quantity, max_quantity, unit_price)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (product_id, ppp_tier, min_quantity) DO UPDATE SET
            max_quantity = excluded.max_quantity,
            unit_price = excluded.unit_price
        "#,
    )
    .bind(product_id)
    .bind(tier)
    .bind(band.min)
    .bind(band.max)
    .bind(unit_price)
    .execute(conn)
    .await?;
    Ok(())
}
