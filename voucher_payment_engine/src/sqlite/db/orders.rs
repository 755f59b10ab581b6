use log::debug;
use sqlx::SqliteConnection;
use vpg_common::UsdPrice;

use crate::{
    db_types::{NewOrder, Order, OrderId},
    traits::{CheckoutSession, FinishedStatus, StoreError},
};

pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, StoreError> {
    let order: Order = sqlx::query_as(
        r#"
        INSERT INTO orders (customer_email, product_id, product_name, country_name, quantity)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(order.customer_email)
    .bind(order.product_id)
    .bind(order.product_name)
    .bind(order.country_name)
    .bind(order.quantity)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Order {} inserted", order.id);
    Ok(order)
}

pub async fn fetch_order_by_id(id: OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, StoreError> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

/// The conditional `Pending → Processing` write. Exactly one concurrent caller gets a row back.
pub async fn claim_order_for_processing(
    id: OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, StoreError> {
    let order = sqlx::query_as(
        r#"
        UPDATE orders SET status = 'Processing', updated_at = CURRENT_TIMESTAMP
        WHERE id = $1 AND status = 'Pending'
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

pub async fn release_processing_claim(id: OrderId, conn: &mut SqliteConnection) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        UPDATE orders SET status = 'Pending', updated_at = CURRENT_TIMESTAMP
        WHERE id = $1 AND status = 'Processing'
        "#,
    )
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn set_order_pricing(
    id: OrderId,
    unit: UsdPrice,
    total: UsdPrice,
    conn: &mut SqliteConnection,
) -> Result<Order, StoreError> {
    let order = sqlx::query_as(
        r#"
        UPDATE orders SET unit_price = $2, total_price = $3, updated_at = CURRENT_TIMESTAMP
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(unit)
    .bind(total)
    .fetch_optional(conn)
    .await?;
    order.ok_or(StoreError::OrderNotFound(id))
}

pub async fn set_checkout_session(
    id: OrderId,
    session: &CheckoutSession,
    conn: &mut SqliteConnection,
) -> Result<Order, StoreError> {
    let order = sqlx::query_as(
        r#"
        UPDATE orders SET session_id = $2, checkout_url = $3, updated_at = CURRENT_TIMESTAMP
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&session.session_id)
    .bind(&session.checkout_url)
    .fetch_optional(conn)
    .await?;
    order.ok_or(StoreError::OrderNotFound(id))
}

/// The conditional `Processing → Processed | Error` write. `None` means the claim was not held.
pub async fn finish_processing(
    id: OrderId,
    outcome: FinishedStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, StoreError> {
    let status = match outcome {
        FinishedStatus::Processed => "Processed",
        FinishedStatus::Error => "Error",
    };
    let order = sqlx::query_as(
        r#"
        UPDATE orders SET status = $2, updated_at = CURRENT_TIMESTAMP
        WHERE id = $1 AND status = 'Processing'
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Idempotent `→ Paid` write. The guard on `payment_status` makes redelivered confirmation
/// webhooks no-ops.
pub async fn mark_order_paid(
    id: OrderId,
    amount: UsdPrice,
    session_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, StoreError> {
    let order = sqlx::query_as(
        r#"
        UPDATE orders SET
            payment_status = 'Paid',
            amount_paid = $2,
            session_id = COALESCE(session_id, $3),
            paid_at = CURRENT_TIMESTAMP,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = $1 AND payment_status != 'Paid'
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(amount)
    .bind(session_id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

pub async fn mark_payment_failed(id: OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, StoreError> {
    let order = sqlx::query_as(
        r#"
        UPDATE orders SET payment_status = 'Failed', updated_at = CURRENT_TIMESTAMP
        WHERE id = $1 AND payment_status != 'Paid'
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}
