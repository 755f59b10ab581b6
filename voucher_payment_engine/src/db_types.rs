use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
use vpg_common::UsdPrice;

//--------------------------------------      PppTier       ----------------------------------------------------------
/// The purchasing-power-parity classification of a country.
///
/// This is a closed set: every tier string stored in the database must be one of the four
/// literals below. Parsing anything else fails with [`InvalidTierError`]; callers at the boundary
/// normalize *missing* classifications to `Global` rather than relying on silent coercion here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
pub enum PppTier {
    Global,
    #[sqlx(rename = "Tier 1")]
    #[serde(rename = "Tier 1")]
    Tier1,
    #[sqlx(rename = "Tier 2")]
    #[serde(rename = "Tier 2")]
    Tier2,
    #[sqlx(rename = "Tier 3")]
    #[serde(rename = "Tier 3")]
    Tier3,
}

impl Display for PppTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PppTier::Global => write!(f, "Global"),
            PppTier::Tier1 => write!(f, "Tier 1"),
            PppTier::Tier2 => write!(f, "Tier 2"),
            PppTier::Tier3 => write!(f, "Tier 3"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid PPP tier: {0}")]
pub struct InvalidTierError(String);

impl FromStr for PppTier {
    type Err = InvalidTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Global" => Ok(Self::Global),
            "Tier 1" => Ok(Self::Tier1),
            "Tier 2" => Ok(Self::Tier2),
            "Tier 3" => Ok(Self::Tier3),
            s => Err(InvalidTierError(s.to_string())),
        }
    }
}

//--------------------------------------      OrderId       ----------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub i64);

impl From<i64> for OrderId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for OrderId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

//--------------------------------------    OrderStatus     ----------------------------------------------------------
/// The processing state of an order.
///
/// `Pending` is the sole initial state. `Processing` is the persisted in-flight marker that makes
/// concurrent processing triggers race-safe: exactly one trigger can claim `Pending → Processing`.
/// `Processed` and `Error` are terminal; an errored order requires administrative re-submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Processing,
    Processed,
    Error,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::Processing => write!(f, "Processing"),
            OrderStatus::Processed => write!(f, "Processed"),
            OrderStatus::Error => write!(f, "Error"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct OrderStatusConversionError(String);

impl FromStr for OrderStatus {
    type Err = OrderStatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Processing" => Ok(Self::Processing),
            "Processed" => Ok(Self::Processed),
            "Error" => Ok(Self::Error),
            s => Err(OrderStatusConversionError(s.to_string())),
        }
    }
}

//--------------------------------------   PaymentStatus    ----------------------------------------------------------
/// The payment state of an order. Orthogonal to [`OrderStatus`].
///
/// `Failed` records a provider "payment failed" event; it never overwrites `Paid`, and a later
/// successful payment moves a `Failed` order to `Paid` (the checkout link stays valid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Failed,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Unpaid => write!(f, "Unpaid"),
            PaymentStatus::Paid => write!(f, "Paid"),
            PaymentStatus::Failed => write!(f, "Failed"),
        }
    }
}

//--------------------------------------      Product       ----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    /// The display name. Unique, and used as the external lookup key everywhere.
    pub name: String,
    pub created_at: DateTime<Utc>,
}

//--------------------------------     CountryClassification     -----------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CountryClassification {
    pub id: i64,
    pub country_name: String,
    pub ppp_tier: PppTier,
}

//--------------------------------------     RateEntry      ----------------------------------------------------------
/// One row of the authoritative price table.
///
/// The unit price has both discounts baked in by construction; rates are pre-multiplied at
/// data-entry time and only read by the order flow.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RateEntry {
    pub id: i64,
    pub product_id: i64,
    pub ppp_tier: PppTier,
    pub min_quantity: i64,
    /// `None` marks the unbounded top band.
    pub max_quantity: Option<i64>,
    pub unit_price: UsdPrice,
}

//--------------------------------------       Order        ----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_email: String,
    /// Resolved once at creation time. `None` when the product was not in the catalog; pricing
    /// then uses the synthetic fallback table.
    pub product_id: Option<i64>,
    pub product_name: String,
    pub country_name: String,
    pub quantity: i64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub unit_price: Option<UsdPrice>,
    pub total_price: Option<UsdPrice>,
    pub session_id: Option<String>,
    pub checkout_url: Option<String>,
    /// The provider's final charged amount, recorded on payment confirmation.
    pub amount_paid: Option<UsdPrice>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

//--------------------------------------      NewOrder      ----------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_email: String,
    pub product_name: String,
    pub country_name: String,
    pub quantity: i64,
    /// Filled in by the order flow when the product exists in the catalog.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub product_id: Option<i64>,
}

impl NewOrder {
    pub fn new<S1, S2, S3>(customer_email: S1, product_name: S2, country_name: S3, quantity: i64) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self {
            customer_email: customer_email.into(),
            product_name: product_name.into(),
            country_name: country_name.into(),
            quantity,
            product_id: None,
        }
    }

    pub fn with_product_id(mut self, product_id: Option<i64>) -> Self {
        self.product_id = product_id;
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ppp_tier_round_trips_through_strings() {
        for tier in [PppTier::Global, PppTier::Tier1, PppTier::Tier2, PppTier::Tier3] {
            assert_eq!(tier.to_string().parse::<PppTier>().unwrap(), tier);
        }
        assert!("Tier 4".parse::<PppTier>().is_err());
        assert!("global".parse::<PppTier>().is_err());
    }

    #[test]
    fn order_status_round_trips_through_strings() {
        for status in [OrderStatus::Pending, OrderStatus::Processing, OrderStatus::Processed, OrderStatus::Error] {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("garbage".parse::<OrderStatus>().is_err());
    }
}
