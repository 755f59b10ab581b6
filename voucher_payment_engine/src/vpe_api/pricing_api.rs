use std::fmt::Debug;

use log::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vpg_common::UsdPrice;

use crate::{
    db_types::{Order, PppTier},
    tiers::{volume_band, VolumeBand, MAX_ORDER_QUANTITY},
    traits::{ShopDatabase, StoreError},
    vpe_api::errors::PricingError,
};

/// The result of a price resolution.
///
/// When the price came from the rate table (`synthetic == false`), the discount factors are
/// informational only: stored rates are pre-multiplied at data-entry time, so the factors are
/// *not* re-applied arithmetically. On the synthetic path they are the factors that actually
/// produced the price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub unit_price: UsdPrice,
    pub volume_discount: f64,
    pub ppp_discount: f64,
    pub ppp_tier: PppTier,
    /// True when no authoritative rate existed and the hard-coded fallback table was used.
    pub synthetic: bool,
}

/// Internal to the rate-lookup chain. Always caught by [`PricingApi::resolve_price`] and turned
/// into the synthetic-fallback path; never surfaced to callers.
#[derive(Debug, Clone, Error)]
enum RateLookupError {
    #[error("Product \"{0}\" is not in the catalog")]
    ProductNotFound(String),
    #[error("No rate row for product {0}, tier {1}, band starting at {2} (nor a Global row)")]
    RateNotFound(i64, PppTier, i64),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// `PricingApi` is the public pricing contract: (product name, country name, quantity) in, unit
/// price plus the discount factors that produced it out.
///
/// The resolution order is: authoritative rate for the country's tier → authoritative `Global`
/// rate → fully synthetic fallback. The synthetic path cannot fail, so every syntactically valid
/// request produces *a* price; availability is traded for accuracy and the gap is logged.
pub struct PricingApi<B> {
    db: B,
}

impl<B> Debug for PricingApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PricingApi")
    }
}

impl<B> PricingApi<B>
where B: ShopDatabase
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Resolves a unit price for (product name, country name, quantity).
    ///
    /// Unclassified countries price as `Global` (no discount) rather than blocking checkout.
    pub async fn resolve_price(
        &self,
        product_name: &str,
        country_name: &str,
        quantity: i64,
    ) -> Result<PriceQuote, PricingError> {
        if product_name.trim().is_empty() {
            return Err(PricingError::InvalidInput("product name must not be empty".into()));
        }
        if country_name.trim().is_empty() {
            return Err(PricingError::InvalidInput("country name must not be empty".into()));
        }
        if quantity < 1 {
            return Err(PricingError::InvalidInput(format!("quantity must be a positive integer, got {quantity}")));
        }
        if quantity > MAX_ORDER_QUANTITY {
            return Err(PricingError::InvalidInput(format!(
                "quantity {quantity} exceeds the maximum of {MAX_ORDER_QUANTITY}"
            )));
        }
        let tier = self.tier_for_country(country_name).await?;
        let band = volume_band(quantity);
        match self.lookup_rate_by_name(product_name, tier, &band).await {
            Ok(unit_price) => {
                trace!("💰️ Rate table price {unit_price} for \"{product_name}\" ({tier}, {quantity}x)");
                Ok(quote(unit_price, &band, tier, false))
            },
            Err(RateLookupError::Store(e)) => Err(e.into()),
            Err(e) => {
                warn!("💰️ {e}. Using the synthetic fallback price for \"{product_name}\" ({tier}, {quantity}x)");
                Ok(synthetic_quote(product_name, &band, tier))
            },
        }
    }

    /// Resolves the price for an existing order.
    ///
    /// Orders store the product id resolved at creation time, so a product rename between
    /// creation and processing cannot silently change which rates apply.
    pub async fn price_order(&self, order: &Order) -> Result<PriceQuote, PricingError> {
        let tier = self.tier_for_country(&order.country_name).await?;
        let band = volume_band(order.quantity);
        let Some(product_id) = order.product_id else {
            warn!(
                "💰️ Order {} references \"{}\", which is not in the catalog. Using the synthetic fallback price.",
                order.id, order.product_name
            );
            return Ok(synthetic_quote(&order.product_name, &band, tier));
        };
        match self.lookup_rate(product_id, tier, &band).await {
            Ok(unit_price) => Ok(quote(unit_price, &band, tier, false)),
            Err(RateLookupError::Store(e)) => Err(e.into()),
            Err(e) => {
                warn!("💰️ {e}. Using the synthetic fallback price for order {}", order.id);
                Ok(synthetic_quote(&order.product_name, &band, tier))
            },
        }
    }

    async fn tier_for_country(&self, country_name: &str) -> Result<PppTier, StoreError> {
        let tier = self.db.fetch_ppp_tier(country_name).await?;
        if tier.is_none() {
            debug!("💰️ Country \"{country_name}\" has no PPP classification. Defaulting to Global pricing.");
        }
        Ok(tier.unwrap_or(PppTier::Global))
    }

    async fn lookup_rate_by_name(
        &self,
        product_name: &str,
        tier: PppTier,
        band: &VolumeBand,
    ) -> Result<UsdPrice, RateLookupError> {
        let product = self
            .db
            .fetch_product_by_name(product_name)
            .await?
            .ok_or_else(|| RateLookupError::ProductNotFound(product_name.to_string()))?;
        self.lookup_rate(product.id, tier, band).await
    }

    /// The two-step lookup: exact (product, tier, band) row first, then the same band with the
    /// tier forced to `Global`. The catalog only populates the discount combinations that are
    /// commercially offered; the `Global` row is the authoritative fallback for the rest.
    async fn lookup_rate(&self, product_id: i64, tier: PppTier, band: &VolumeBand) -> Result<UsdPrice, RateLookupError> {
        if let Some(price) = self.db.fetch_rate(product_id, tier, band).await? {
            return Ok(price);
        }
        if tier != PppTier::Global {
            if let Some(price) = self.db.fetch_rate(product_id, PppTier::Global, band).await? {
                debug!("💰️ No {tier} rate for product {product_id}, band {}+. Falling back to the Global row.", band.min);
                return Ok(price);
            }
        }
        Err(RateLookupError::RateNotFound(product_id, tier, band.min))
    }
}

fn quote(unit_price: UsdPrice, band: &VolumeBand, tier: PppTier, synthetic: bool) -> PriceQuote {
    PriceQuote { unit_price, volume_discount: band.discount, ppp_discount: tier.discount(), ppp_tier: tier, synthetic }
}

/// Computes the fully synthetic fallback price: hard-coded base price × volume factor × PPP
/// factor, multiplied first and rounded exactly once (half-away-from-zero) to cents.
fn synthetic_quote(product_name: &str, band: &VolumeBand, tier: PppTier) -> PriceQuote {
    let base = base_price(product_name);
    let unit_price = UsdPrice::from_dollars_f64(base * band.discount * tier.discount());
    quote(unit_price, band, tier, true)
}

/// Default base price for product names missing from the fallback table.
const DEFAULT_BASE_PRICE: f64 = 100.00;

/// The hard-coded fallback base prices, in dollars, keyed by product display name.
const BASE_PRICES: &[(&str, f64)] = &[
    ("Certified Junior Angular Developer", 62.10),
    ("Certified Mid-Level Angular Developer", 134.25),
    ("CJAD + Self-Learning Bundle", 89.10),
    ("CMAD + Self-Learning Bundle", 283.50),
    ("Vue Mid: Voucher Only", 220.00),
    ("Vue Mid: Voucher + Preparation", 499.00),
    ("Vue Mid: Voucher + Preparation + Bootcamp", 999.00),
    ("Vue Mid + Senior: Voucher Only", 499.00),
    ("Vue Mid + Senior: Voucher + Preparation", 1057.00),
    ("Vue Mid + Senior: Voucher + Preparation + Bootcamp", 2257.00),
    ("Nuxt Mid: Voucher Only", 220.00),
    ("Nuxt Mid: Voucher + Preparation", 499.00),
    ("Nuxt Mid: Voucher + Preparation + Bootcamp", 999.00),
    ("Nuxt Mid + Senior: Voucher Only", 499.00),
    ("Nuxt Mid + Senior: Voucher + Preparation", 1057.00),
    ("Nuxt Mid + Senior: Voucher + Preparation + Bootcamp", 2257.00),
    ("Angular Junior: Voucher Only", 69.00),
    ("Angular Junior: Voucher + Preparation", 99.00),
    ("Angular Mid: Voucher Only", 179.00),
    ("Angular Mid: Voucher + Preparation", 378.00),
    ("Angular Mid: Voucher + Preparation + Bootcamp", 999.00),
    ("Angular Mid + Senior: Voucher Only", 398.00),
    ("Angular Mid + Senior: Voucher + Preparation", 796.00),
    ("Angular Mid + Senior: Voucher + Preparation + Bootcamp", 2166.00),
    ("JavaScript Junior: Voucher Only", 69.00),
    ("JavaScript Junior: Voucher + Preparation", 99.00),
    ("JavaScript Mid: Voucher Only", 179.00),
    ("JavaScript Mid: Voucher + Preparation", 378.00),
    ("JavaScript Mid: Voucher + Preparation + Bootcamp", 999.00),
    ("JavaScript Mid + Senior: Voucher Only", 398.00),
    ("JavaScript Mid + Senior: Voucher + Preparation", 796.00),
    ("JavaScript Mid + Senior: Voucher + Preparation + Bootcamp", 2166.00),
];

fn base_price(product_name: &str) -> f64 {
    BASE_PRICES
        .iter()
        .find(|(name, _)| *name == product_name)
        .map(|(_, price)| *price)
        .unwrap_or(DEFAULT_BASE_PRICE)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn base_price_lookup_defaults_to_100() {
        assert_eq!(base_price("Vue Mid: Voucher Only"), 220.00);
        assert_eq!(base_price("Certified Junior Angular Developer"), 62.10);
        assert_eq!(base_price("Something Nobody Sells"), 100.00);
    }

    #[test]
    fn synthetic_quotes_multiply_then_round_once() {
        use crate::tiers::volume_band;
        // 220.00 × 1.00 × 0.50 = 110.00
        let q = synthetic_quote("Vue Mid: Voucher Only", &volume_band(1), PppTier::Tier3);
        assert_eq!(q.unit_price, UsdPrice::from_cents(11_000));
        assert!(q.synthetic);
        // 220.00 × 0.90 × 0.50 = 99.00
        let q = synthetic_quote("Vue Mid: Voucher Only", &volume_band(500), PppTier::Tier3);
        assert_eq!(q.unit_price, UsdPrice::from_cents(9_900));
        // 62.10 × 0.95 × 0.65 = 38.346… → 38.35
        let q = synthetic_quote("Certified Junior Angular Developer", &volume_band(200), PppTier::Tier2);
        assert_eq!(q.unit_price, UsdPrice::from_cents(3_835));
    }
}
