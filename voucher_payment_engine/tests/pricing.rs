use vpg_common::UsdPrice;
use voucher_payment_engine::{
    db_types::PppTier,
    test_utils::{prepare_env::init_logging, MemoryStore},
    tiers::volume_band,
    traits::ShopDatabase,
    PricingApi,
    PricingError,
};

async fn seeded_store() -> MemoryStore {
    init_logging();
    let db = MemoryStore::new();
    let product = db.upsert_product("Vue Mid: Voucher Only").await.unwrap();
    db.upsert_classification("India", PppTier::Tier3).await.unwrap();
    db.upsert_classification("Brazil", PppTier::Tier2).await.unwrap();
    // Authoritative rates for the first two bands. Tier 3 only has a rate in the first band, so
    // the second band must fall back to the Global row.
    db.insert_rate(product.id, PppTier::Global, &volume_band(1), UsdPrice::from_cents(22_000)).await.unwrap();
    db.insert_rate(product.id, PppTier::Global, &volume_band(200), UsdPrice::from_cents(20_900)).await.unwrap();
    db.insert_rate(product.id, PppTier::Tier3, &volume_band(1), UsdPrice::from_cents(11_000)).await.unwrap();
    db
}

#[tokio::test]
async fn rate_table_hit_for_classified_country() {
    let api = PricingApi::new(seeded_store().await);
    let quote = api.resolve_price("Vue Mid: Voucher Only", "India", 10).await.unwrap();
    assert_eq!(quote.unit_price, UsdPrice::from_cents(11_000));
    assert_eq!(quote.ppp_tier, PppTier::Tier3);
    assert!(!quote.synthetic);
}

#[tokio::test]
async fn missing_tier_rate_falls_back_to_global_row() {
    let api = PricingApi::new(seeded_store().await);
    // Quantity 250 lands in the second band, which has no Tier 3 row.
    let quote = api.resolve_price("Vue Mid: Voucher Only", "India", 250).await.unwrap();
    assert_eq!(quote.unit_price, UsdPrice::from_cents(20_900));
    assert_eq!(quote.ppp_tier, PppTier::Tier3);
    assert!(!quote.synthetic);
}

#[tokio::test]
async fn unclassified_country_prices_as_global() {
    let api = PricingApi::new(seeded_store().await);
    let quote = api.resolve_price("Vue Mid: Voucher Only", "Atlantis", 1).await.unwrap();
    assert_eq!(quote.ppp_tier, PppTier::Global);
    assert_eq!(quote.ppp_discount, 1.0);
    assert_eq!(quote.unit_price, UsdPrice::from_cents(22_000));
}

#[tokio::test]
async fn missing_rate_rows_use_the_synthetic_fallback() {
    let api = PricingApi::new(seeded_store().await);
    // Band 3 (401-800) has no rows at all: 220.00 × 0.90 × 0.50 = 99.00.
    let quote = api.resolve_price("Vue Mid: Voucher Only", "India", 500).await.unwrap();
    assert!(quote.synthetic);
    assert_eq!(quote.unit_price, UsdPrice::from_cents(9_900));
    assert_eq!(quote.volume_discount, 0.90);
    assert_eq!(quote.ppp_discount, 0.50);
}

#[tokio::test]
async fn unknown_products_price_from_the_default_base() {
    let api = PricingApi::new(seeded_store().await);
    // 100.00 × 0.95 × 0.65 = 61.75.
    let quote = api.resolve_price("Mystery Certification", "Brazil", 150).await.unwrap();
    assert!(quote.synthetic);
    assert_eq!(quote.unit_price, UsdPrice::from_cents(6_175));
}

#[tokio::test]
async fn invalid_inputs_are_rejected_before_any_lookup() {
    let api = PricingApi::new(seeded_store().await);
    for (product, country, qty) in [
        ("", "India", 1),
        ("Vue Mid: Voucher Only", "  ", 1),
        ("Vue Mid: Voucher Only", "India", 0),
        ("Vue Mid: Voucher Only", "India", -5),
        ("Vue Mid: Voucher Only", "India", 900_000_000_000_000_000),
    ] {
        let err = api.resolve_price(product, country, qty).await.unwrap_err();
        assert!(matches!(err, PricingError::InvalidInput(_)), "expected InvalidInput, got {err}");
    }
}

#[tokio::test]
async fn deeper_tiers_never_cost_more_for_the_same_order() {
    init_logging();
    let db = MemoryStore::new();
    let product = db.upsert_product("Vue Mid: Voucher Only").await.unwrap();
    db.upsert_classification("Portugal", PppTier::Tier1).await.unwrap();
    db.upsert_classification("Brazil", PppTier::Tier2).await.unwrap();
    db.upsert_classification("India", PppTier::Tier3).await.unwrap();
    let band = volume_band(1);
    for (tier, cents) in [
        (PppTier::Global, 22_000),
        (PppTier::Tier1, 17_600),
        (PppTier::Tier2, 14_300),
        (PppTier::Tier3, 11_000),
    ] {
        db.insert_rate(product.id, tier, &band, UsdPrice::from_cents(cents)).await.unwrap();
    }
    let api = PricingApi::new(db);

    // Atlantis is unclassified and prices as Global; each deeper tier must not cost more.
    let mut last = UsdPrice::from_cents(i64::MAX);
    for country in ["Atlantis", "Portugal", "Brazil", "India"] {
        let quote = api.resolve_price("Vue Mid: Voucher Only", country, 1).await.unwrap();
        assert!(!quote.synthetic);
        assert!(quote.unit_price <= last, "the {country} quote broke the tier ordering");
        last = quote.unit_price;
    }
}

#[tokio::test]
async fn larger_orders_never_cost_more_per_unit_on_the_synthetic_path() {
    let api = PricingApi::new(seeded_store().await);
    let mut last = UsdPrice::from_cents(i64::MAX);
    for qty in [1, 100, 101, 400, 401, 800, 801, 5000] {
        let quote = api.resolve_price("Nuxt Mid: Voucher Only", "India", qty).await.unwrap();
        assert!(quote.unit_price <= last, "unit price went up at quantity {qty}");
        last = quote.unit_price;
    }
}
