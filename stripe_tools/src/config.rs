use log::*;
use vpg_common::Secret;

#[derive(Debug, Clone, Default)]
pub struct StripeConfig {
    pub secret_key: Secret<String>,
    /// The signing secret for the webhook endpoint (`whsec_...`).
    pub webhook_secret: Secret<String>,
    pub api_base: String,
    pub success_url: String,
    pub cancel_url: String,
}

impl StripeConfig {
    pub fn new_from_env_or_default() -> Self {
        let secret_key = Secret::new(std::env::var("VPG_STRIPE_SECRET_KEY").unwrap_or_else(|_| {
            warn!("VPG_STRIPE_SECRET_KEY not set, using (probably useless) default");
            "sk_test_00000000000000".to_string()
        }));
        let webhook_secret = Secret::new(std::env::var("VPG_STRIPE_WEBHOOK_SECRET").unwrap_or_else(|_| {
            warn!("VPG_STRIPE_WEBHOOK_SECRET not set, using (probably useless) default");
            "whsec_00000000000000".to_string()
        }));
        let api_base =
            std::env::var("VPG_STRIPE_API_BASE").unwrap_or_else(|_| "https://api.stripe.com".to_string());
        let success_url = std::env::var("VPG_STRIPE_SUCCESS_URL").unwrap_or_else(|_| {
            warn!("VPG_STRIPE_SUCCESS_URL not set, using localhost default");
            "http://localhost:3000/checkout/success".to_string()
        });
        let cancel_url = std::env::var("VPG_STRIPE_CANCEL_URL").unwrap_or_else(|_| {
            warn!("VPG_STRIPE_CANCEL_URL not set, using localhost default");
            "http://localhost:3000/checkout/cancelled".to_string()
        });
        Self { secret_key, webhook_secret, api_base, success_url, cancel_url }
    }
}
