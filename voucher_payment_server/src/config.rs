use std::env;

use log::*;
use stripe_tools::StripeConfig;
use vpg_common::Secret;

const DEFAULT_VPG_HOST: &str = "127.0.0.1";
const DEFAULT_VPG_PORT: u16 = 8360;
const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Stripe credentials and checkout redirect URLs.
    pub stripe: StripeConfig,
    /// Resend (transactional email) configuration.
    pub resend: ResendConfig,
}

#[derive(Clone, Debug)]
pub struct ResendConfig {
    pub api_url: String,
    pub api_key: Secret<String>,
    /// The From: address on confirmation emails.
    pub sender: String,
}

impl Default for ResendConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_RESEND_API_URL.to_string(),
            api_key: Secret::default(),
            sender: "orders@example.com".to_string(),
        }
    }
}

impl ResendConfig {
    pub fn from_env_or_default() -> Self {
        let api_url = env::var("VPG_RESEND_API_URL").unwrap_or_else(|_| DEFAULT_RESEND_API_URL.to_string());
        let api_key = Secret::new(env::var("VPG_RESEND_API_KEY").unwrap_or_else(|_| {
            warn!("🪛️ VPG_RESEND_API_KEY not set, using (probably useless) default");
            "re_00000000000000".to_string()
        }));
        let sender = env::var("VPG_RESEND_SENDER").unwrap_or_else(|_| {
            warn!("🪛️ VPG_RESEND_SENDER not set, using orders@example.com");
            "orders@example.com".to_string()
        });
        Self { api_url, api_key, sender }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_VPG_HOST.to_string(),
            port: DEFAULT_VPG_PORT,
            database_url: String::default(),
            stripe: StripeConfig::default(),
            resend: ResendConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("VPG_HOST").ok().unwrap_or_else(|| DEFAULT_VPG_HOST.into());
        let port = env::var("VPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for VPG_PORT. {e} Using the default, {DEFAULT_VPG_PORT}, instead."
                    );
                    DEFAULT_VPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_VPG_PORT);
        let database_url = env::var("VPG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ VPG_DATABASE_URL is not set. Please set it to the URL for the voucher shop database.");
            String::default()
        });
        let stripe = StripeConfig::new_from_env_or_default();
        let resend = ResendConfig::from_env_or_default();
        Self { host, port, database_url, stripe, resend }
    }
}
