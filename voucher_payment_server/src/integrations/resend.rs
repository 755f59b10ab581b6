//! Sends order-confirmation emails through the Resend API.
use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::Deserialize;
use serde_json::json;
use voucher_payment_engine::traits::{NotificationError, Notifier, OrderConfirmation};

use crate::config::ResendConfig;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct ResendNotifier {
    config: ResendConfig,
    client: Arc<Client>,
}

impl ResendNotifier {
    pub fn new(config: ResendConfig) -> Result<Self, NotificationError> {
        let mut headers = HeaderMap::with_capacity(1);
        let auth = format!("Bearer {}", config.api_key.reveal());
        let mut val = HeaderValue::from_str(&auth).map_err(|e| NotificationError::Send(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert("Authorization", val);
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| NotificationError::Send(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }
}

impl Notifier for ResendNotifier {
    async fn send_confirmation(&self, confirmation: &OrderConfirmation<'_>) -> Result<String, NotificationError> {
        #[derive(Deserialize)]
        struct SendResponse {
            id: String,
        }
        let body = json!({
            "from": self.config.sender,
            "to": [confirmation.recipient],
            "subject": format!("Your voucher order {}", confirmation.order_id),
            "html": confirmation_body(confirmation),
        });
        let url = format!("{}/emails", self.config.api_url);
        let response = self.client.post(url).json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                NotificationError::Timeout(REQUEST_TIMEOUT_SECS)
            } else {
                NotificationError::Send(e.to_string())
            }
        })?;
        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(NotificationError::Send(format!("Resend returned {status}: {message}")));
        }
        let sent: SendResponse =
            response.json().await.map_err(|e| NotificationError::Send(e.to_string()))?;
        debug!("✉️ Confirmation email {} queued for {}", sent.id, confirmation.recipient);
        Ok(sent.id)
    }
}

fn confirmation_body(confirmation: &OrderConfirmation<'_>) -> String {
    format!(
        "<p>Thanks for your order {id}.</p>\
         <p>{qty} &times; {product} for a total of {total}.</p>\
         <p><a href=\"{url}\">Complete your payment</a></p>",
        id = confirmation.order_id,
        qty = confirmation.quantity,
        product = confirmation.product_name,
        total = confirmation.total_price,
        url = confirmation.checkout_url,
    )
}
