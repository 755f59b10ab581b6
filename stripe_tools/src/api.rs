use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::de::DeserializeOwned;
use vpg_common::USD_CURRENCY_CODE_LOWER;

use crate::{config::StripeConfig, data_objects::NewCheckoutSession, StripeApiError, StripeCheckoutSession};

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct StripeApi {
    config: StripeConfig,
    client: Arc<Client>,
}

impl StripeApi {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        let auth = format!("Bearer {}", config.secret_key.reveal());
        let mut val =
            HeaderValue::from_str(&auth).map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert("Authorization", val);
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/v1{path}", self.config.api_base)
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    /// POSTs a form-encoded request, Stripe's native encoding for write calls.
    pub async fn form_post<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, StripeApiError> {
        let url = self.url(path);
        trace!("Sending Stripe request: {url}");
        let response = self.client.post(url).form(form).send().await.map_err(|e| {
            if e.is_timeout() {
                StripeApiError::Timeout(REQUEST_TIMEOUT_SECS)
            } else {
                StripeApiError::ResponseError(e.to_string())
            }
        })?;
        if response.status().is_success() {
            trace!("Stripe request successful. {}", response.status());
            response.json::<T>().await.map_err(|e| StripeApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| StripeApiError::ResponseError(e.to_string()))?;
            Err(StripeApiError::QueryError { status, message })
        }
    }

    /// Creates a hosted Checkout Session for one line item, stamping the gateway's order id into
    /// the session metadata so that webhook events can be tied back to the order.
    pub async fn create_checkout_session(
        &self,
        params: &NewCheckoutSession,
    ) -> Result<StripeCheckoutSession, StripeApiError> {
        let form = checkout_session_form(params, &self.config);
        debug!("Creating checkout session for order #{}", params.order_id);
        let session: StripeCheckoutSession = self.form_post("/checkout/sessions", &form).await?;
        info!("Created checkout session {} for order #{}", session.id, params.order_id);
        Ok(session)
    }
}

fn checkout_session_form(params: &NewCheckoutSession, config: &StripeConfig) -> Vec<(String, String)> {
    vec![
        ("mode".to_string(), "payment".to_string()),
        ("customer_email".to_string(), params.customer_email.clone()),
        ("success_url".to_string(), config.success_url.clone()),
        ("cancel_url".to_string(), config.cancel_url.clone()),
        ("line_items[0][quantity]".to_string(), params.quantity.to_string()),
        ("line_items[0][price_data][currency]".to_string(), USD_CURRENCY_CODE_LOWER.to_string()),
        ("line_items[0][price_data][unit_amount]".to_string(), params.unit_amount_cents.to_string()),
        ("line_items[0][price_data][product_data][name]".to_string(), params.product_name.clone()),
        ("metadata[order_id]".to_string(), params.order_id.to_string()),
        ("payment_intent_data[metadata][order_id]".to_string(), params.order_id.to_string()),
    ]
}
