use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderParams {
    pub customer_email: String,
    pub product_name: String,
    pub country_name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingParams {
    pub product_name: String,
    pub country_name: String,
    pub quantity: i64,
}

/// The standard webhook acknowledgement body. Webhook responses are always 200-range once the
/// signature has been verified, so the outcome rides in the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Into<String>>(message: S) -> Self {
        Self { success: true, message: message.into() }
    }

    pub fn failure<S: Into<String>>(message: S) -> Self {
        Self { success: false, message: message.into() }
    }
}
