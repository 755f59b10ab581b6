use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use thiserror::Error;
use voucher_payment_engine::{OrderFlowError, PricingError};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Webhook signature invalid or not provided. {0}")]
    InvalidWebhookSignature(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The order is not in a processable state. {0}")]
    OrderNotProcessable(String),
    #[error("The payment provider rejected the request. {0}")]
    PaymentProviderError(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::InvalidWebhookSignature(_) => StatusCode::UNAUTHORIZED,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::OrderNotProcessable(_) => StatusCode::CONFLICT,
            Self::PaymentProviderError(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::InvalidInput(s) => Self::InvalidRequestBody(s),
            OrderFlowError::OrderNotFound(id) => Self::NoRecordFound(format!("Order {id}")),
            OrderFlowError::OrderNotPending(..) => Self::OrderNotProcessable(e.to_string()),
            OrderFlowError::CheckoutSession(..) => Self::PaymentProviderError(e.to_string()),
            OrderFlowError::Pricing(PricingError::InvalidInput(s)) => Self::InvalidRequestBody(s),
            OrderFlowError::Pricing(PricingError::Store(e)) => Self::BackendError(e.to_string()),
            OrderFlowError::Store(e) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<PricingError> for ServerError {
    fn from(e: PricingError) -> Self {
        match e {
            PricingError::InvalidInput(s) => Self::InvalidRequestBody(s),
            PricingError::Store(e) => Self::BackendError(e.to_string()),
        }
    }
}
