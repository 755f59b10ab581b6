use thiserror::Error;

#[derive(Debug, Error)]
pub enum StripeApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST response: {0}")]
    ResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Stripe request failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("The Stripe request timed out after {0}s")]
    Timeout(u64),
}
