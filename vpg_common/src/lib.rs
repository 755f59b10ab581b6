mod usd;

pub mod op;
mod secret;

pub use secret::Secret;
pub use usd::{UsdConversionError, UsdPrice, USD_CURRENCY_CODE, USD_CURRENCY_CODE_LOWER};
