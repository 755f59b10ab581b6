//! In-memory fakes and environment helpers for testing the order flow without a real payment
//! provider or mail service.

mod fakes;
mod memory_store;
pub mod prepare_env;

pub use fakes::{SentConfirmation, TestNotifier, TestPaymentProvider};
pub use memory_store::MemoryStore;
