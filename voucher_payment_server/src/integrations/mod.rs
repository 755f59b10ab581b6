pub mod resend;
pub mod stripe;

pub use resend::ResendNotifier;
pub use stripe::StripeCheckout;
