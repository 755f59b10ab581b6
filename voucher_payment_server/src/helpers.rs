//! Webhook authenticity checks.
//!
//! Stripe signs every webhook delivery with the endpoint's signing secret. The signature arrives
//! in the `Stripe-Signature` header as `t=<unix-ts>,v1=<hex-hmac>[,v1=...]`, where the HMAC-SHA256
//! is computed over `"{t}.{raw body}"`. The raw body must be verified byte-for-byte before any
//! JSON parsing happens.
use hmac::{Hmac, Mac};
use log::*;
use sha2::Sha256;

use crate::errors::ServerError;

pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

type HmacSha256 = Hmac<Sha256>;

pub fn calculate_hmac_hex(secret: &str, data: &[u8]) -> String {
    // HMAC can take a key of any length
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(data);
    let bytes = mac.finalize().into_bytes();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: String,
    pub signatures: Vec<String>,
}

pub fn parse_signature_header(header: &str) -> Option<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for element in header.split(',') {
        match element.trim().split_once('=') {
            Some(("t", ts)) => timestamp = Some(ts.to_string()),
            Some(("v1", sig)) => signatures.push(sig.to_string()),
            // Other schemes (v0, test-mode keys) are ignored.
            _ => {},
        }
    }
    let timestamp = timestamp?;
    if signatures.is_empty() {
        return None;
    }
    Some(SignatureHeader { timestamp, signatures })
}

/// Verifies the raw webhook body against the `Stripe-Signature` header value.
pub fn verify_webhook_signature(secret: &str, header: &str, body: &[u8]) -> Result<(), ServerError> {
    let parsed = parse_signature_header(header)
        .ok_or_else(|| ServerError::InvalidWebhookSignature("Malformed signature header".to_string()))?;
    let mut signed_payload = Vec::with_capacity(parsed.timestamp.len() + 1 + body.len());
    signed_payload.extend_from_slice(parsed.timestamp.as_bytes());
    signed_payload.push(b'.');
    signed_payload.extend_from_slice(body);
    let expected = calculate_hmac_hex(secret, &signed_payload);
    if parsed.signatures.iter().any(|sig| sig == &expected) {
        trace!("🔐️ Webhook signature check ✅️");
        Ok(())
    } else {
        warn!("🔐️ Invalid webhook signature, denying access");
        Err(ServerError::InvalidWebhookSignature("Signature mismatch".to_string()))
    }
}

/// Builds a valid `Stripe-Signature` header value for a body, for use in tests and tooling.
pub fn sign_webhook_payload(secret: &str, timestamp: &str, body: &[u8]) -> String {
    let mut signed_payload = Vec::with_capacity(timestamp.len() + 1 + body.len());
    signed_payload.extend_from_slice(timestamp.as_bytes());
    signed_payload.push(b'.');
    signed_payload.extend_from_slice(body);
    let sig = calculate_hmac_hex(secret, &signed_payload);
    format!("t={timestamp},v1={sig}")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_a_stripe_signature_header() {
        let header = "t=1714501234,v1=abc123,v0=ignored,v1=def456";
        let parsed = parse_signature_header(header).unwrap();
        assert_eq!(parsed.timestamp, "1714501234");
        assert_eq!(parsed.signatures, vec!["abc123".to_string(), "def456".to_string()]);
    }

    #[test]
    fn rejects_headers_without_timestamp_or_signature() {
        assert!(parse_signature_header("v1=abc123").is_none());
        assert!(parse_signature_header("t=1714501234").is_none());
        assert!(parse_signature_header("garbage").is_none());
    }

    #[test]
    fn signed_payloads_verify() {
        let secret = "whsec_testsecret";
        let body = br#"{"id": "evt_1", "type": "checkout.session.completed"}"#;
        let header = sign_webhook_payload(secret, "1714501234", body);
        verify_webhook_signature(secret, &header, body).unwrap();
    }

    #[test]
    fn tampered_bodies_do_not_verify() {
        let secret = "whsec_testsecret";
        let body = br#"{"id": "evt_1"}"#;
        let header = sign_webhook_payload(secret, "1714501234", body);
        let err = verify_webhook_signature(secret, &header, br#"{"id": "evt_2"}"#).unwrap_err();
        assert!(matches!(err, ServerError::InvalidWebhookSignature(_)));
        // Wrong secret fails too.
        let err = verify_webhook_signature("whsec_other", &header, body).unwrap_err();
        assert!(matches!(err, ServerError::InvalidWebhookSignature(_)));
    }
}
