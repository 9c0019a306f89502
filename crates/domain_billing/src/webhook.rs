//! Webhook signature verification
//!
//! Both gateways sign webhook payloads with HMAC-SHA256 over the raw body,
//! hex-encoded. Payloads are trusted only after the signature verifies;
//! verification is constant-time via the Mac implementation.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Computes the hex-encoded HMAC-SHA256 signature for a payload
///
/// Used by tests and by the outbound side of the mock gateway; inbound
/// verification goes through [`verify_signature`].
pub fn sign_payload(secret: &str, payload: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a hex-encoded HMAC-SHA256 signature over a payload
pub fn verify_signature(secret: &str, payload: &[u8], signature_hex: &str) -> bool {
    let expected = match hex::decode(signature_hex.trim()) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_signature_verifies() {
        let secret = "whsec_test";
        let payload = br#"{"event":"payment.completed","order_id":"order_1"}"#;
        let signature = sign_payload(secret, payload);
        assert!(verify_signature(secret, payload, &signature));
    }

    #[test]
    fn tampered_payload_fails() {
        let secret = "whsec_test";
        let signature = sign_payload(secret, b"original");
        assert!(!verify_signature(secret, b"tampered", &signature));
    }

    #[test]
    fn wrong_secret_fails() {
        let payload = b"payload";
        let signature = sign_payload("secret-a", payload);
        assert!(!verify_signature("secret-b", payload, &signature));
    }

    #[test]
    fn malformed_hex_fails_closed() {
        assert!(!verify_signature("secret", b"payload", "not hex!"));
        assert!(!verify_signature("secret", b"payload", ""));
    }
}
