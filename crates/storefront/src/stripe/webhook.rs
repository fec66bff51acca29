//! Stripe webhook signature verification.
//!
//! Implements Stripe's signature scheme: the `Stripe-Signature` header
//! carries `t=<unix-ts>,v1=<hex hmac>` pairs, and the signature is
//! HMAC-SHA256 over `"{t}.{raw body}"` keyed with the endpoint's signing
//! secret. Verification MUST run against the unparsed request body - parsing
//! first would admit forged payloads.
//!
//! <https://docs.stripe.com/webhooks/signatures>

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use super::StripeError;
use super::types::Event;

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed age of a webhook timestamp (replay protection).
const TOLERANCE_SECONDS: i64 = 300;

/// Parsed form of the `Stripe-Signature` header.
#[derive(Debug)]
struct SignatureHeader {
    timestamp: i64,
    /// All `v1` signatures present; Stripe sends several during secret
    /// rotation and any one matching is sufficient.
    v1_signatures: Vec<String>,
}

impl SignatureHeader {
    fn parse(header: &str) -> Result<Self, StripeError> {
        let mut timestamp = None;
        let mut v1_signatures = Vec::new();

        for pair in header.split(',') {
            let mut parts = pair.trim().splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some("t"), Some(value)) => {
                    timestamp = Some(value.parse::<i64>().map_err(|_| {
                        StripeError::InvalidSignature("Invalid timestamp".to_string())
                    })?);
                }
                (Some("v1"), Some(value)) => v1_signatures.push(value.to_string()),
                // v0 (test-mode legacy) and unknown schemes are ignored
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or_else(|| {
            StripeError::InvalidSignature("Missing timestamp in signature header".to_string())
        })?;

        if v1_signatures.is_empty() {
            return Err(StripeError::InvalidSignature(
                "No v1 signature in header".to_string(),
            ));
        }

        Ok(Self {
            timestamp,
            v1_signatures,
        })
    }
}

/// Verify a webhook signature and parse the event.
///
/// This is the single authenticity gate protecting order creation: the
/// payload is only deserialized after the signature over the raw bytes has
/// checked out.
///
/// # Errors
///
/// Returns `StripeError::InvalidSignature` if the header is malformed, the
/// timestamp is outside the tolerance window, or no signature matches.
/// Returns `StripeError::Parse` if the verified payload is not a valid
/// event.
pub fn construct_event(
    payload: &[u8],
    signature_header: &str,
    signing_secret: &SecretString,
) -> Result<Event, StripeError> {
    verify_signature(payload, signature_header, signing_secret, now_unix()?)?;
    Ok(serde_json::from_slice(payload)?)
}

/// Verify a webhook signature against the raw payload bytes.
///
/// # Errors
///
/// Returns `StripeError::InvalidSignature` on any verification failure.
pub fn verify_signature(
    payload: &[u8],
    signature_header: &str,
    signing_secret: &SecretString,
    now: i64,
) -> Result<(), StripeError> {
    let header = SignatureHeader::parse(signature_header)?;

    // Reject stale timestamps to prevent replay attacks
    if (now - header.timestamp).abs() > TOLERANCE_SECONDS {
        return Err(StripeError::InvalidSignature(
            "Request timestamp too old".to_string(),
        ));
    }

    // Compute expected signature over "{timestamp}.{payload}"
    let mut mac = HmacSha256::new_from_slice(signing_secret.expose_secret().as_bytes())
        .map_err(|e| StripeError::InvalidSignature(e.to_string()))?;
    mac.update(header.timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    let expected = hex::encode(mac.finalize().into_bytes());

    if header
        .v1_signatures
        .iter()
        .any(|candidate| constant_time_compare(&expected, candidate))
    {
        Ok(())
    } else {
        Err(StripeError::InvalidSignature(
            "Signature mismatch".to_string(),
        ))
    }
}

fn now_unix() -> Result<i64, StripeError> {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|e| StripeError::InvalidSignature(e.to_string()))?
        .as_secs();

    i64::try_from(secs)
        .map_err(|_| StripeError::InvalidSignature("System time overflow".to_string()))
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_signing_secret";

    fn sign(payload: &[u8], timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).expect("valid key length");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
    }

    fn secret() -> SecretString {
        SecretString::from(SECRET.to_string())
    }

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(constant_time_compare("", ""));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
        assert!(!constant_time_compare("hello", "helloo"));
    }

    #[test]
    fn test_signature_verification_valid() {
        let payload = br#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{"id":"cs_1"}}}"#;
        let now = 1_700_000_000;
        let header = sign(payload, now);

        assert!(verify_signature(payload, &header, &secret(), now).is_ok());
    }

    #[test]
    fn test_signature_verification_invalid_signature() {
        let payload = b"{}";
        let now = 1_700_000_000;
        let header = format!("t={now},v1=deadbeef");

        let result = verify_signature(payload, &header, &secret(), now);
        assert!(matches!(result, Err(StripeError::InvalidSignature(_))));
    }

    #[test]
    fn test_signature_verification_invalid_timestamp() {
        let result = verify_signature(b"{}", "t=not-a-number,v1=abc", &secret(), 0);
        assert!(matches!(result, Err(StripeError::InvalidSignature(_))));
    }

    #[test]
    fn test_signature_verification_missing_v1() {
        let result = verify_signature(b"{}", "t=1700000000", &secret(), 1_700_000_000);
        assert!(matches!(result, Err(StripeError::InvalidSignature(_))));
    }

    #[test]
    fn test_signature_verification_old_timestamp() {
        let payload = b"{}";
        let signed_at = 1_700_000_000;
        let header = sign(payload, signed_at);

        // Ten minutes later the signature is valid but stale
        let result = verify_signature(payload, &header, &secret(), signed_at + 600);
        assert!(matches!(result, Err(StripeError::InvalidSignature(_))));
    }

    #[test]
    fn test_signature_verification_tampered_body() {
        let now = 1_700_000_000;
        let header = sign(b"original body", now);

        let result = verify_signature(b"tampered body", &header, &secret(), now);
        assert!(matches!(result, Err(StripeError::InvalidSignature(_))));
    }

    #[test]
    fn test_signature_verification_second_v1_matches() {
        let payload = b"payload";
        let now = 1_700_000_000;
        let valid = sign(payload, now);
        let valid_sig = valid.split("v1=").nth(1).expect("sig part");
        let header = format!("t={now},v1=0000000000000000,v1={valid_sig}");

        assert!(verify_signature(payload, &header, &secret(), now).is_ok());
    }

    #[test]
    fn test_construct_event_parses_after_verification() {
        let payload = br#"{"id":"evt_9","type":"payment_intent.succeeded","data":{"object":{"id":"pi_9"}}}"#;
        let now = now_unix().expect("clock");
        let header = sign(payload, now);

        let event = construct_event(payload, &header, &secret()).expect("event");
        assert_eq!(event.kind, "payment_intent.succeeded");
        assert_eq!(event.object_id(), Some("pi_9"));
    }
}
