//! Webhook signature verification.
//!
//! Stripe signs each delivery with a `Stripe-Signature` header of the form
//! `t=<unix-ts>,v1=<hex hmac>[,v1=...]`. The signed payload is
//! `"{t}.{raw body}"`, keyed with the endpoint's signing secret. Signatures
//! older than the tolerance window are rejected to blunt replay.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Maximum accepted age of a signature, in seconds.
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

/// Reasons a signature fails verification. Logged, never echoed to the
/// sender.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SignatureError {
    /// Header has no `t=` element.
    #[error("signature header missing timestamp")]
    MissingTimestamp,
    /// Header has no `v1=` element.
    #[error("signature header missing v1 signature")]
    MissingSignature,
    /// The `t=` element is not a unix timestamp.
    #[error("signature timestamp is not a number")]
    InvalidTimestamp,
    /// The timestamp is outside the tolerance window.
    #[error("signature timestamp outside tolerance window")]
    Stale,
    /// No `v1` signature matched the payload.
    #[error("signature mismatch")]
    Mismatch,
}

/// Verify a `Stripe-Signature` header against the raw request body.
///
/// `now` is the current unix timestamp, passed in for testability.
///
/// # Errors
///
/// Returns a [`SignatureError`] describing the first check that failed.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), SignatureError> {
    let mut timestamp: Option<&str> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for element in header.split(',') {
        match element.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MissingTimestamp)?;
    if signatures.is_empty() {
        return Err(SignatureError::MissingSignature);
    }

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| SignatureError::InvalidTimestamp)?;
    if (now - ts).abs() > TIMESTAMP_TOLERANCE_SECS {
        return Err(SignatureError::Stale);
    }

    for candidate in signatures {
        let Ok(candidate_bytes) = hex::decode(candidate) else {
            continue;
        };
        // HMAC accepts keys of any size; new_from_slice cannot fail here.
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            continue;
        };
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        // verify_slice is constant-time
        if mac.verify_slice(&candidate_bytes).is_ok() {
            return Ok(());
        }
    }

    Err(SignatureError::Mismatch)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_c4fd9k27aQm8xLbP3vRn6TgY";
    const PAYLOAD: &[u8] = br#"{"type":"checkout.session.completed"}"#;
    const NOW: i64 = 1_700_000_000;

    fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature_accepted() {
        let header = format!("t={NOW},v1={}", sign(PAYLOAD, SECRET, NOW));
        assert_eq!(verify_signature(PAYLOAD, &header, SECRET, NOW), Ok(()));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let header = format!("t={NOW},v1={}", sign(PAYLOAD, "whsec_other", NOW));
        assert_eq!(
            verify_signature(PAYLOAD, &header, SECRET, NOW),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let header = format!("t={NOW},v1={}", sign(PAYLOAD, SECRET, NOW));
        let tampered = br#"{"type":"checkout.session.expired"}"#;
        assert_eq!(
            verify_signature(tampered, &header, SECRET, NOW),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let old = NOW - TIMESTAMP_TOLERANCE_SECS - 1;
        let header = format!("t={old},v1={}", sign(PAYLOAD, SECRET, old));
        assert_eq!(
            verify_signature(PAYLOAD, &header, SECRET, NOW),
            Err(SignatureError::Stale)
        );
    }

    #[test]
    fn test_second_v1_signature_accepted() {
        // Stripe sends multiple v1 elements during secret rotation.
        let header = format!(
            "t={NOW},v1={},v1={}",
            sign(PAYLOAD, "whsec_rotated_out", NOW),
            sign(PAYLOAD, SECRET, NOW)
        );
        assert_eq!(verify_signature(PAYLOAD, &header, SECRET, NOW), Ok(()));
    }

    #[test]
    fn test_malformed_headers_rejected() {
        assert_eq!(
            verify_signature(PAYLOAD, "", SECRET, NOW),
            Err(SignatureError::MissingTimestamp)
        );
        assert_eq!(
            verify_signature(PAYLOAD, "t=123", SECRET, NOW),
            Err(SignatureError::MissingSignature)
        );
        assert_eq!(
            verify_signature(PAYLOAD, "t=abc,v1=00", SECRET, NOW),
            Err(SignatureError::InvalidTimestamp)
        );
    }
}
