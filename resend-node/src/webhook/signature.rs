//! Svix webhook signature verification.
//!
//! Resend signs webhook requests through Svix using HMAC-SHA256.
//! Reference: https://docs.svix.com/receiving/verifying-payloads/how-manual

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

use crate::error::{ResendError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Prefix Svix puts in front of the base64 signing secret.
pub const SECRET_PREFIX: &str = "whsec_";

/// Only signatures tagged with this version are accepted.
const SIGNATURE_VERSION: &str = "v1";

/// Verify a Svix webhook signature.
///
/// Svix sends three headers with every webhook:
/// - `svix-id`: unique message identifier
/// - `svix-timestamp`: Unix epoch seconds the message was sent
/// - `svix-signature`: space separated `version,signature` pairs, one per
///   active signing key
///
/// The expected signature is the base64 HMAC-SHA256 of `id.timestamp.payload`
/// keyed with the base64-decoded secret (without its `whsec_` prefix).
///
/// # Arguments
///
/// * `payload` - The raw request body, exactly as received
/// * `id` - The `svix-id` header
/// * `timestamp` - The `svix-timestamp` header
/// * `signature_header` - The `svix-signature` header
/// * `secret` - The webhook signing secret (`whsec_...`)
///
/// # Errors
///
/// * [`ResendError::MissingSignatureHeaders`] if any header is empty
/// * [`ResendError::BadSecretEncoding`] if the secret is not valid base64
/// * [`ResendError::InvalidSignature`] if no `v1` signature matches
pub fn verify_svix_signature(
    payload: &[u8],
    id: &str,
    timestamp: &str,
    signature_header: &str,
    secret: &str,
) -> Result<()> {
    if id.is_empty() || timestamp.is_empty() || signature_header.is_empty() {
        warn!(
            has_id = !id.is_empty(),
            has_timestamp = !timestamp.is_empty(),
            has_signature = !signature_header.is_empty(),
            "svix_signature_missing_headers"
        );
        return Err(ResendError::MissingSignatureHeaders);
    }

    let key = decode_secret(secret)?;
    let expected_signature = sign(&key, id, timestamp, payload);

    let valid = signature_header
        .split_whitespace()
        .filter_map(|token| token.split_once(','))
        .any(|(version, signature)| {
            version == SIGNATURE_VERSION && constant_time_compare(&expected_signature, signature)
        });

    if !valid {
        warn!(
            svix_id = %id,
            signature_count = signature_header.split_whitespace().count(),
            "svix_signature_mismatch"
        );
        return Err(ResendError::InvalidSignature);
    }

    Ok(())
}

/// Strip the `whsec_` prefix and base64-decode the remainder to key bytes.
pub fn decode_secret(secret: &str) -> Result<Vec<u8>> {
    let encoded = secret.trim();
    let encoded = encoded.strip_prefix(SECRET_PREFIX).unwrap_or(encoded);
    STANDARD.decode(encoded).map_err(|e| {
        warn!(error = %e, "svix_secret_decode_failed");
        ResendError::BadSecretEncoding(e)
    })
}

/// Compute the base64 `v1` signature for a message.
pub fn sign(key: &[u8], id: &str, timestamp: &str, payload: &[u8]) -> String {
    // HMAC accepts keys of any length.
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(id.as_bytes());
    mac.update(b".");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

/// Check if signature verification is enabled.
///
/// An unset, empty or whitespace-only secret turns verification off and every
/// payload is accepted unverified.
pub fn is_signature_verification_enabled(secret: &Option<String>) -> bool {
    secret
        .as_ref()
        .map(|s| !s.trim().is_empty())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    // base64("test-signing-key-for-resend-hooks")
    const SECRET: &str = "whsec_dGVzdC1zaWduaW5nLWtleS1mb3ItcmVzZW5kLWhvb2tz";
    const PAYLOAD: &[u8] = br#"{"type":"email.sent","data":{"email_id":"abc"}}"#;

    fn signature_for(payload: &[u8]) -> String {
        let key = decode_secret(SECRET).unwrap();
        sign(&key, "msg_123", "1700000000", payload)
    }

    #[test]
    fn test_verify_signature_missing_headers() {
        let cases = [
            ("", "1700000000", "v1,sig"),
            ("msg_123", "", "v1,sig"),
            ("msg_123", "1700000000", ""),
        ];
        for (id, timestamp, signature) in cases {
            let result = verify_svix_signature(PAYLOAD, id, timestamp, signature, SECRET);
            assert!(matches!(result, Err(ResendError::MissingSignatureHeaders)));
        }
    }

    #[test]
    fn test_verify_signature_valid() {
        let header = format!("v1,{}", signature_for(PAYLOAD));
        assert!(verify_svix_signature(PAYLOAD, "msg_123", "1700000000", &header, SECRET).is_ok());
    }

    #[test]
    fn test_verify_signature_secret_without_prefix() {
        let header = format!("v1,{}", signature_for(PAYLOAD));
        let bare = SECRET.trim_start_matches(SECRET_PREFIX);
        assert!(verify_svix_signature(PAYLOAD, "msg_123", "1700000000", &header, bare).is_ok());
    }

    #[test]
    fn test_verify_signature_matches_known_digest() {
        let key = b"test-signing-key-for-resend-hooks";
        let mut mac = HmacSha256::new_from_slice(key).unwrap();
        mac.update(b"msg_123.1700000000.");
        mac.update(PAYLOAD);
        let expected = STANDARD.encode(mac.finalize().into_bytes());

        assert_eq!(signature_for(PAYLOAD), expected);
    }

    #[test]
    fn test_verify_signature_rotated_keys() {
        let header = format!(
            "v1,bm90LXRoZS1yaWdodC1zaWduYXR1cmU= v1,{}",
            signature_for(PAYLOAD)
        );
        assert!(verify_svix_signature(PAYLOAD, "msg_123", "1700000000", &header, SECRET).is_ok());
    }

    #[test]
    fn test_verify_signature_wrong_version() {
        let header = format!("v2,{}", signature_for(PAYLOAD));
        let result = verify_svix_signature(PAYLOAD, "msg_123", "1700000000", &header, SECRET);
        assert!(matches!(result, Err(ResendError::InvalidSignature)));
    }

    #[test]
    fn test_verify_signature_tampered_payload() {
        let header = format!("v1,{}", signature_for(PAYLOAD));
        let tampered = br#"{"type":"email.sent","data":{"email_id":"xyz"}}"#;
        let result = verify_svix_signature(tampered, "msg_123", "1700000000", &header, SECRET);
        assert!(matches!(result, Err(ResendError::InvalidSignature)));
    }

    #[test]
    fn test_verify_signature_tampered_timestamp() {
        let header = format!("v1,{}", signature_for(PAYLOAD));
        let result = verify_svix_signature(PAYLOAD, "msg_123", "1700000001", &header, SECRET);
        assert!(matches!(result, Err(ResendError::InvalidSignature)));
    }

    #[test]
    fn test_verify_signature_bad_secret() {
        let result =
            verify_svix_signature(PAYLOAD, "msg_123", "1700000000", "v1,sig", "whsec_not*base64!");
        assert!(matches!(result, Err(ResendError::BadSecretEncoding(_))));
    }

    #[test]
    fn test_verify_signature_malformed_tokens() {
        let result =
            verify_svix_signature(PAYLOAD, "msg_123", "1700000000", "v1 garbage ,", SECRET);
        assert!(matches!(result, Err(ResendError::InvalidSignature)));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
    }

    #[test]
    fn test_is_signature_verification_enabled() {
        assert!(!is_signature_verification_enabled(&None));
        assert!(!is_signature_verification_enabled(&Some("".to_string())));
        assert!(!is_signature_verification_enabled(&Some("   ".to_string())));
        assert!(is_signature_verification_enabled(&Some(SECRET.to_string())));
    }
}
