use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Compute the hex HMAC-SHA256 signature carried on outbound notifications.
///
/// The signature covers the serialized event envelope exactly as sent; the
/// subscription secret is the key. An empty secret is accepted and signs
/// with the empty key.
pub fn compute_signature(secret: &[u8], payload: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret)
        .unwrap_or_else(|_| Hmac::<Sha256>::new_from_slice(b"default").expect("hmac"));
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a received signature against the raw request body.
pub fn verify_signature(secret: &[u8], payload: &[u8], signature_hex: &str) -> bool {
    let Ok(signature) = hex::decode(signature_hex) else {
        return false;
    };

    let mut mac = Hmac::<Sha256>::new_from_slice(secret)
        .unwrap_or_else(|_| Hmac::<Sha256>::new_from_slice(b"default").expect("hmac"));
    mac.update(payload);

    mac.verify_slice(&signature).is_ok()
}

#[derive(Debug, Clone)]
pub struct ParsedHeaders {
    pub event: Option<String>,
    pub signature: Option<String>,
}

/// Pick the event and signature headers out of a received header list.
/// Header-name comparison is case-insensitive.
pub fn parse_notification_headers<'a, I>(
    headers: I,
    event_header: &str,
    signature_header: &str,
) -> ParsedHeaders
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let event_key = event_header.to_ascii_lowercase();
    let sig_key = signature_header.to_ascii_lowercase();

    let mut event = None;
    let mut signature = None;

    for (name, value) in headers {
        let key = name.to_ascii_lowercase();
        if key == event_key {
            event = Some(value.to_string());
        } else if key == sig_key {
            signature = Some(value.to_string());
        }
    }

    ParsedHeaders { event, signature }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    MissingSignature,
    InvalidSignature,
}

/// Verify an incoming notification request in one call.
///
/// Intended for subscriber endpoints: pass the received headers, the raw
/// body bytes, and the secret handed out at subscription creation.
pub fn verify_notification<'a, I>(
    headers: I,
    payload: &[u8],
    secret: &[u8],
    signature_header: &str,
) -> Result<(), VerificationError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let sig_key = signature_header.to_ascii_lowercase();
    let signature = headers
        .into_iter()
        .find(|(name, _)| name.to_ascii_lowercase() == sig_key)
        .map(|(_, value)| value.to_string())
        .ok_or(VerificationError::MissingSignature)?;

    if verify_signature(secret, payload, &signature) {
        Ok(())
    } else {
        Err(VerificationError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_roundtrip() {
        let sig = compute_signature(b"secret", b"{\"event\":\"host.deleted\"}");
        assert_eq!(sig.len(), 64);
        assert!(verify_signature(b"secret", b"{\"event\":\"host.deleted\"}", &sig));
    }

    #[test]
    fn tampered_payload_fails() {
        let sig = compute_signature(b"secret", b"payload");
        assert!(!verify_signature(b"secret", b"payload2", &sig));
        assert!(!verify_signature(b"other", b"payload", &sig));
        assert!(!verify_signature(b"secret", b"payload", "zz-not-hex"));
    }

    #[test]
    fn empty_secret_still_signs() {
        // Zero-length secrets are not rejected anywhere; they sign with the
        // empty key. Pinned here deliberately.
        let sig = compute_signature(b"", b"payload");
        assert_eq!(sig.len(), 64);
        assert!(verify_signature(b"", b"payload", &sig));
    }

    #[test]
    fn header_parsing_is_case_insensitive() {
        let headers = vec![
            ("x-kai-event", "host.deleted"),
            ("X-KAI-SIGNATURE", "abc123"),
        ];
        let parsed = parse_notification_headers(headers, "X-Kai-Event", "X-Kai-Signature");
        assert_eq!(parsed.event.as_deref(), Some("host.deleted"));
        assert_eq!(parsed.signature.as_deref(), Some("abc123"));
    }
}
