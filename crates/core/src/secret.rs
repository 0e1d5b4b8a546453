//! Shared-secret and body-signature verification for webhook traffic.
//!
//! Both checks are pure predicates. Comparisons run in constant time so a
//! caller probing the receiver cannot learn how much of a guess was right.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Header carrying the shared secret on inbound webhook calls.
pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// Header carrying the `sha256=<hex>` HMAC of the request body.
pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// Header carrying the producer's per-attempt delivery id.
pub const DELIVERY_ID_HEADER: &str = "x-webhook-delivery";

const SIGNATURE_PREFIX: &str = "sha256=";

type HmacSha256 = Hmac<Sha256>;

/// Outcome of a shared-secret check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretCheck {
    Authorized,
    Rejected,
}

impl SecretCheck {
    pub fn is_authorized(self) -> bool {
        matches!(self, Self::Authorized)
    }
}

/// Compare a provided secret against the configured one.
///
/// Both values are hashed first so the comparison length is fixed. A missing
/// value or an empty configured secret is always [`SecretCheck::Rejected`].
pub fn verify_shared_secret(provided: Option<&str>, expected: &str) -> SecretCheck {
    let Some(provided) = provided else {
        return SecretCheck::Rejected;
    };
    if expected.is_empty() {
        return SecretCheck::Rejected;
    }

    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());

    if bool::from(provided.ct_eq(&expected)) {
        SecretCheck::Authorized
    } else {
        SecretCheck::Rejected
    }
}

/// Compute the `x-webhook-signature` value for a body: `sha256=<hex>`.
pub fn sign_payload(secret: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
}

/// Verify a `sha256=<hex>` signature header against the body.
///
/// Malformed headers (missing prefix, bad hex) fail verification.
pub fn verify_payload_signature(secret: &str, body: &[u8], header: &str) -> bool {
    if secret.is_empty() {
        return false;
    }
    let Some(hex_sig) = header.trim().strip_prefix(SIGNATURE_PREFIX) else {
        return false;
    };
    let Ok(signature) = hex::decode(hex_sig) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&signature).is_ok()
}
