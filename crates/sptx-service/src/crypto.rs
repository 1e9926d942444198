//! Cryptographic utilities for webhook verification.
//!
//! Paystack signs each webhook with HMAC-SHA512 over the raw request body,
//! keyed by the account's secret key, and sends the hex digest in the
//! `x-paystack-signature` header.

use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Compute HMAC-SHA512 and return the hex-encoded result (128 characters).
///
/// # Panics
///
/// Never in practice: HMAC accepts keys of any size per RFC 2104, so
/// `new_from_slice` cannot fail.
#[must_use]
pub fn hmac_sha512_hex(secret: &str, message: &[u8]) -> String {
    // INVARIANT: HMAC accepts keys of any size per RFC 2104.
    let mut mac =
        HmacSha512::new_from_slice(secret.as_bytes()).expect("HMAC-SHA512 accepts any key size");
    mac.update(message);

    hex::encode(mac.finalize().into_bytes())
}

/// Verify a hex signature over `body`, comparing the full digest in
/// constant time. Hex case is ignored.
#[must_use]
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let expected = hmac_sha512_hex(secret, body);
    constant_time_eq(&expected, &signature.trim().to_ascii_lowercase())
}

/// Constant-time string comparison to prevent timing attacks.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
