//! Hashing and random value generation.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;
use sha2::{Digest, Sha256};

/// Number of digits in a public request code.
pub const REQUEST_CODE_DIGITS: usize = 4;

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates a URL-safe random token with 256 bits of entropy.
pub fn generate_secure_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generates a random zero-padded 4-digit request code ("0000".."9999").
///
/// Uniqueness is not checked here; callers insert under a unique
/// constraint and retry on conflict.
pub fn generate_request_code() -> String {
    let n: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("{:0width$}", n, width = REQUEST_CODE_DIGITS)
}
