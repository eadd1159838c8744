//! State and Nonce
//!
//! Random values bound to one authorization request.

use base64::Engine;
use constant_time_eq::constant_time_eq;
use rand::Rng;

/// Random bytes per generated value.
const RANDOM_BYTES: usize = 32;

/// Generate a URL-safe random token.
pub fn generate_random_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; RANDOM_BYTES] = rng.gen();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a CSRF state parameter.
pub fn generate_state() -> String {
    generate_random_token()
}

/// Generate an ID token nonce.
pub fn generate_nonce() -> String {
    generate_random_token()
}

/// Compare the returned state with the one issued, in constant time.
pub fn state_matches(expected: &str, received: Option<&str>) -> bool {
    received.is_some_and(|received| constant_time_eq(expected.as_bytes(), received.as_bytes()))
}
