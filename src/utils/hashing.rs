//! Hashing, request ids and tokens.

use jiff::Timestamp;
use rand::{Rng, distributions::Alphanumeric};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Salt mixed into every application hash.
pub const MAGIC_SALT: &str = "ecommerce_platform_2024_salt";

/// Request ids look like `REQ-{millis}-{hash8}`.
const REQUEST_ID_PREFIX: &str = "REQ";

/// Salted SHA-256 of the input, hex encoded.
#[must_use]
pub fn salted_hash(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    hasher.update(MAGIC_SALT.as_bytes());

    hex::encode(hasher.finalize())
}

/// A traceable request id: millisecond timestamp plus a short salted hash
/// of a fresh UUID.
#[must_use]
pub fn request_id() -> String {
    let millis = Timestamp::now().as_millisecond();
    let unique = Uuid::new_v4();

    let digest: String = salted_hash(&format!("{millis}{unique}"))
        .chars()
        .take(8)
        .collect();

    format!("{REQUEST_ID_PREFIX}-{millis}-{digest}")
}

/// A random alphanumeric token of the given length.
#[must_use]
pub fn token(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
