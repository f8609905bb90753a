use rand::rngs::OsRng;
use rand::Rng;
use rand::RngCore;
use sha2::Digest;
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Number of random bytes in an opaque bearer token (256 bits).
pub const OPAQUE_TOKEN_BYTES: usize = 32;

/// Generate an opaque bearer token from the OS CSPRNG.
///
/// # Returns
/// 64 lowercase hex characters
pub fn generate_opaque_token() -> String {
    let mut bytes = [0u8; OPAQUE_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generate a uniformly random six-digit numeric code (`100000`-`999999`).
pub fn generate_numeric_code() -> String {
    OsRng.gen_range(100_000..=999_999u32).to_string()
}

/// SHA-256 a secret for storage. Only digests ever reach the database.
///
/// # Returns
/// 64 lowercase hex characters
pub fn sha256_hex(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Compare two digests without leaking the position of the first mismatch.
pub fn digests_match(left: &str, right: &str) -> bool {
    left.as_bytes().ct_eq(right.as_bytes()).into()
}
