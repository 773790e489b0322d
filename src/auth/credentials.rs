//! Password hashing and session-token generation.
//!
//! Passwords go through bcrypt with a per-call random salt. Session tokens
//! are 32 bytes from the OS CSPRNG, hex encoded, and carry no structure.

use rand::Rng;

const TOKEN_BYTES: usize = 32;

/// Hashes a password with a fresh salt. Two calls on the same input
/// produce different hashes; both verify.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

/// Checks a password against a stored hash. The comparison happens inside
/// the bcrypt verifier; a malformed hash counts as a failed match rather
/// than an error.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Generates an opaque session token: 64 lowercase hex chars (256 bits).
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}
