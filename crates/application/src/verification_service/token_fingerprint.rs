/// Hex characters of the SHA-256 digest kept in a fingerprint.
const FINGERPRINT_LEN: usize = 16;

/// Derives a short stable reference for a token so the raw token is never
/// stored.
#[must_use]
pub fn token_fingerprint(raw_token: &str) -> String {
    use sha2::{Digest, Sha256};
    use std::fmt::Write;

    let digest = Sha256::digest(raw_token.as_bytes());

    digest
        .iter()
        .take(FINGERPRINT_LEN / 2)
        .fold(String::with_capacity(FINGERPRINT_LEN), |mut acc, byte| {
            let _ = write!(acc, "{byte:02x}");
            acc
        })
}
