//! Deterministic short codes derived from canonical recipe URLs.

use sha2::{Digest, Sha256};

/// Smallest accepted short code length.
pub const MIN_CODE_LENGTH: usize = 4;

/// A SHA-256 digest has 64 hex characters.
pub const MAX_CODE_LENGTH: usize = 64;

/// Returns the first `length` lowercase hex characters of SHA-256(`url`).
///
/// The same URL always yields the same code. `length` is clamped to
/// [`MAX_CODE_LENGTH`].
pub fn generate(url: &str, length: usize) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let mut code = hex::encode(digest);
    code.truncate(length.min(MAX_CODE_LENGTH));
    code
}

/// Code used for the `attempt`-th collision fallback.
///
/// Attempt `0` is the plain URL hash; later attempts hash `"{url}#{attempt}"`.
pub fn generate_with_attempt(url: &str, length: usize, attempt: u32) -> String {
    if attempt == 0 {
        generate(url, length)
    } else {
        generate(&format!("{url}#{attempt}"), length)
    }
}

/// Returns true if `code` could have been produced by [`generate`].
pub fn is_well_formed(code: &str) -> bool {
    (MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&code.len())
        && code
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}
