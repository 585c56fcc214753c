//! Cache keys are the hex SHA-256 of the fully-resolved request URL.

use sha2::{Digest, Sha256};

/// Key for a canonical request URL (sorted query, no fragment).
///
/// Equivalent requests only share a key when their URLs render identically,
/// which `folio_client`'s URL builder guarantees.
pub fn compute_cache_key(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}
