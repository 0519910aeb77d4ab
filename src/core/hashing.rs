use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of the UTF-8 bytes of `source`.
///
/// Downstream consumers key caches on this value, so it must depend on
/// nothing but the text.
pub fn source_code_hash(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}
