//! Content hashing for cache namespaces.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compute SHA256 hash of a serializable value.
///
/// The value is serialized to JSON before hashing, so equal values always
/// hash the same. Returns a 64-character lowercase hexadecimal string.
pub fn compute_hash<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Short namespace for entries that belong to one engine connection.
///
/// Two connections sharing a cache file never see each other's entries.
pub fn connection_namespace(driver: &str, connection_string: &str) -> Result<String, serde_json::Error> {
    let hash = compute_hash(&(driver, connection_string))?;
    Ok(hash[..16].to_string())
}
