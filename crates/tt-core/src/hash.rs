//! Stable hashing of serialisable payloads.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::RecoError;
use crate::serde::to_canonical_json_bytes;

/// Computes a stable hexadecimal SHA-256 hash of the canonical JSON form of `value`.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, RecoError> {
    let bytes = to_canonical_json_bytes(value)?;
    let digest = Sha256::digest(bytes);
    Ok(format!("{:x}", digest))
}
