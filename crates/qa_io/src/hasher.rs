//! Deterministic hashing and ID builders for canonical artifacts.
//!
//! - Use `sha256_canonical(..)` for JSON values/structs (goes through canonical_json).
//! - Use `sha256_hex(..)` for raw bytes.
//! - Hex digests are lowercase.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::canonical_json::{to_canonical_bytes, to_canonical_bytes_of};
use crate::IoError;

/// Prefix of evaluation ids.
pub const EVAL_ID_PREFIX: &str = "EVAL:";

/// SHA-256 over raw bytes, lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 over the canonical JSON bytes of any serializable value.
pub fn sha256_canonical<T: Serialize>(value: &T) -> Result<String, IoError> {
    Ok(sha256_hex(&to_canonical_bytes_of(value)?))
}

/// SHA-256 over the canonical bytes of an already-parsed value.
pub fn sha256_canonical_value(v: &Value) -> Result<String, IoError> {
    Ok(sha256_hex(&to_canonical_bytes(v)?))
}

/// `EVAL:<hex>`, the id of an evaluation document, computed over its canonical
/// bytes without the `id` field.
pub fn eval_id_from_canonical<T: Serialize>(value: &T) -> Result<String, IoError> {
    Ok(format!("{EVAL_ID_PREFIX}{}", sha256_canonical(value)?))
}

/// First `n` hex chars of an id's digest, for log lines.
pub fn short_id(id: &str, n: usize) -> &str {
    let hex = id.split_once(':').map_or(id, |(_, h)| h);
    hex.get(..n).unwrap_or(hex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hex_encoding_is_lowercase() {
        let h = sha256_hex(b"abc");
        assert_eq!(h, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    }

    #[test]
    fn canonical_hashing_ignores_key_order() {
        #[derive(Serialize)]
        struct T {
            b: u32,
            a: u32,
        }
        let h1 = sha256_canonical(&T { b: 2, a: 1 }).unwrap();
        let h2 = sha256_canonical_value(&json!({"a":1,"b":2})).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn eval_id_shape() {
        let id = eval_id_from_canonical(&json!({"verdict": "pass"})).unwrap();
        assert!(id.starts_with(EVAL_ID_PREFIX));
        assert_eq!(id.len(), EVAL_ID_PREFIX.len() + 64);
        assert_eq!(short_id(&id, 8).len(), 8);
        assert_eq!(short_id("abc", 8), "abc");
    }
}
