//! qa_io: local inspection input, canonical JSON and content hashing.
//!
//! - Offline only: inputs are local file paths.
//! - Shared error type (`IoError`) with `From` conversions used across modules.
//! - Canonical JSON: sorted object keys, compact, no trailing newline.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for qa_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (open, read, create_dir_all, rename, fsync).
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON parse or (de)serialization error; `pointer` locates it when known.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Input does not conform to its JSON Schema.
    #[error("schema error: {0}")]
    Schema(String),

    /// Input rejected before parsing (size limit, not a file, URL path).
    #[error("invalid: {0}")]
    Invalid(String),
}

/* ---------------- From conversions (used by file modules) ---------------- */

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json reports line/column, not a pointer.
        IoError::Json { pointer: "/".to_string(), msg: e.to_string() }
    }
}

pub mod canonical_json;
pub mod hasher;
pub mod loader;
pub mod schema;
