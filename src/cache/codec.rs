//! Cache Entry Codec
//!
//! JSON encoding of cached values.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

/// Encodes a value for storage.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Decodes a stored value.
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T> {
    Ok(serde_json::from_str(raw)?)
}

/// Size of an encoded value in bytes (UTF-8 length, not char count).
pub fn byte_size(encoded: &str) -> u64 {
    encoded.len() as u64
}
