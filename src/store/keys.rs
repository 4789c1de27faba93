//! Record key encoding
//!
//! Key format: {id:8BE}
//!
//! Big-endian keeps the byte order of keys equal to the numeric order of
//! identifiers, so a table scan visits documents in insertion order.

use super::errors::{StoreError, StoreResult};

/// Width of an encoded record key
pub const KEY_LEN: usize = 8;

/// Encodes a document identifier as a record key
pub fn encode_id(id: u64) -> [u8; KEY_LEN] {
    id.to_be_bytes()
}

/// Decodes a record key back into a document identifier
pub fn decode_id(bucket: &str, key: &[u8]) -> StoreResult<u64> {
    let bytes: [u8; KEY_LEN] = key.try_into().map_err(|_| {
        StoreError::decoding(
            bucket,
            None,
            format!("record key has {} bytes, expected {}", key.len(), KEY_LEN),
        )
    })?;
    Ok(u64::from_be_bytes(bytes))
}
