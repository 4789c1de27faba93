//! Default JSON codec
//!
//! Self-describing UTF-8 JSON objects, so documents of different shapes can
//! share a bucket.

use crate::document::{Document, Value};

use super::errors::{CodecError, CodecResult};
use super::{DocumentDecoder, DocumentEncoder};

/// JSON encoder/decoder pair
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl DocumentEncoder for JsonCodec {
    fn encode(&self, document: &Document) -> CodecResult<Vec<u8>> {
        // serde_json would silently write NaN/inf as null
        for (field, value) in document {
            if let Some(f) = value.find_non_finite() {
                return Err(CodecError::encode(format!(
                    "field '{}' holds non-finite float {}",
                    field, f
                )));
            }
        }
        serde_json::to_vec(document).map_err(|e| CodecError::encode(e.to_string()))
    }
}

impl DocumentDecoder for JsonCodec {
    fn decode(&self, bytes: &[u8]) -> CodecResult<Document> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| CodecError::decode(e.to_string()))?;
        match value {
            Value::Map(doc) => Ok(doc),
            other => Err(CodecError::decode(format!(
                "expected a JSON object, found {}",
                other.type_name()
            ))),
        }
    }
}
