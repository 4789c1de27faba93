//! Document codecs
//!
//! A codec turns a [`Document`] into an opaque byte payload and back. The
//! encoder and decoder are injected into the store at construction time and
//! apply to every bucket in that store. Records written under one codec are
//! not readable under another.

mod errors;
mod json;

pub use errors::{CodecError, CodecResult};
pub use json::JsonCodec;

use crate::document::Document;

/// Serializes documents for storage
pub trait DocumentEncoder: Send + Sync {
    /// Encodes a document into its persisted byte form
    fn encode(&self, document: &Document) -> CodecResult<Vec<u8>>;
}

/// Deserializes stored payloads back into documents
pub trait DocumentDecoder: Send + Sync {
    /// Decodes a persisted payload
    fn decode(&self, bytes: &[u8]) -> CodecResult<Document>;
}
