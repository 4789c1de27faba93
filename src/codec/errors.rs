//! Codec error type

use thiserror::Error;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Failure to encode or decode a document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Document contains a value the codec cannot represent
    #[error("cannot encode document: {0}")]
    Encode(String),

    /// Payload is not a valid encoded document
    #[error("cannot decode document: {0}")]
    Decode(String),
}

impl CodecError {
    pub fn encode(reason: impl Into<String>) -> Self {
        CodecError::Encode(reason.into())
    }

    pub fn decode(reason: impl Into<String>) -> Self {
        CodecError::Decode(reason.into())
    }

    /// Returns the underlying reason without the prefix
    pub fn reason(&self) -> &str {
        match self {
            CodecError::Encode(r) | CodecError::Decode(r) => r,
        }
    }
}
