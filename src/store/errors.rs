//! Store error types
//!
//! Error codes:
//! - PALLAS_IO_ERROR
//! - PALLAS_INVALID_OPTIONS
//! - PALLAS_TRANSACTION_FAILED
//! - PALLAS_BUCKET_NOT_FOUND
//! - PALLAS_ENCODING_FAILED
//! - PALLAS_DECODING_FAILED
//! - PALLAS_INVALID_QUERY
//! - PALLAS_CANCELED
//!
//! Every error is scoped to the failing operation. Nothing here is fatal to
//! the process and previously committed state is never affected.

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::Path;

use crate::codec::CodecError;

type BoxedSource = Box<dyn StdError + Send + Sync + 'static>;

/// Store-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorCode {
    /// Backing file could not be opened, created or removed
    Io,
    /// Store options are unusable (empty name, path separators)
    InvalidOptions,
    /// Engine transaction could not begin, read, write or commit
    Transaction,
    /// Named bucket does not exist
    NotFound,
    /// Document could not be serialized
    Encoding,
    /// Stored record could not be deserialized
    Decoding,
    /// Malformed query or filter input
    InvalidQuery,
    /// Operation was canceled by the caller
    Canceled,
}

impl StoreErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StoreErrorCode::Io => "PALLAS_IO_ERROR",
            StoreErrorCode::InvalidOptions => "PALLAS_INVALID_OPTIONS",
            StoreErrorCode::Transaction => "PALLAS_TRANSACTION_FAILED",
            StoreErrorCode::NotFound => "PALLAS_BUCKET_NOT_FOUND",
            StoreErrorCode::Encoding => "PALLAS_ENCODING_FAILED",
            StoreErrorCode::Decoding => "PALLAS_DECODING_FAILED",
            StoreErrorCode::InvalidQuery => "PALLAS_INVALID_QUERY",
            StoreErrorCode::Canceled => "PALLAS_CANCELED",
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Store error with code, message and optional context
#[derive(Debug)]
pub struct StoreError {
    code: StoreErrorCode,
    message: String,
    details: Option<String>,
    source: Option<BoxedSource>,
}

impl StoreError {
    fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Attaches context such as the bucket or document id
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Backing file could not be created or removed
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::new(StoreErrorCode::Io, message).with_source(source)
    }

    /// Engine refused to open the backing file
    pub fn open_failed(path: &Path, reason: impl fmt::Display) -> Self {
        Self::new(
            StoreErrorCode::Io,
            format!("cannot open database file: {}", reason),
        )
        .with_details(format!("path: {}", path.display()))
    }

    pub fn invalid_options(reason: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::InvalidOptions, reason)
    }

    /// Engine failure while beginning, using or committing a transaction
    pub fn transaction(context: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            StoreErrorCode::Transaction,
            format!("{}: {}", context, reason),
        )
    }

    pub fn bucket_not_found(bucket: &str) -> Self {
        Self::new(
            StoreErrorCode::NotFound,
            format!("cannot find bucket {}", bucket),
        )
        .with_details(format!("bucket: {}", bucket))
    }

    pub fn encoding(bucket: &str, source: CodecError) -> Self {
        Self::new(StoreErrorCode::Encoding, source.reason().to_string())
            .with_details(format!("bucket: {}", bucket))
            .with_source(source)
    }

    pub fn decoding(bucket: &str, id: Option<u64>, reason: impl Into<String>) -> Self {
        let details = match id {
            Some(id) => format!("bucket: {}, id: {}", bucket, id),
            None => format!("bucket: {}", bucket),
        };
        Self::new(StoreErrorCode::Decoding, reason).with_details(details)
    }

    pub fn invalid_query(reason: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::InvalidQuery, reason)
    }

    pub fn canceled() -> Self {
        Self::new(StoreErrorCode::Canceled, "operation canceled")
    }

    /// Returns the error code
    pub fn code(&self) -> StoreErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn is_not_found(&self) -> bool {
        self.code == StoreErrorCode::NotFound
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl StdError for StoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
