//! CLI-specific error types

use std::fmt;
use std::io;

use crate::rest_api::RestError;
use crate::store::StoreError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Malformed command-line argument
    InvalidArgument,
    /// Store operation failed
    StoreFailed,
    /// HTTP server could not start or stopped with an error
    ServeFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "PALLAS_CLI_CONFIG_ERROR",
            Self::IoError => "PALLAS_CLI_IO_ERROR",
            Self::InvalidArgument => "PALLAS_CLI_INVALID_ARGUMENT",
            Self::StoreFailed => "PALLAS_CLI_STORE_FAILED",
            Self::ServeFailed => "PALLAS_CLI_SERVE_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidArgument, msg)
    }

    pub fn serve_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ServeFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        Self::new(CliErrorCode::StoreFailed, e.to_string())
    }
}

impl From<RestError> for CliError {
    fn from(e: RestError) -> Self {
        match e {
            RestError::Store(inner) => Self::from(inner),
            other => Self::invalid_argument(other.to_string()),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_keeps_store_code_in_message() {
        let err = CliError::from(StoreError::bucket_not_found("users"));
        assert_eq!(err.code(), &CliErrorCode::StoreFailed);
        assert!(err.message().starts_with("PALLAS_BUCKET_NOT_FOUND"));
        assert!(err.to_string().starts_with("PALLAS_CLI_STORE_FAILED: "));
    }

    #[test]
    fn test_rest_parse_error_is_invalid_argument() {
        let err = CliError::from(RestError::InvalidQueryParam("bad".to_string()));
        assert_eq!(err.code(), &CliErrorCode::InvalidArgument);
    }
}
