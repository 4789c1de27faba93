//! HTTP Server Configuration
//!
//! Bind address, request timeout, filter operator and CORS settings.

use serde::{Deserialize, Serialize};

use super::parser::DEFAULT_EQUALITY_OPERATOR;

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 5100)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-request deadline in milliseconds (default: 30000)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Operator token accepted in filter keys (default: "eq")
    #[serde(default = "default_equality_operator")]
    pub equality_operator: String,

    /// CORS allowed origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5100
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_equality_operator() -> String {
    DEFAULT_EQUALITY_OPERATOR.to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_ms: default_request_timeout_ms(),
            equality_operator: default_equality_operator(),
            cors_origins: Vec::new(),
        }
    }
}

impl HttpConfig {
    /// Create a new config with specified port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
