//! # Response Formatting
//!
//! Response bodies for the REST API.

use serde::Serialize;

/// Insert response carrying the assigned identifier
#[derive(Debug, Clone, Serialize)]
pub struct InsertResponse {
    pub id: u64,
}

impl InsertResponse {
    pub fn new(id: u64) -> Self {
        Self { id }
    }
}

/// Delete response
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub deleted: usize,
}

impl DeleteResponse {
    pub fn new(deleted: usize) -> Self {
        Self { deleted }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}
