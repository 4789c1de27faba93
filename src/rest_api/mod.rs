//! # REST API
//!
//! HTTP surface over a [`Store`](crate::store::Store).
//!
//! ## Endpoints
//! - `POST   /api/v1/:bucket`  insert a JSON object, returns `{"id": n}`
//! - `GET    /api/v1/:bucket`  find, filtered by `eq.<field>=<value>`
//! - `PATCH  /api/v1/:bucket`  update matching documents
//! - `DELETE /api/v1/:bucket`  delete matching documents, returns `{"deleted": n}`
//! - `GET    /health`
//!
//! `select=a,b` and `limit=n` are accepted by the filtered endpoints.

mod config;
mod errors;
mod parser;
mod response;
mod server;

pub use config::HttpConfig;
pub use errors::{ErrorResponse, RestError, RestResult};
pub use parser::{coerce_value, FilterParams, DEFAULT_EQUALITY_OPERATOR};
pub use response::{DeleteResponse, HealthResponse, InsertResponse};
pub use server::{ApiServer, ApiState};
