//! pallas - a document store on an embedded transactional key-value engine
//!
//! Buckets of JSON-like documents with auto-increment identifiers, equality
//! filters, projection and limits, served in-process or over HTTP.
//!
//! ```ignore
//! use pallas::{Document, Store, StoreOptions};
//!
//! let store = Store::open(StoreOptions::new().with_data_dir("data"))?;
//! let id = store.bucket("users").insert(Document::new().with("name", "Foo"))?;
//! let found = store.bucket("users").equal([("id", id)]).find()?;
//! ```

pub mod cli;
pub mod codec;
pub mod document;
pub mod observability;
pub mod query;
pub mod rest_api;
pub mod store;

pub use codec::{DocumentDecoder, DocumentEncoder, JsonCodec};
pub use document::{Document, Value, ID_FIELD};
pub use query::{CancelFlag, Query};
pub use store::{Store, StoreError, StoreErrorCode, StoreOptions, StoreResult};
