//! Document storage on an embedded transactional key-value engine
//!
//! One backing file per [`Store`]. Each bucket is an ordered table keyed by
//! the big-endian encoding of the document identifier; a catalog table holds
//! every bucket's sequence counter.
//!
//! Guarantees:
//! - identifiers within a bucket start at 1, strictly increase and are never
//!   reused, including across reopen and after deletes
//! - every operation runs in exactly one transaction and is all-or-nothing
//! - reads use read-only transactions and never block other readers

mod engine;
mod errors;
mod keys;
mod options;
mod store;

pub(crate) use engine::{ScanBucket, WriteTxn};
pub use errors::{StoreError, StoreErrorCode, StoreResult};
pub use keys::{decode_id, encode_id, KEY_LEN};
pub use options::{StoreOptions, DEFAULT_DB_NAME, DEFAULT_EXTENSION};
pub(crate) use store::validate_bucket_name;
pub use store::Store;
