//! Atomicity and Failure Tests
//!
//! Covers:
//! - an encode failure part way through an update leaves every record as it was
//! - failed inserts consume no identifier
//! - cancellation aborts without writing
//! - undecodable records fail the whole read
//! - concurrent inserts never share an identifier

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use pallas::codec::{CodecError, CodecResult};
use pallas::{
    CancelFlag, Document, DocumentDecoder, DocumentEncoder, JsonCodec, Store, StoreErrorCode,
    StoreOptions, Value,
};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

/// JSON codec whose encoder starts failing after a fixed number of calls
struct FlakyCodec {
    remaining: AtomicUsize,
}

impl FlakyCodec {
    fn failing_after(calls: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(calls),
        }
    }
}

impl DocumentEncoder for FlakyCodec {
    fn encode(&self, document: &Document) -> CodecResult<Vec<u8>> {
        let left = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match left {
            Ok(_) => JsonCodec.encode(document),
            Err(_) => Err(CodecError::encode("encoder exhausted")),
        }
    }
}

impl DocumentDecoder for FlakyCodec {
    fn decode(&self, bytes: &[u8]) -> CodecResult<Document> {
        JsonCodec.decode(bytes)
    }
}

struct RejectingDecoder;

impl DocumentDecoder for RejectingDecoder {
    fn decode(&self, _bytes: &[u8]) -> CodecResult<Document> {
        Err(CodecError::decode("unsupported payload"))
    }
}

fn options(dir: &TempDir) -> StoreOptions {
    StoreOptions::new()
        .with_data_dir(dir.path())
        .with_db_name("atomicity")
}

fn person(name: &str, age: i64) -> Document {
    Document::new().with("name", name).with("age", age)
}

// =============================================================================
// Update Atomicity
// =============================================================================

#[test]
fn test_encode_failure_mid_update_changes_nothing() {
    let dir = TempDir::new().unwrap();
    // three inserts + one successful update encode
    let store = Store::open(options(&dir).with_codec(FlakyCodec::failing_after(4))).unwrap();
    for name in ["Foo", "Bar", "Baz"] {
        store.bucket("users").insert(person(name, 10)).unwrap();
    }

    let err = store
        .bucket("users")
        .update(Document::new().with("age", 99))
        .unwrap_err();
    assert_eq!(err.code(), StoreErrorCode::Encoding);

    let records = store.bucket("users").find().unwrap();
    assert_eq!(records.len(), 3);
    for doc in records {
        assert_eq!(doc.get("age"), Some(&Value::Int(10)));
    }
}

#[test]
fn test_failed_insert_consumes_no_id() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(options(&dir)).unwrap();

    let err = store
        .bucket("users")
        .insert(Document::new().with("score", f64::NAN))
        .unwrap_err();
    assert_eq!(err.code(), StoreErrorCode::Encoding);
    assert!(store.bucket_names().unwrap().is_empty());

    assert_eq!(store.bucket("users").insert(person("Foo", 1)).unwrap(), 1);
}

// =============================================================================
// Cancellation
// =============================================================================

#[test]
fn test_canceled_operations_write_nothing() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(options(&dir)).unwrap();
    for name in ["Foo", "Bar"] {
        store.bucket("users").insert(person(name, 10)).unwrap();
    }

    let flag = CancelFlag::new();
    flag.cancel();

    let err = store
        .bucket("users")
        .with_cancel(flag.clone())
        .delete()
        .unwrap_err();
    assert_eq!(err.code(), StoreErrorCode::Canceled);

    let err = store
        .bucket("users")
        .with_cancel(flag.clone())
        .update(Document::new().with("age", 1))
        .unwrap_err();
    assert_eq!(err.code(), StoreErrorCode::Canceled);

    let err = store
        .bucket("users")
        .with_cancel(flag)
        .find()
        .unwrap_err();
    assert_eq!(err.code(), StoreErrorCode::Canceled);

    let records = store.bucket("users").find().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|d| d.get("age") == Some(&Value::Int(10))));
    assert_eq!(store.bucket("users").insert(person("Baz", 1)).unwrap(), 3);
}

// =============================================================================
// Decoding
// =============================================================================

#[test]
fn test_undecodable_record_fails_read() {
    let dir = TempDir::new().unwrap();
    {
        let store = Store::open(options(&dir)).unwrap();
        store.bucket("users").insert(person("Foo", 1)).unwrap();
    }

    let store = Store::open(options(&dir).with_decoder(Arc::new(RejectingDecoder))).unwrap();
    let err = store.bucket("users").find().unwrap_err();
    assert_eq!(err.code(), StoreErrorCode::Decoding);
    assert_eq!(err.details(), Some("bucket: users, id: 1"));
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_inserts_get_distinct_ids() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(Store::open(options(&dir)).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                (0..25)
                    .map(|i| store.bucket("items").insert(person("x", t * 100 + i)).unwrap())
                    .collect::<Vec<u64>>()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(ids.insert(id), "id {} issued twice", id);
        }
    }
    assert_eq!(ids.len(), 100);
    assert_eq!(ids.iter().max(), Some(&100));
}
