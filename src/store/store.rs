//! Store handle
//!
//! A `Store` owns one backing database file and the codec used for every
//! bucket in it. It is `Send + Sync`; share it behind an `Arc`.

use std::fmt;
use std::fs;
use std::io;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use crate::codec::DocumentEncoder;
use crate::document::{Document, Value, ID_FIELD};
use crate::observability::{log_event, Event};
use crate::query::Query;

use super::engine::{Engine, ReadTxn, ScanBucket, WriteTxn};
use super::errors::{StoreError, StoreResult};
use super::options::{validate_name, StoreOptions};

pub struct Store {
    engine: Engine,
    options: StoreOptions,
    path: PathBuf,
}

impl Store {
    /// Opens the backing file, creating it and its directory if needed.
    pub fn open(options: StoreOptions) -> StoreResult<Self> {
        options.validate()?;

        let data_dir = options.data_dir();
        if !data_dir.as_os_str().is_empty() {
            fs::create_dir_all(data_dir).map_err(|e| {
                StoreError::io("cannot create data directory", e)
                    .with_details(format!("path: {}", data_dir.display()))
            })?;
        }

        let path = options.database_path();
        let engine = Engine::open(&path)?;

        let path_str = path.display().to_string();
        log_event(
            Event::StoreOpened,
            &[("db", options.db_name()), ("path", &path_str)],
        );

        Ok(Self {
            engine,
            options,
            path,
        })
    }

    /// Opens a store at `<data_dir>/<db_name>.pallas` with the JSON codec
    pub fn open_in(data_dir: impl Into<PathBuf>, db_name: &str) -> StoreResult<Self> {
        Self::open(
            StoreOptions::new()
                .with_data_dir(data_dir)
                .with_db_name(db_name),
        )
    }

    /// Starts a query against one bucket. The bucket is not checked here.
    pub fn bucket(&self, name: &str) -> Query<'_> {
        Query::new(self, name)
    }

    /// Creates an empty bucket. Existing buckets are left untouched.
    pub fn create_bucket(&self, name: &str) -> StoreResult<()> {
        validate_bucket_name(name)?;
        let txn = self.engine.begin_write()?;
        let result = txn
            .create_bucket_if_absent(name)
            .map(|bucket| bucket.was_created());
        let created = match result {
            Ok(created) => created,
            Err(e) => return Err(self.rollback(txn, name, e)),
        };
        txn.commit()?;

        if created {
            log_event(
                Event::BucketCreated,
                &[("db", self.name()), ("bucket", name)],
            );
        }
        Ok(())
    }

    /// Lists bucket names in name order
    pub fn bucket_names(&self) -> StoreResult<Vec<String>> {
        self.engine.begin_read()?.bucket_names()
    }

    /// Removes the backing file of the named database in this store's
    /// directory. A missing file is not an error.
    pub fn drop_database(&self, name: &str) -> StoreResult<()> {
        validate_name("database name", name)?;
        remove_database_file(&self.options.path_for(name), name)
    }

    /// Closes this store and removes its backing file
    pub fn destroy(self) -> StoreResult<()> {
        let path = self.path.clone();
        let name = self.options.db_name().to_string();
        drop(self);
        remove_database_file(&path, &name)
    }

    pub fn name(&self) -> &str {
        self.options.db_name()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub(crate) fn begin_read(&self) -> StoreResult<ReadTxn> {
        self.engine.begin_read()
    }

    pub(crate) fn begin_write(&self) -> StoreResult<WriteTxn> {
        self.engine.begin_write()
    }

    /// Aborts `txn` and hands back the error that caused it
    pub(crate) fn rollback(&self, txn: WriteTxn, bucket: &str, cause: StoreError) -> StoreError {
        let reason = cause.code().code();
        if let Err(e) = txn.rollback() {
            let abort_error = e.to_string();
            log_event(
                Event::TransactionRolledBack,
                &[
                    ("bucket", bucket),
                    ("reason", reason),
                    ("abort_error", &abort_error),
                ],
            );
        } else {
            log_event(
                Event::TransactionRolledBack,
                &[("bucket", bucket), ("reason", reason)],
            );
        }
        cause
    }

    /// Encodes a document for storage. The identifier is carried by the key.
    pub(crate) fn encode(&self, bucket: &str, document: &Document) -> StoreResult<Vec<u8>> {
        let encoder: &dyn DocumentEncoder = self.options.encoder();
        if document.contains_field(ID_FIELD) {
            let mut stripped = document.clone();
            stripped.remove(ID_FIELD);
            return encoder
                .encode(&stripped)
                .map_err(|e| StoreError::encoding(bucket, e));
        }
        encoder
            .encode(document)
            .map_err(|e| StoreError::encoding(bucket, e))
    }

    /// Decodes a stored record and reattaches its identifier
    pub(crate) fn decode(&self, bucket: &str, id: u64, payload: &[u8]) -> StoreResult<Document> {
        let mut document = self
            .options
            .decoder()
            .decode(payload)
            .map_err(|e| StoreError::decoding(bucket, Some(id), e.reason()))?;
        document.insert(ID_FIELD, Value::Uint(id));
        Ok(document)
    }

    /// Decodes every record of a bucket in key order until `visit` breaks
    pub(crate) fn scan<B, F>(&self, bucket: &B, name: &str, mut visit: F) -> StoreResult<()>
    where
        B: ScanBucket,
        F: FnMut(Document) -> StoreResult<ControlFlow<()>>,
    {
        bucket.for_each(|id, payload| {
            let document = self.decode(name, id, payload)?;
            visit(document)
        })
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.name())
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        log_event(Event::StoreClosed, &[("db", self.options.db_name())]);
    }
}

pub(crate) fn validate_bucket_name(name: &str) -> StoreResult<()> {
    if name.is_empty() {
        return Err(StoreError::invalid_query("bucket name must not be empty"));
    }
    Ok(())
}

fn remove_database_file(path: &Path, name: &str) -> StoreResult<()> {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(StoreError::io("cannot remove database file", e)
                .with_details(format!("path: {}", path.display())))
        }
    }
    let path_str = path.display().to_string();
    log_event(Event::StoreDropped, &[("db", name), ("path", &path_str)]);
    Ok(())
}
