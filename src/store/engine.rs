//! Transactional bucket access on top of redb.
//!
//! Each bucket is one redb table named `bucket:<name>`. A catalog table maps
//! every bucket name to the last identifier issued in it; a bucket exists iff
//! it has a catalog entry. Sequence numbers are bumped inside the caller's
//! write transaction, so they are linearized by redb's single writer.

use std::fmt;
use std::ops::ControlFlow;
use std::path::Path;

use redb::{
    Database, ReadOnlyTable, ReadTransaction, ReadableTable, Table, TableDefinition, TableError,
    WriteTransaction,
};

use super::errors::{StoreError, StoreResult};
use super::keys::{decode_id, encode_id};

type BucketDefinition<'a> = TableDefinition<'a, &'static [u8], &'static [u8]>;

/// Catalog: bucket name -> last issued identifier
const CATALOG: TableDefinition<'static, &'static str, u64> = TableDefinition::new("pallas_catalog");

const BUCKET_TABLE_PREFIX: &str = "bucket:";

fn bucket_table_name(bucket: &str) -> String {
    format!("{}{}", BUCKET_TABLE_PREFIX, bucket)
}

fn engine_error<E: fmt::Display>(context: &'static str) -> impl FnOnce(E) -> StoreError {
    move |e| StoreError::transaction(context, e)
}

/// Handle to one open redb database file
pub(crate) struct Engine {
    db: Database,
}

impl Engine {
    /// Opens or creates the database file and makes sure the catalog exists.
    pub(crate) fn open(path: &Path) -> StoreResult<Self> {
        let db = Database::create(path).map_err(|e| StoreError::open_failed(path, e))?;
        let engine = Self { db };

        let txn = engine.begin_write()?;
        let init = txn
            .txn
            .open_table(CATALOG)
            .map(drop)
            .map_err(engine_error("cannot create bucket catalog"));
        match init {
            Ok(()) => txn.commit()?,
            Err(e) => {
                let _ = txn.rollback();
                return Err(e);
            }
        }

        Ok(engine)
    }

    pub(crate) fn begin_read(&self) -> StoreResult<ReadTxn> {
        let txn = self
            .db
            .begin_read()
            .map_err(engine_error("cannot begin read transaction"))?;
        Ok(ReadTxn { txn })
    }

    /// Blocks until no other write transaction is open.
    pub(crate) fn begin_write(&self) -> StoreResult<WriteTxn> {
        let txn = self
            .db
            .begin_write()
            .map_err(engine_error("cannot begin write transaction"))?;
        Ok(WriteTxn { txn })
    }
}

/// Ordered iteration over the records of one bucket
pub(crate) trait ScanBucket {
    /// Visits every record in key order until `visit` breaks or fails.
    fn for_each<F>(&self, visit: F) -> StoreResult<()>
    where
        F: FnMut(u64, &[u8]) -> StoreResult<ControlFlow<()>>;
}

fn scan_table<T, F>(bucket: &str, table: &T, mut visit: F) -> StoreResult<()>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
    F: FnMut(u64, &[u8]) -> StoreResult<ControlFlow<()>>,
{
    for entry in table.iter().map_err(engine_error("cannot scan bucket"))? {
        let (key, value) = entry.map_err(engine_error("cannot read record"))?;
        let id = decode_id(bucket, key.value())?;
        if visit(id, value.value())?.is_break() {
            break;
        }
    }
    Ok(())
}

/// Read-only transaction; any number may be open alongside one writer
pub(crate) struct ReadTxn {
    txn: ReadTransaction,
}

impl ReadTxn {
    /// Returns the bucket, or `None` if it was never created
    pub(crate) fn bucket(&self, name: &str) -> StoreResult<Option<ReadBucket>> {
        let catalog = match self.txn.open_table(CATALOG) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(StoreError::transaction("cannot open bucket catalog", e)),
        };
        if catalog
            .get(name)
            .map_err(engine_error("cannot read bucket catalog"))?
            .is_none()
        {
            return Ok(None);
        }

        let table_name = bucket_table_name(name);
        match self.txn.open_table(BucketDefinition::new(&table_name)) {
            Ok(table) => Ok(Some(ReadBucket {
                name: name.to_string(),
                table,
            })),
            Err(TableError::TableDoesNotExist(_)) => Ok(None),
            Err(e) => Err(StoreError::transaction("cannot open bucket", e)),
        }
    }

    /// Lists bucket names in name order
    pub(crate) fn bucket_names(&self) -> StoreResult<Vec<String>> {
        let catalog = match self.txn.open_table(CATALOG) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::transaction("cannot open bucket catalog", e)),
        };
        let mut names = Vec::new();
        for entry in catalog
            .iter()
            .map_err(engine_error("cannot scan bucket catalog"))?
        {
            let (name, _) = entry.map_err(engine_error("cannot read bucket catalog"))?;
            names.push(name.value().to_string());
        }
        Ok(names)
    }
}

/// A bucket opened inside a read-only transaction
pub(crate) struct ReadBucket {
    name: String,
    table: ReadOnlyTable<&'static [u8], &'static [u8]>,
}

impl ScanBucket for ReadBucket {
    fn for_each<F>(&self, visit: F) -> StoreResult<()>
    where
        F: FnMut(u64, &[u8]) -> StoreResult<ControlFlow<()>>,
    {
        scan_table(&self.name, &self.table, visit)
    }
}

/// Write transaction. Dropping it without `commit` discards every change.
pub(crate) struct WriteTxn {
    txn: WriteTransaction,
}

impl WriteTxn {
    /// Returns the bucket, or `None` if it was never created
    pub(crate) fn bucket(&self, name: &str) -> StoreResult<Option<WriteBucket<'_>>> {
        let exists = {
            let catalog = self
                .txn
                .open_table(CATALOG)
                .map_err(engine_error("cannot open bucket catalog"))?;
            let found = catalog
                .get(name)
                .map_err(engine_error("cannot read bucket catalog"))?
                .is_some();
            found
        };
        if !exists {
            return Ok(None);
        }
        self.open_bucket(name, false).map(Some)
    }

    /// Returns the bucket, creating an empty one first if needed
    pub(crate) fn create_bucket_if_absent(&self, name: &str) -> StoreResult<WriteBucket<'_>> {
        let created = {
            let mut catalog = self
                .txn
                .open_table(CATALOG)
                .map_err(engine_error("cannot open bucket catalog"))?;
            let exists = catalog
                .get(name)
                .map_err(engine_error("cannot read bucket catalog"))?
                .is_some();
            if !exists {
                catalog
                    .insert(name, 0u64)
                    .map_err(engine_error("cannot register bucket"))?;
            }
            !exists
        };
        self.open_bucket(name, created)
    }

    fn open_bucket(&self, name: &str, created: bool) -> StoreResult<WriteBucket<'_>> {
        let table_name = bucket_table_name(name);
        let table = self
            .txn
            .open_table(BucketDefinition::new(&table_name))
            .map_err(engine_error("cannot open bucket"))?;
        Ok(WriteBucket {
            name: name.to_string(),
            txn: &self.txn,
            table,
            created,
        })
    }

    pub(crate) fn commit(self) -> StoreResult<()> {
        self.txn
            .commit()
            .map_err(engine_error("cannot commit transaction"))
    }

    /// Aborts the transaction; nothing written through it becomes visible.
    pub(crate) fn rollback(self) -> StoreResult<()> {
        self.txn
            .abort()
            .map_err(engine_error("cannot abort transaction"))
    }
}

/// A bucket opened inside a write transaction
pub(crate) struct WriteBucket<'txn> {
    name: String,
    txn: &'txn WriteTransaction,
    table: Table<'txn, &'static [u8], &'static [u8]>,
    created: bool,
}

impl WriteBucket<'_> {
    /// True if this transaction created the bucket
    pub(crate) fn was_created(&self) -> bool {
        self.created
    }

    /// Issues the next identifier for this bucket.
    ///
    /// Starts at 1 and never repeats, including after deletes.
    pub(crate) fn next_sequence(&mut self) -> StoreResult<u64> {
        let mut catalog = self
            .txn
            .open_table(CATALOG)
            .map_err(engine_error("cannot open bucket catalog"))?;
        let current = catalog
            .get(self.name.as_str())
            .map_err(engine_error("cannot read bucket sequence"))?
            .map(|guard| guard.value())
            .unwrap_or(0);
        let next = current.checked_add(1).ok_or_else(|| {
            StoreError::transaction("cannot issue identifier", "bucket sequence exhausted")
                .with_details(format!("bucket: {}", self.name))
        })?;
        catalog
            .insert(self.name.as_str(), next)
            .map_err(engine_error("cannot advance bucket sequence"))?;
        Ok(next)
    }

    pub(crate) fn put(&mut self, id: u64, payload: &[u8]) -> StoreResult<()> {
        let key = encode_id(id);
        self.table
            .insert(&key[..], payload)
            .map_err(engine_error("cannot write record"))?;
        Ok(())
    }

    /// Removes a record, returning whether it existed
    pub(crate) fn delete(&mut self, id: u64) -> StoreResult<bool> {
        let key = encode_id(id);
        let existed = self
            .table
            .remove(&key[..])
            .map_err(engine_error("cannot delete record"))?
            .is_some();
        Ok(existed)
    }
}

impl ScanBucket for WriteBucket<'_> {
    fn for_each<F>(&self, visit: F) -> StoreResult<()>
    where
        F: FnMut(u64, &[u8]) -> StoreResult<ControlFlow<()>>,
    {
        scan_table(&self.name, &self.table, visit)
    }
}
