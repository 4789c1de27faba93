//! Query builder and terminal operations
//!
//! Builder calls only record state. Each terminal operation opens exactly
//! one transaction and either commits it or rolls it back before returning.

use std::ops::ControlFlow;

use crate::document::{Document, Value, ID_FIELD};
use crate::observability::{log_event, Event};
use crate::store::{
    validate_bucket_name, ScanBucket, Store, StoreError, StoreResult, WriteTxn,
};

use super::cancel::CancelFlag;
use super::predicate::Filter;

/// A query bound to one bucket of a [`Store`]
#[derive(Debug, Clone)]
pub struct Query<'a> {
    store: &'a Store,
    bucket: String,
    filter: Filter,
    selected: Vec<String>,
    limit: Option<usize>,
    cancel: Option<CancelFlag>,
}

impl<'a> Query<'a> {
    pub(crate) fn new(store: &'a Store, bucket: &str) -> Self {
        Self {
            store,
            bucket: bucket.to_string(),
            filter: Filter::new(),
            selected: Vec::new(),
            limit: None,
            cancel: None,
        }
    }

    /// Adds equality predicates to the current predicate set
    pub fn equal<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.filter.and_equal(fields);
        self
    }

    /// Starts an alternative predicate set
    pub fn or_equal<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.filter.or_equal(fields);
        self
    }

    /// Appends fields to the projection; no selection returns whole records
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Caps the number of matched records
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_cancel(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn max_results(&self) -> Option<usize> {
        self.limit
    }

    /// Stores a new document and returns its identifier.
    ///
    /// Creates the bucket if needed. A caller-supplied `id` is discarded.
    pub fn insert(&self, document: Document) -> StoreResult<u64> {
        self.check_ready()?;

        if let Some(supplied) = document.get(ID_FIELD) {
            let supplied = supplied.to_string();
            log_event(
                Event::InsertIdDiscarded,
                &[("bucket", &self.bucket), ("supplied", &supplied)],
            );
        }
        let payload = self.store.encode(&self.bucket, &document)?;

        let txn = self.store.begin_write()?;
        let result: StoreResult<(u64, bool)> = (|| {
            let mut bucket = txn.create_bucket_if_absent(&self.bucket)?;
            let id = bucket.next_sequence()?;
            bucket.put(id, &payload)?;
            Ok((id, bucket.was_created()))
        })();
        let (id, created) = self.finish_write(txn, result)?;

        if created {
            log_event(
                Event::BucketCreated,
                &[("db", self.store.name()), ("bucket", &self.bucket)],
            );
        }
        let id_str = id.to_string();
        log_event(
            Event::DocumentInserted,
            &[("bucket", &self.bucket), ("id", &id_str)],
        );
        Ok(id)
    }

    /// Returns matching records in identifier order
    pub fn find(&self) -> StoreResult<Vec<Document>> {
        self.check_ready()?;
        self.filter.validate()?;

        let txn = self.store.begin_read()?;
        let bucket = txn
            .bucket(&self.bucket)?
            .ok_or_else(|| StoreError::bucket_not_found(&self.bucket))?;
        let matched = self.collect_matches(&bucket)?;

        let count = matched.len().to_string();
        log_event(
            Event::QueryExecuted,
            &[("bucket", &self.bucket), ("op", "find"), ("matched", &count)],
        );
        Ok(matched.into_iter().map(|doc| self.project(doc)).collect())
    }

    /// Counts matching records, honoring the limit
    pub fn count(&self) -> StoreResult<usize> {
        self.check_ready()?;
        self.filter.validate()?;

        let txn = self.store.begin_read()?;
        let bucket = txn
            .bucket(&self.bucket)?
            .ok_or_else(|| StoreError::bucket_not_found(&self.bucket))?;

        let mut count = 0usize;
        if self.limit != Some(0) {
            self.store.scan(&bucket, &self.bucket, |doc| {
                self.check_canceled()?;
                if self.filter.matches(&doc) {
                    count += 1;
                    if Some(count) == self.limit {
                        return Ok(ControlFlow::Break(()));
                    }
                }
                Ok(ControlFlow::Continue(()))
            })?;
        }

        let count_str = count.to_string();
        log_event(
            Event::QueryExecuted,
            &[("bucket", &self.bucket), ("op", "count"), ("matched", &count_str)],
        );
        Ok(count)
    }

    /// Overwrites fields of every matching record.
    ///
    /// Only fields already present in a record change; `id` never does.
    /// Returns the records as written.
    pub fn update(&self, changes: Document) -> StoreResult<Vec<Document>> {
        self.check_ready()?;
        self.filter.validate()?;

        let txn = self.store.begin_write()?;
        let result: StoreResult<Vec<Document>> = (|| {
            let mut bucket = txn
                .bucket(&self.bucket)?
                .ok_or_else(|| StoreError::bucket_not_found(&self.bucket))?;
            let mut matched = self.collect_matches(&bucket)?;

            for doc in matched.iter_mut() {
                self.check_canceled()?;
                apply_changes(doc, &changes);
                let id = doc.id().ok_or_else(|| {
                    StoreError::decoding(&self.bucket, None, "record lost its identifier")
                })?;
                let payload = self.store.encode(&self.bucket, doc)?;
                bucket.put(id, &payload)?;
            }
            Ok(matched)
        })();
        let updated = self.finish_write(txn, result)?;

        let count = updated.len().to_string();
        log_event(
            Event::DocumentsUpdated,
            &[("bucket", &self.bucket), ("count", &count)],
        );
        Ok(updated.into_iter().map(|doc| self.project(doc)).collect())
    }

    /// Removes every matching record and returns how many were removed
    pub fn delete(&self) -> StoreResult<usize> {
        self.check_ready()?;
        self.filter.validate()?;

        let txn = self.store.begin_write()?;
        let result: StoreResult<usize> = (|| {
            let mut bucket = txn
                .bucket(&self.bucket)?
                .ok_or_else(|| StoreError::bucket_not_found(&self.bucket))?;
            let matched = self.collect_matches(&bucket)?;

            let mut deleted = 0;
            for id in matched.iter().filter_map(Document::id) {
                self.check_canceled()?;
                if bucket.delete(id)? {
                    deleted += 1;
                }
            }
            Ok(deleted)
        })();
        let deleted = self.finish_write(txn, result)?;

        let count = deleted.to_string();
        log_event(
            Event::DocumentsDeleted,
            &[("bucket", &self.bucket), ("count", &count)],
        );
        Ok(deleted)
    }

    fn check_ready(&self) -> StoreResult<()> {
        validate_bucket_name(&self.bucket)?;
        self.check_canceled()
    }

    fn check_canceled(&self) -> StoreResult<()> {
        match &self.cancel {
            Some(flag) => flag.check(),
            None => Ok(()),
        }
    }

    /// Commits on success; otherwise rolls back and returns the failure
    fn finish_write<T>(&self, txn: WriteTxn, result: StoreResult<T>) -> StoreResult<T> {
        let value = match result.and_then(|v| self.check_canceled().map(|()| v)) {
            Ok(value) => value,
            Err(e) => return Err(self.store.rollback(txn, &self.bucket, e)),
        };
        txn.commit()?;
        Ok(value)
    }

    fn collect_matches<B: ScanBucket>(&self, bucket: &B) -> StoreResult<Vec<Document>> {
        let mut matched = Vec::new();
        if self.limit == Some(0) {
            return Ok(matched);
        }
        self.store.scan(bucket, &self.bucket, |doc| {
            self.check_canceled()?;
            if self.filter.matches(&doc) {
                matched.push(doc);
                if Some(matched.len()) == self.limit {
                    return Ok(ControlFlow::Break(()));
                }
            }
            Ok(ControlFlow::Continue(()))
        })?;
        Ok(matched)
    }

    fn project(&self, mut document: Document) -> Document {
        if self.selected.is_empty() {
            return document;
        }
        self.selected
            .iter()
            .filter_map(|field| document.remove(field).map(|v| (field.clone(), v)))
            .collect()
    }
}

fn apply_changes(document: &mut Document, changes: &Document) {
    for (field, value) in changes {
        if field == ID_FIELD {
            continue;
        }
        if let Some(slot) = document.get_mut(field) {
            *slot = value.clone();
        }
    }
}
