//! Cooperative cancellation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::store::{StoreError, StoreResult};

/// Shared flag checked by running queries.
///
/// Clones share the same flag. Once set it stays set.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    canceled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }

    /// Fails with `Canceled` once the flag is set
    pub fn check(&self) -> StoreResult<()> {
        if self.is_canceled() {
            Err(StoreError::canceled())
        } else {
            Ok(())
        }
    }
}
