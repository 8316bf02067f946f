//! # Per-Tricycle Exclusive Scopes
//!
//! One `tokio::sync::Mutex<()>` per tricycle id, held in a `DashMap`.
//! Entries are created on first use and never removed, so two callers
//! racing on a fresh id always end up contending on the same mutex.
//!
//! The guard is an `OwnedMutexGuard`: it is released when dropped, on every
//! exit path of the caller. A caller whose acquisition future is dropped
//! (request abandoned, timeout elapsed) never holds the scope.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tryshare_core::TricycleId;

use crate::error::RegistryError;

/// Guard for an acquired exclusive scope.
pub type ScopeGuard = OwnedMutexGuard<()>;

/// Lazily populated map from tricycle id to its mutex.
#[derive(Debug, Clone, Default)]
pub struct LockTable {
    locks: Arc<DashMap<TricycleId, Arc<Mutex<()>>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the scope for `id`, giving up after `timeout`.
    pub async fn acquire(
        &self,
        id: TricycleId,
        timeout: Duration,
    ) -> Result<ScopeGuard, RegistryError> {
        // Clone the Arc out so the DashMap shard lock is released before awaiting.
        let lock = Arc::clone(self.locks.entry(id).or_default().value());
        tokio::time::timeout(timeout, lock.lock_owned())
            .await
            .map_err(|_| RegistryError::LockTimeout { id, timeout })
    }

    /// Number of ids that have ever been locked.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
