//! # Store Boundary
//!
//! [`TricycleStore`] is the narrow persistence interface the registry
//! depends on. It returns boxed futures so the registry can hold an
//! `Arc<dyn TricycleStore>` and swap backends without becoming generic.
//!
//! [`InMemoryStore`] keeps tricycles in a `parking_lot::RwLock<HashMap>`.
//! The lock is never held across an `.await`; each call completes
//! synchronously and hands back a ready future.

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use parking_lot::RwLock;
use tryshare_core::TricycleId;
use tryshare_state::{Availability, Tricycle};

use crate::error::StoreError;

/// Boxed, `Send` future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Selection criteria for [`TricycleStore::load_all`].
///
/// `None` fields match anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TricycleFilter {
    pub availability: Option<Availability>,
    pub danger_zone: Option<bool>,
}

impl TricycleFilter {
    /// Match every tricycle.
    pub fn all() -> Self {
        Self::default()
    }

    /// Match tricycles that can currently be booked.
    pub fn available() -> Self {
        Self {
            availability: Some(Availability::Available),
            danger_zone: None,
        }
    }

    pub fn matches(&self, tricycle: &Tricycle) -> bool {
        self.availability
            .map_or(true, |a| tricycle.availability() == a)
            && self.danger_zone.map_or(true, |d| tricycle.danger_zone() == d)
    }
}

/// Persistence interface used by the registry.
pub trait TricycleStore: Send + Sync {
    /// Fetch one tricycle. `Ok(None)` when the id is unknown.
    fn load(&self, id: TricycleId) -> StoreFuture<'_, Option<Tricycle>>;

    /// Fetch every tricycle matching `filter`, ordered by id.
    fn load_all(&self, filter: TricycleFilter) -> StoreFuture<'_, Vec<Tricycle>>;

    /// Insert or replace a tricycle.
    fn save<'a>(&'a self, tricycle: &'a Tricycle) -> StoreFuture<'a, ()>;
}

/// Thread-safe, cloneable in-memory store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    data: Arc<RwLock<HashMap<TricycleId, Tricycle>>>,
}

impl InMemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `fleet`. Duplicate ids are rejected.
    pub fn with_fleet(fleet: Vec<Tricycle>) -> Result<Self, StoreError> {
        let mut data = HashMap::with_capacity(fleet.len());
        for tricycle in fleet {
            let id = tricycle.id();
            if data.insert(id, tricycle).is_some() {
                return Err(StoreError::DuplicateId(id));
            }
        }
        Ok(Self {
            data: Arc::new(RwLock::new(data)),
        })
    }

    /// Number of stored tricycles.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TricycleStore for InMemoryStore {
    fn load(&self, id: TricycleId) -> StoreFuture<'_, Option<Tricycle>> {
        let found = self.data.read().get(&id).cloned();
        Box::pin(std::future::ready(Ok(found)))
    }

    fn load_all(&self, filter: TricycleFilter) -> StoreFuture<'_, Vec<Tricycle>> {
        let mut matching: Vec<Tricycle> = self
            .data
            .read()
            .values()
            .filter(|t| filter.matches(t))
            .map(Tricycle::snapshot)
            .collect();
        matching.sort_by_key(|t| t.id());
        Box::pin(std::future::ready(Ok(matching)))
    }

    fn save<'a>(&'a self, tricycle: &'a Tricycle) -> StoreFuture<'a, ()> {
        self.data.write().insert(tricycle.id(), tricycle.clone());
        Box::pin(std::future::ready(Ok(())))
    }
}

/// Read a fleet seed: a JSON array of tricycles.
pub fn load_fleet_file(path: impl AsRef<Path>) -> Result<Vec<Tricycle>, StoreError> {
    let raw = std::fs::read_to_string(path)?;
    let fleet: Vec<Tricycle> = serde_json::from_str(&raw)?;
    Ok(fleet)
}
