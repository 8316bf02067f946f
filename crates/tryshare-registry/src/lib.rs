//! # tryshare-registry: Tricycle Registry
//!
//! The canonical set of tricycles and the serialization boundary for the
//! booking state machine.
//!
//! ## Components
//!
//! - [`TricycleStore`] (`store.rs`): the persistence boundary:
//!   `load`, `load_all(filter)`, `save`. [`InMemoryStore`] is the bundled
//!   implementation; anything speaking the trait can replace it.
//!
//! - [`LockTable`] (`locks.rs`): one async mutex per tricycle id, created
//!   lazily and never removed. Acquisition is bounded by a timeout.
//!
//! - [`TricycleRegistry`] (`registry.rs`): lookups plus
//!   [`TricycleRegistry::run_exclusive`], which runs a state machine
//!   operation against freshly loaded state under the tricycle's lock and
//!   persists the result.
//!
//! ## Ordering
//!
//! Transitions on the same id are totally ordered. Transitions on different
//! ids never wait on each other.

pub mod error;
pub mod locks;
pub mod registry;
pub mod store;

pub use error::{RegistryError, StoreError};
pub use locks::LockTable;
pub use registry::{RegistryConfig, TricycleRegistry};
pub use store::{load_fleet_file, InMemoryStore, StoreFuture, TricycleFilter, TricycleStore};
