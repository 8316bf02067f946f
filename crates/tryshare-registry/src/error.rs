//! # Registry Errors
//!
//! Two families, kept apart so callers can tell "this request is invalid"
//! from "the system is broken":
//!
//! - business outcomes: [`RegistryError::NotFound`],
//!   [`RegistryError::Booking`], [`RegistryError::Validation`];
//! - infrastructure faults: [`RegistryError::Store`],
//!   [`RegistryError::LockTimeout`].

use std::time::Duration;

use thiserror::Error;
use tryshare_core::{TricycleId, ValidationError};
use tryshare_state::BookingError;

/// Failure inside a [`TricycleStore`](crate::TricycleStore) implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backing store could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A fleet seed listed the same id twice.
    #[error("duplicate {0} in fleet seed")]
    DuplicateId(TricycleId),

    /// Fleet file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Fleet file is not a valid JSON array of tricycles.
    #[error("malformed fleet data: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Error returned by every registry operation.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// No tricycle with this id exists.
    #[error("{0} not found")]
    NotFound(TricycleId),

    /// The state machine rejected the transition.
    #[error(transparent)]
    Booking(#[from] BookingError),

    /// Input was rejected before reaching the state machine.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// The persistence layer failed.
    #[error("store failure: {0}")]
    Store(#[from] StoreError),

    /// The exclusive scope for this tricycle could not be acquired in time.
    #[error("timed out after {timeout:?} waiting for exclusive access to {id}")]
    LockTimeout {
        /// The tricycle whose scope was contended.
        id: TricycleId,
        /// The configured acquisition bound.
        timeout: Duration,
    },
}

impl RegistryError {
    /// Whether this error signals a broken system rather than a bad request.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Store(_) | Self::LockTimeout { .. })
    }
}
