//! # tryshare-core: Foundational Types for the TryShare Fleet
//!
//! Leaf crate of the workspace. Defines the primitives every other crate
//! builds on:
//!
//! - [`TricycleId`]: the integer identity of a fleet vehicle. Never reused.
//! - [`Rating`]: a score in `[0.0, 5.0]`, validated at construction. Raw
//!   `f64` values never reach the state machine.
//! - [`Timestamp`]: UTC, seconds precision, used in transition logs.
//! - [`ValidationError`]: rejected input, reported before any state changes.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `tryshare-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod rating;
pub mod temporal;

pub use error::ValidationError;
pub use identity::TricycleId;
pub use rating::{Rating, MAX_RATING, MIN_RATING};
pub use temporal::Timestamp;
