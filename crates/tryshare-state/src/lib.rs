//! # tryshare-state: Booking State Machine
//!
//! Owns the transition rules of a single tricycle. Every operation here is
//! synchronous and side-effecting on the one [`Tricycle`] it is handed; the
//! caller (the registry) is responsible for running it under an exclusive
//! scope and persisting the result.
//!
//! ## States
//!
//! ```text
//!            request_booking
//!  AVAILABLE ───────────────▶ BOOKED
//!      ▲                        │
//!      └────────────────────────┘
//!         request_end_of_booking
//!
//!  danger_zone: false ◀──────▶ true   (orthogonal, idempotent signals)
//! ```
//!
//! - [`Tricycle::request_booking`] on a BOOKED tricycle fails with
//!   [`BookingError::NotAvailable`].
//! - [`Tricycle::request_end_of_booking`] on an AVAILABLE tricycle fails with
//!   [`BookingError::AlreadyAvailable`].
//! - Danger signals never fail and never touch availability or rating.
//!
//! ## Rating
//!
//! Both booking operations fold the submitted feedback into the stored
//! score through a [`RatingPolicy`]. The fold is a pure function of the
//! old score and the input.

pub mod rating;
pub mod tricycle;

pub use rating::RatingPolicy;
pub use tricycle::{
    Availability, BookingError, TransitionKind, Tricycle, TricycleTransitionRecord,
    HISTORY_LIMIT,
};
