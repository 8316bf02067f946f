//! # Tricycle Lifecycle
//!
//! A tricycle is either AVAILABLE or BOOKED. The danger-zone flag sits on
//! top of either state and is driven only by the two danger signals.
//!
//! Fields are private: availability can only change through
//! [`Tricycle::request_booking`] / [`Tricycle::request_end_of_booking`],
//! the danger flag only through the two signal methods, and the rating only
//! as part of a booking operation.
//!
//! Each tricycle keeps a running transition count and only the most recent
//! [`HISTORY_LIMIT`] transition records, so its size stays constant however
//! long it is in service.

use std::collections::VecDeque;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use tryshare_core::{Rating, Timestamp, TricycleId};

use crate::rating::RatingPolicy;

// ─── Availability ────────────────────────────────────────────────────

/// Whether a tricycle can currently be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Availability {
    /// Free to be booked.
    Available,
    /// Held by a rider until the booking is ended.
    Booked,
}

impl Availability {
    /// Return the string representation of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Booked => "BOOKED",
        }
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// A booking operation was rejected by the transition rules.
///
/// State is left untouched whenever one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Booking requested on a tricycle that is already booked.
    #[error("{id} is not available: it is already booked")]
    NotAvailable {
        /// The tricycle that was requested.
        id: TricycleId,
    },

    /// End of booking requested on a tricycle that is not booked.
    #[error("{id} is already available: there is no booking to end")]
    AlreadyAvailable {
        /// The tricycle that was requested.
        id: TricycleId,
    },
}

// ─── Transition log ──────────────────────────────────────────────────

/// What kind of transition was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionKind {
    BookingStarted,
    BookingEnded,
    DangerZoneEntered,
    DangerZoneLeft,
}

/// Record of one applied transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TricycleTransitionRecord {
    pub kind: TransitionKind,
    /// Availability before the transition.
    pub from: Availability,
    /// Availability after the transition.
    pub to: Availability,
    /// Danger flag after the transition.
    pub danger_zone: bool,
    /// Rating after the transition.
    pub rating: Rating,
    pub timestamp: Timestamp,
}

// ─── Tricycle ────────────────────────────────────────────────────────

/// Number of transition records retained per tricycle.
pub const HISTORY_LIMIT: usize = 16;

/// Keep only the newest [`HISTORY_LIMIT`] records of a stored history.
fn bounded_history<'de, D>(
    deserializer: D,
) -> Result<VecDeque<TricycleTransitionRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut history = VecDeque::<TricycleTransitionRecord>::deserialize(deserializer)?;
    let excess = history.len().saturating_sub(HISTORY_LIMIT);
    history.drain(..excess);
    Ok(history)
}

/// A fleet tricycle with its lifecycle state and transition history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tricycle {
    id: TricycleId,
    availability: Availability,
    #[serde(default)]
    danger_zone: bool,
    rating: Rating,
    #[serde(default)]
    transition_count: u64,
    #[serde(default, deserialize_with = "bounded_history")]
    transitions: VecDeque<TricycleTransitionRecord>,
}

impl Tricycle {
    /// A freshly provisioned tricycle: available, outside any danger zone.
    pub fn new(id: TricycleId, rating: Rating) -> Self {
        Self::from_parts(id, Availability::Available, false, rating)
    }

    /// Rebuild a tricycle from stored state, with an empty transition log.
    ///
    /// Intended for provisioning and store rehydration only; it does not go
    /// through the transition rules.
    pub fn from_parts(
        id: TricycleId,
        availability: Availability,
        danger_zone: bool,
        rating: Rating,
    ) -> Self {
        Self {
            id,
            availability,
            danger_zone,
            rating,
            transition_count: 0,
            transitions: VecDeque::new(),
        }
    }

    /// Copy of the current state without the retained transition records.
    pub fn snapshot(&self) -> Self {
        Self {
            transition_count: self.transition_count,
            ..Self::from_parts(self.id, self.availability, self.danger_zone, self.rating)
        }
    }

    pub fn id(&self) -> TricycleId {
        self.id
    }

    pub fn availability(&self) -> Availability {
        self.availability
    }

    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }

    pub fn danger_zone(&self) -> bool {
        self.danger_zone
    }

    pub fn rating(&self) -> Rating {
        self.rating
    }

    /// Most recent transitions, oldest first. At most [`HISTORY_LIMIT`].
    pub fn transitions(&self) -> &VecDeque<TricycleTransitionRecord> {
        &self.transitions
    }

    /// Transitions applied since the tricycle was provisioned.
    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    /// Book the tricycle (AVAILABLE → BOOKED) and fold `feedback` into the rating.
    pub fn request_booking(
        &mut self,
        feedback: Rating,
        policy: &RatingPolicy,
    ) -> Result<(), BookingError> {
        if self.availability != Availability::Available {
            return Err(BookingError::NotAvailable { id: self.id });
        }
        self.rating = policy.fold(self.rating, feedback);
        self.do_transition(TransitionKind::BookingStarted, Availability::Booked);
        Ok(())
    }

    /// End the booking (BOOKED → AVAILABLE) and fold `feedback` into the rating.
    pub fn request_end_of_booking(
        &mut self,
        feedback: Rating,
        policy: &RatingPolicy,
    ) -> Result<(), BookingError> {
        if self.availability != Availability::Booked {
            return Err(BookingError::AlreadyAvailable { id: self.id });
        }
        self.rating = policy.fold(self.rating, feedback);
        self.do_transition(TransitionKind::BookingEnded, Availability::Available);
        Ok(())
    }

    /// Raise the danger flag. Repeating the signal is a no-op.
    pub fn signal_entering_danger_zone(&mut self) {
        if !self.danger_zone {
            self.danger_zone = true;
            self.do_transition(TransitionKind::DangerZoneEntered, self.availability);
        }
    }

    /// Clear the danger flag. Repeating the signal is a no-op.
    pub fn signal_leaving_danger_zone(&mut self) {
        if self.danger_zone {
            self.danger_zone = false;
            self.do_transition(TransitionKind::DangerZoneLeft, self.availability);
        }
    }

    fn do_transition(&mut self, kind: TransitionKind, to: Availability) {
        if self.transitions.len() == HISTORY_LIMIT {
            self.transitions.pop_front();
        }
        self.transitions.push_back(TricycleTransitionRecord {
            kind,
            from: self.availability,
            to,
            danger_zone: self.danger_zone,
            rating: self.rating,
            timestamp: Timestamp::now(),
        });
        self.transition_count += 1;
        self.availability = to;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
