//! # Tricycle Registry
//!
//! Lookups and exclusive transitions over a [`TricycleStore`].
//!
//! [`TricycleRegistry::run_exclusive`] is the only path that mutates a
//! tricycle:
//!
//! 1. acquire the tricycle's scope (bounded by `lock_timeout`);
//! 2. load the current state from the store;
//! 3. run the state machine operation against it;
//! 4. on success, save the result;
//! 5. release the scope (guard drop, on every exit path).
//!
//! Loading inside the scope means two concurrent bookings can never both
//! observe AVAILABLE.

use std::sync::Arc;
use std::time::Duration;

use tryshare_core::{Rating, TricycleId};
use tryshare_state::{BookingError, RatingPolicy, Tricycle};

use crate::error::RegistryError;
use crate::locks::LockTable;
use crate::store::{TricycleFilter, TricycleStore};

/// Registry tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegistryConfig {
    /// Upper bound on waiting for a tricycle's exclusive scope.
    pub lock_timeout: Duration,
    /// Aggregation rule applied by both booking operations.
    pub rating_policy: RatingPolicy,
}

impl RegistryConfig {
    pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Self::DEFAULT_LOCK_TIMEOUT,
            rating_policy: RatingPolicy::default(),
        }
    }
}

/// Authoritative access point for tricycles. Cheap to clone.
#[derive(Clone)]
pub struct TricycleRegistry {
    store: Arc<dyn TricycleStore>,
    locks: LockTable,
    config: RegistryConfig,
}

impl std::fmt::Debug for TricycleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TricycleRegistry")
            .field("locks", &self.locks.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TricycleRegistry {
    pub fn new(store: Arc<dyn TricycleStore>, config: RegistryConfig) -> Self {
        Self {
            store,
            locks: LockTable::new(),
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Snapshot of every AVAILABLE tricycle, ordered by id.
    ///
    /// Takes no scopes: a tricycle booked right after the read may still appear.
    pub async fn get_available(&self) -> Result<Vec<Tricycle>, RegistryError> {
        Ok(self.store.load_all(TricycleFilter::available()).await?)
    }

    /// Resolve one tricycle.
    pub async fn get_by_id(&self, id: TricycleId) -> Result<Tricycle, RegistryError> {
        self.store
            .load(id)
            .await?
            .ok_or(RegistryError::NotFound(id))
    }

    /// Run `op` against the current state of `id` under its exclusive scope.
    ///
    /// The updated tricycle is saved only when `op` succeeds; a rejected
    /// transition leaves the stored state untouched.
    pub async fn run_exclusive<F, R, E>(&self, id: TricycleId, op: F) -> Result<R, RegistryError>
    where
        F: FnOnce(&mut Tricycle) -> Result<R, E> + Send,
        R: Send,
        RegistryError: From<E>,
    {
        let _scope = self.locks.acquire(id, self.config.lock_timeout).await?;
        tracing::debug!(tricycle = %id, "exclusive scope acquired");

        let mut tricycle = self
            .store
            .load(id)
            .await?
            .ok_or(RegistryError::NotFound(id))?;

        let outcome = op(&mut tricycle)?;

        self.store.save(&tricycle).await.map_err(|e| {
            tracing::error!(tricycle = %id, error = %e, "failed to persist transition");
            RegistryError::Store(e)
        })?;

        Ok(outcome)
    }

    /// Book `id`, folding `feedback` into its rating.
    pub async fn request_booking(
        &self,
        id: TricycleId,
        feedback: f64,
    ) -> Result<(), RegistryError> {
        let feedback = Rating::new(feedback)?;
        let policy = self.config.rating_policy;
        let result = self
            .run_exclusive(id, |t| t.request_booking(feedback, &policy))
            .await;
        record_outcome("request_booking", id, &result);
        result
    }

    /// End the booking of `id`, folding `feedback` into its rating.
    pub async fn request_end_of_booking(
        &self,
        id: TricycleId,
        feedback: f64,
    ) -> Result<(), RegistryError> {
        let feedback = Rating::new(feedback)?;
        let policy = self.config.rating_policy;
        let result = self
            .run_exclusive(id, |t| t.request_end_of_booking(feedback, &policy))
            .await;
        record_outcome("request_end_of_booking", id, &result);
        result
    }

    /// Mark `id` as inside a danger zone. Idempotent.
    pub async fn signal_danger_enter(&self, id: TricycleId) -> Result<(), RegistryError> {
        let result = self
            .run_exclusive(id, |t| {
                t.signal_entering_danger_zone();
                Ok::<(), BookingError>(())
            })
            .await;
        record_outcome("signal_danger_enter", id, &result);
        result
    }

    /// Mark `id` as outside any danger zone. Idempotent.
    pub async fn signal_danger_exit(&self, id: TricycleId) -> Result<(), RegistryError> {
        let result = self
            .run_exclusive(id, |t| {
                t.signal_leaving_danger_zone();
                Ok::<(), BookingError>(())
            })
            .await;
        record_outcome("signal_danger_exit", id, &result);
        result
    }
}

/// Log and count the outcome of a transition request.
fn record_outcome(operation: &'static str, id: TricycleId, result: &Result<(), RegistryError>) {
    let outcome = match result {
        Ok(()) => {
            tracing::info!(tricycle = %id, operation, "transition applied");
            "applied"
        }
        Err(RegistryError::NotFound(_)) => {
            tracing::warn!(tricycle = %id, operation, "transition on unknown tricycle");
            "not_found"
        }
        Err(e) if e.is_infrastructure() => {
            tracing::error!(tricycle = %id, operation, error = %e, "transition failed");
            "failed"
        }
        Err(e) => {
            tracing::warn!(tricycle = %id, operation, reason = %e, "transition rejected");
            "rejected"
        }
    };
    metrics::counter!("tryshare_transitions_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use tryshare_state::Availability;

    fn id(raw: i64) -> TricycleId {
        TricycleId::new(raw).unwrap()
    }

    fn registry_with(fleet: Vec<Tricycle>) -> TricycleRegistry {
        let store = InMemoryStore::with_fleet(fleet).unwrap();
        TricycleRegistry::new(Arc::new(store), RegistryConfig::default())
    }

    fn available(raw: i64, rating: f64) -> Tricycle {
        Tricycle::new(id(raw), Rating::new(rating).unwrap())
    }

    fn booked(raw: i64, rating: f64) -> Tricycle {
        Tricycle::from_parts(
            id(raw),
            Availability::Booked,
            false,
            Rating::new(rating).unwrap(),
        )
    }

    #[tokio::test]
    async fn booking_scenario_folds_rating() {
        let registry = registry_with(vec![available(1, 4.0)]);
        registry.request_booking(id(1), 5.0).await.unwrap();
        let t = registry.get_by_id(id(1)).await.unwrap();
        assert_eq!(t.availability(), Availability::Booked);
        assert_eq!(t.rating().value(), 4.5);
    }

    #[tokio::test]
    async fn booking_booked_tricycle_fails_and_keeps_state() {
        let registry = registry_with(vec![booked(1, 4.0)]);
        let before = registry.get_by_id(id(1)).await.unwrap();
        let err = registry.request_booking(id(1), 3.0).await.unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Booking(BookingError::NotAvailable { .. })
        ));
        assert_eq!(registry.get_by_id(id(1)).await.unwrap(), before);
    }

    #[tokio::test]
    async fn get_by_id_unknown_is_not_found() {
        let registry = registry_with(vec![available(1, 4.0)]);
        let err = registry.get_by_id(id(999)).await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(t) if t == id(999)));
    }

    #[tokio::test]
    async fn every_operation_reports_not_found() {
        let registry = registry_with(vec![]);
        let missing = id(42);
        for err in [
            registry.request_booking(missing, 4.0).await.unwrap_err(),
            registry.request_end_of_booking(missing, 4.0).await.unwrap_err(),
            registry.signal_danger_enter(missing).await.unwrap_err(),
            registry.signal_danger_exit(missing).await.unwrap_err(),
        ] {
            assert!(matches!(err, RegistryError::NotFound(_)), "got {err:?}");
        }
    }

    #[tokio::test]
    async fn invalid_feedback_is_rejected_before_the_scope() {
        let registry = registry_with(vec![available(1, 4.0)]);
        let err = registry.request_booking(id(1), 7.5).await.unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));
        assert!(registry.get_by_id(id(1)).await.unwrap().is_available());
    }

    #[tokio::test]
    async fn end_of_booking_on_available_is_rejected() {
        let registry = registry_with(vec![available(1, 4.0)]);
        let err = registry
            .request_end_of_booking(id(1), 4.0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Booking(BookingError::AlreadyAvailable { .. })
        ));
    }

    #[tokio::test]
    async fn danger_signals_are_idempotent() {
        let registry = registry_with(vec![available(1, 4.0)]);
        registry.signal_danger_enter(id(1)).await.unwrap();
        registry.signal_danger_enter(id(1)).await.unwrap();
        assert!(registry.get_by_id(id(1)).await.unwrap().danger_zone());
        registry.signal_danger_exit(id(1)).await.unwrap();
        registry.signal_danger_exit(id(1)).await.unwrap();
        assert!(!registry.get_by_id(id(1)).await.unwrap().danger_zone());
    }

    #[tokio::test]
    async fn get_available_excludes_booked() {
        let registry = registry_with(vec![available(1, 4.0), booked(2, 3.0), available(3, 2.0)]);
        registry.request_booking(id(3), 2.0).await.unwrap();
        let ids: Vec<i64> = registry
            .get_available()
            .await
            .unwrap()
            .iter()
            .map(|t| t.id().get())
            .collect();
        assert_eq!(ids, vec![1]);
    }

    #[tokio::test]
    async fn run_exclusive_returns_operation_output() {
        let registry = registry_with(vec![available(1, 4.0)]);
        let rating = registry
            .run_exclusive(id(1), |t| Ok::<_, BookingError>(t.rating().value()))
            .await
            .unwrap();
        assert_eq!(rating, 4.0);
    }
}
