//! Per-instance transition guard.
//!
//! The guard is the mutual-exclusion slot that keeps a governed entity to at
//! most one in-flight transition. Acquiring hands out a [`GuardPermit`]; the
//! slot is cleared when the permit is dropped, on every exit path.

use super::state::State;
use super::transition::TransitionDefinition;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// The transition currently holding the guard.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveTransition<S: State> {
    /// Dispatch identifier, also carried by the journal record
    pub id: Uuid,
    pub event: String,
    pub from: S,
    pub to: S,
    pub started_at: DateTime<Utc>,
}

impl<S: State> ActiveTransition<S> {
    /// Start tracking `definition` as resolved from `from`.
    pub fn begin(definition: &TransitionDefinition<S>, from: S) -> Self {
        Self {
            id: Uuid::new_v4(),
            event: definition.name.clone(),
            from,
            to: definition.to.clone(),
            started_at: Utc::now(),
        }
    }
}

/// Observable guard state.
#[derive(Clone, Debug, PartialEq)]
pub enum GuardState<S: State> {
    Free,
    Busy(ActiveTransition<S>),
}

impl<S: State> GuardState<S> {
    pub fn is_free(&self) -> bool {
        matches!(self, Self::Free)
    }
}

/// Mutual-exclusion slot for one governed entity.
///
/// # Example
///
/// ```rust
/// use statekeep::core::{ActiveTransition, TransitionDefinition, TransitionGuard};
///
/// let guard = TransitionGuard::new();
/// let submit = TransitionDefinition::new("submit", "draft".to_string(), "review".to_string());
///
/// let permit = guard
///     .try_acquire(ActiveTransition::begin(&submit, "draft".to_string()))
///     .unwrap();
/// assert!(guard.is_busy());
///
/// // A second attempt is reported, not queued
/// let held = guard
///     .try_acquire(ActiveTransition::begin(&submit, "draft".to_string()))
///     .unwrap_err();
/// assert_eq!(held.event, "submit");
///
/// drop(permit);
/// assert!(!guard.is_busy());
/// ```
#[derive(Debug)]
pub struct TransitionGuard<S: State> {
    slot: Mutex<Option<ActiveTransition<S>>>,
}

impl<S: State> Default for TransitionGuard<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> TransitionGuard<S> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    // The slot is a plain Option; a panic while holding the lock cannot leave
    // it half-written.
    fn slot(&self) -> MutexGuard<'_, Option<ActiveTransition<S>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the guard for `active`.
    ///
    /// Fails with the current holder when a transition is already in flight.
    pub fn try_acquire(
        &self,
        active: ActiveTransition<S>,
    ) -> Result<GuardPermit<'_, S>, ActiveTransition<S>> {
        let mut slot = self.slot();
        if let Some(holder) = slot.as_ref() {
            return Err(holder.clone());
        }
        *slot = Some(active);
        Ok(GuardPermit { guard: self })
    }

    /// Clear the slot. Idempotent.
    pub fn release(&self) {
        self.slot().take();
    }

    pub fn is_busy(&self) -> bool {
        self.slot().is_some()
    }

    pub fn active(&self) -> Option<ActiveTransition<S>> {
        self.slot().clone()
    }

    pub fn state(&self) -> GuardState<S> {
        match self.active() {
            Some(active) => GuardState::Busy(active),
            None => GuardState::Free,
        }
    }
}

/// Proof of holding the guard. Dropping it releases the guard.
#[derive(Debug)]
#[must_use = "dropping the permit releases the guard immediately"]
pub struct GuardPermit<'a, S: State> {
    guard: &'a TransitionGuard<S>,
}

impl<S: State> GuardPermit<'_, S> {
    /// Release explicitly, at a chosen point of the pipeline.
    pub fn release(self) {
        drop(self);
    }
}

impl<S: State> Drop for GuardPermit<'_, S> {
    fn drop(&mut self) {
        self.guard.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submit() -> TransitionDefinition<String> {
        TransitionDefinition::new("submit", "draft".to_string(), "review".to_string())
    }

    #[test]
    fn new_guard_is_free() {
        let guard: TransitionGuard<String> = TransitionGuard::new();

        assert!(!guard.is_busy());
        assert_eq!(guard.state(), GuardState::Free);
    }

    #[test]
    fn acquire_marks_busy_with_transition() {
        let guard = TransitionGuard::new();
        let active = ActiveTransition::begin(&submit(), "draft".to_string());
        let id = active.id;

        let _permit = guard.try_acquire(active).unwrap();

        match guard.state() {
            GuardState::Busy(held) => {
                assert_eq!(held.id, id);
                assert_eq!(held.event, "submit");
                assert_eq!(held.to, "review");
            }
            GuardState::Free => panic!("Expected busy guard"),
        }
    }

    #[test]
    fn second_acquire_reports_holder_and_keeps_it() {
        let guard = TransitionGuard::new();
        let first = ActiveTransition::begin(&submit(), "draft".to_string());
        let first_id = first.id;
        let _permit = guard.try_acquire(first).unwrap();

        let rejected = guard.try_acquire(ActiveTransition::begin(&submit(), "draft".to_string()));

        assert_eq!(rejected.unwrap_err().id, first_id);
        assert_eq!(guard.active().map(|a| a.id), Some(first_id));
    }

    #[test]
    fn dropping_permit_releases() {
        let guard = TransitionGuard::new();
        {
            let _permit = guard
                .try_acquire(ActiveTransition::begin(&submit(), "draft".to_string()))
                .unwrap();
            assert!(guard.is_busy());
        }
        assert!(!guard.is_busy());
    }

    #[test]
    fn permit_released_during_unwind() {
        let guard = TransitionGuard::new();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _permit = guard
                .try_acquire(ActiveTransition::begin(&submit(), "draft".to_string()))
                .unwrap();
            panic!("handler blew up");
        }));

        assert!(outcome.is_err());
        assert!(guard.state().is_free());
    }

    #[test]
    fn release_is_idempotent() {
        let guard: TransitionGuard<String> = TransitionGuard::new();
        guard.release();
        guard.release();
        assert!(!guard.is_busy());
    }
}
