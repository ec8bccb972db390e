//! Errors surfaced by event dispatch.

use crate::entity::StateAccessError;
use crate::BoxError;
use std::error::Error as StdError;
use thiserror::Error;

/// Errors that can occur when firing an event.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("State machine is not armed yet; event '{event}' cannot fire")]
    NotArmed { event: String },

    #[error("Unknown event '{event}'")]
    UnknownEvent { event: String },

    /// Another transition holds the guard. Nothing was changed.
    #[error("Entity is in the middle of transition '{active}'; '{event}' rejected")]
    TransitionInProgress { event: String, active: String },

    /// No transition for the event accepts the current state. Nothing was changed.
    #[error("Transition from '{from}' via '{event}' not supported")]
    InvalidTransition { from: String, event: String },

    /// Direct entity modification attempted while a transition is in flight.
    #[error("Entity is locked by transition '{active}'")]
    EntityLocked { active: String },

    #[error("State field '{field}' can only change through a transition")]
    StateFieldProtected { field: String },

    #[error(transparent)]
    StateAccess(#[from] StateAccessError),

    /// The handler failed. State is unchanged.
    #[error("Transition handler failed: {0}")]
    Handler(#[source] BoxError),

    /// The commit failed after the handler succeeded.
    #[error("Commit failed: {0}")]
    Persistence(#[source] BoxError),
}

impl DispatchError {
    /// Rejected before any handler ran or any state was touched.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::NotArmed { .. }
                | Self::UnknownEvent { .. }
                | Self::TransitionInProgress { .. }
                | Self::InvalidTransition { .. }
                | Self::EntityLocked { .. }
        )
    }

    /// Retrying the same call can succeed without a state change in between.
    ///
    /// Handler failures count as retryable only for idempotent handlers; the
    /// overlay cannot know that, so the caller decides.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TransitionInProgress { .. } | Self::EntityLocked { .. } | Self::Handler(_)
        )
    }

    /// Downcast a propagated handler or commit error.
    pub fn downcast_ref<T: StdError + 'static>(&self) -> Option<&T> {
        match self {
            Self::Handler(err) | Self::Persistence(err) => err.downcast_ref::<T>(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("disk full")]
    struct DiskFull;

    #[test]
    fn invalid_transition_names_state_and_event() {
        let err = DispatchError::InvalidTransition {
            from: "published".to_string(),
            event: "submit".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "Transition from 'published' via 'submit' not supported"
        );
        assert!(err.is_rejection());
        assert!(!err.is_retryable());
    }

    #[test]
    fn in_progress_is_retryable_rejection() {
        let err = DispatchError::TransitionInProgress {
            event: "approve".to_string(),
            active: "approve".to_string(),
        };

        assert!(err.is_rejection());
        assert!(err.is_retryable());
    }

    #[test]
    fn persistence_error_downcasts_to_source() {
        let err = DispatchError::Persistence(Box::new(DiskFull));

        assert!(err.downcast_ref::<DiskFull>().is_some());
        assert!(err.source().is_some());
        assert!(!err.is_rejection());
        assert!(!err.is_retryable());
    }
}
