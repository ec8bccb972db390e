//! Journal of committed transitions.
//!
//! Only transitions whose new state was successfully committed are recorded.
//! `record` returns a new history and leaves the original untouched; the
//! overlay's own journal appends in place with `push`.

use super::guard::ActiveTransition;
use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record of a single committed transition.
///
/// # Example
///
/// ```rust
/// use statekeep::core::TransitionRecord;
/// use chrono::Utc;
/// use uuid::Uuid;
///
/// let record = TransitionRecord {
///     id: Uuid::new_v4(),
///     event: "submit".to_string(),
///     from: "draft".to_string(),
///     to: "review".to_string(),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(record.event, "submit");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionRecord<S: State> {
    /// Dispatch identifier of the committed transition
    pub id: Uuid,
    /// Event that drove the transition
    pub event: String,
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// When the commit completed
    pub timestamp: DateTime<Utc>,
}

impl<S: State> TransitionRecord<S> {
    /// Close an active transition after its commit succeeded.
    pub fn committed(active: ActiveTransition<S>) -> Self {
        Self {
            id: active.id,
            event: active.event,
            from: active.from,
            to: active.to,
            timestamp: Utc::now(),
        }
    }
}

/// Ordered history of committed transitions.
///
/// # Example
///
/// ```rust
/// use statekeep::core::{StateHistory, TransitionRecord};
/// use chrono::Utc;
/// use uuid::Uuid;
///
/// let record = |event: &str, from: &str, to: &str| TransitionRecord {
///     id: Uuid::new_v4(),
///     event: event.to_string(),
///     from: from.to_string(),
///     to: to.to_string(),
///     timestamp: Utc::now(),
/// };
///
/// let history = StateHistory::new()
///     .record(record("submit", "draft", "review"))
///     .record(record("approve", "review", "approved"));
///
/// let path = history.get_path();
/// assert_eq!(path.len(), 3); // draft -> review -> approved
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: Vec<TransitionRecord<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// This is a pure function - the existing history is left untouched.
    pub fn record(&self, transition: TransitionRecord<S>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Append a transition in place.
    pub fn push(&mut self, transition: TransitionRecord<S>) {
        self.transitions.push(transition);
    }

    /// Drop the oldest records so at most `max_len` remain.
    pub fn trim_to(&mut self, max_len: usize) {
        let excess = self.transitions.len().saturating_sub(max_len);
        if excess > 0 {
            self.transitions.drain(..excess);
        }
    }

    /// Get the path of states traversed.
    ///
    /// Returns the first record's source state, then the target state of
    /// each record.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Most recent committed transition.
    pub fn last(&self) -> Option<&TransitionRecord<S>> {
        self.transitions.last()
    }

    pub fn transitions(&self) -> &[TransitionRecord<S>] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
