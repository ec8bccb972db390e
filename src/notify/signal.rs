//! Signals emitted around a transition.

use crate::core::State;

pub const TRANSITIONING: &str = "transitioning";
pub const TRANSITIONED: &str = "transitioned";
pub const TRANSITIONED_TO_PREFIX: &str = "transitioned_to_";

/// A named notification with positional payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Signal<S: State> {
    /// Emitted right before the handler runs. The transition may still fail.
    Transitioning { to: S, from: S, event: String },

    /// Emitted after the new state was committed.
    Transitioned { to: S, from: S, event: String },

    /// Emitted right after `Transitioned`, routed by target state name.
    TransitionedTo { to: S, from: S, event: String },

    /// An entity lifecycle event such as `created` or `fetched`.
    Lifecycle { name: String },
}

impl<S: State> Signal<S> {
    /// Routing name: `transitioning`, `transitioned`,
    /// `transitioned_to_<state>`, or the lifecycle event name.
    pub fn name(&self) -> String {
        match self {
            Self::Transitioning { .. } => TRANSITIONING.to_string(),
            Self::Transitioned { .. } => TRANSITIONED.to_string(),
            Self::TransitionedTo { to, .. } => transitioned_to(to),
            Self::Lifecycle { name } => name.clone(),
        }
    }

    pub fn event(&self) -> Option<&str> {
        match self {
            Self::Transitioning { event, .. }
            | Self::Transitioned { event, .. }
            | Self::TransitionedTo { event, .. } => Some(event),
            Self::Lifecycle { .. } => None,
        }
    }

    pub fn from(&self) -> Option<&S> {
        match self {
            Self::Transitioning { from, .. }
            | Self::Transitioned { from, .. }
            | Self::TransitionedTo { from, .. } => Some(from),
            Self::Lifecycle { .. } => None,
        }
    }

    pub fn to(&self) -> Option<&S> {
        match self {
            Self::Transitioning { to, .. }
            | Self::Transitioned { to, .. }
            | Self::TransitionedTo { to, .. } => Some(to),
            Self::Lifecycle { .. } => None,
        }
    }
}

/// Signal name for reaching `state`.
pub fn transitioned_to<S: State>(state: &S) -> String {
    format!("{}{}", TRANSITIONED_TO_PREFIX, state.name())
}

/// Whether an event name would shadow a transition signal.
pub fn is_reserved(name: &str) -> bool {
    name == TRANSITIONING || name == TRANSITIONED || name.starts_with(TRANSITIONED_TO_PREFIX)
}
