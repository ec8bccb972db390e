//! Builder for constructing transition definitions.

use crate::builder::error::BuildError;
use crate::core::{FromStates, State, TransitionDefinition};

/// Builder for constructing transitions with a fluent API.
pub struct TransitionBuilder<S: State> {
    name: String,
    from: Option<FromStates<S>>,
    to: Option<S>,
}

impl<S: State> TransitionBuilder<S> {
    /// Start a transition for the event `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            from: None,
            to: None,
        }
    }

    /// Set a single source state.
    pub fn from(mut self, state: S) -> Self {
        self.from = Some(FromStates::One(state));
        self
    }

    /// Accept any of `states` as the source.
    pub fn from_any(mut self, states: impl IntoIterator<Item = S>) -> Self {
        self.from = Some(FromStates::AnyOf(states.into_iter().collect()));
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: S) -> Self {
        self.to = Some(state);
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<TransitionDefinition<S>, BuildError> {
        if self.name.is_empty() {
            return Err(BuildError::MissingEventName);
        }
        let from = self.from.ok_or(BuildError::MissingFromState)?;
        let to = self.to.ok_or(BuildError::MissingToState)?;

        Ok(TransitionDefinition {
            name: self.name,
            from,
            to,
        })
    }
}
