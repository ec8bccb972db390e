//! Declarative transition definitions.

use super::state::State;
use serde::{Deserialize, Serialize};

/// Source states a transition accepts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "", untagged)]
pub enum FromStates<S: State> {
    /// Exactly one source state.
    One(S),
    /// Any state in the set.
    AnyOf(Vec<S>),
}

impl<S: State> FromStates<S> {
    /// Check whether `current` is accepted as a source (pure).
    pub fn matches(&self, current: &S) -> bool {
        match self {
            Self::One(state) => state == current,
            Self::AnyOf(states) => states.contains(current),
        }
    }

    /// All source states, in declaration order.
    pub fn states(&self) -> Vec<&S> {
        match self {
            Self::One(state) => vec![state],
            Self::AnyOf(states) => states.iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::AnyOf(states) if states.is_empty())
    }
}

impl<S: State> From<S> for FromStates<S> {
    fn from(state: S) -> Self {
        Self::One(state)
    }
}

impl<S: State> From<Vec<S>> for FromStates<S> {
    fn from(states: Vec<S>) -> Self {
        Self::AnyOf(states)
    }
}

/// A legal `(from, event, to)` triple.
///
/// Several definitions may share a `name`; the table picks the one whose
/// `from` accepts the entity's current state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionDefinition<S: State> {
    pub name: String,
    pub from: FromStates<S>,
    pub to: S,
}

impl<S: State> TransitionDefinition<S> {
    pub fn new(name: impl Into<String>, from: impl Into<FromStates<S>>, to: S) -> Self {
        Self {
            name: name.into(),
            from: from.into(),
            to,
        }
    }

    /// Check if this definition applies to `event` from `current` (pure)
    pub fn applies(&self, event: &str, current: &S) -> bool {
        self.name == event && self.from.matches(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_source_matches_by_equality() {
        let definition =
            TransitionDefinition::new("submit", "draft".to_string(), "review".to_string());

        assert!(definition.applies("submit", &"draft".to_string()));
        assert!(!definition.applies("submit", &"review".to_string()));
        assert!(!definition.applies("approve", &"draft".to_string()));
    }

    #[test]
    fn source_set_matches_by_membership() {
        let definition = TransitionDefinition::new(
            "archive",
            vec!["draft".to_string(), "review".to_string()],
            "archived".to_string(),
        );

        assert!(definition.applies("archive", &"draft".to_string()));
        assert!(definition.applies("archive", &"review".to_string()));
        assert!(!definition.applies("archive", &"published".to_string()));
    }

    #[test]
    fn empty_source_set_matches_nothing() {
        let from: FromStates<String> = FromStates::AnyOf(Vec::new());

        assert!(from.is_empty());
        assert!(!from.matches(&"draft".to_string()));
    }

    #[test]
    fn from_states_deserializes_single_or_list() {
        let one: FromStates<String> = serde_json::from_str("\"draft\"").unwrap();
        let many: FromStates<String> = serde_json::from_str("[\"draft\",\"review\"]").unwrap();

        assert_eq!(one, FromStates::One("draft".to_string()));
        assert_eq!(many.states().len(), 2);
    }
}
