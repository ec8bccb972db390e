//! Build errors for definitions and transition tables.

use crate::entity::StateAccessError;
use thiserror::Error;

/// A single problem found while validating a definition.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DefinitionViolation {
    #[error("Transition #{index} has an empty event name")]
    EmptyEventName { index: usize },

    #[error("Event '{event}' declares an empty set of source states")]
    EmptySourceSet { event: String },

    #[error("Event name '{event}' is reserved for transition signals")]
    ReservedEventName { event: String },

    #[error("Event '{event}' has no handler")]
    MissingHandler { event: String },

    #[error("Handler registered for undeclared event '{event}'")]
    UnknownHandler { event: String },

    #[error("Event '{event}' has more than one handler")]
    DuplicateHandler { event: String },

    #[error("Event '{event}' has overlapping transitions from state '{from}'")]
    AmbiguousTransition { event: String, from: String },
}

/// Errors that can occur when building transitions, definitions and tables.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Transition event name not specified. Call TransitionBuilder::new(name)")]
    MissingEventName,

    #[error("Transition source state not specified. Call .from(state) or .from_any(states)")]
    MissingFromState,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingToState,

    #[error("No transitions defined. Add at least one transition")]
    NoTransitions,

    #[error("Invalid state machine definition: {}", summarize(.violations))]
    InvalidDefinition { violations: Vec<DefinitionViolation> },

    #[error("Cannot read initial state: {0}")]
    InitialState(#[from] StateAccessError),
}

fn summarize(violations: &[DefinitionViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl BuildError {
    /// Violations carried by `InvalidDefinition`, empty otherwise.
    pub fn violations(&self) -> &[DefinitionViolation] {
        match self {
            Self::InvalidDefinition { violations } => violations,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_definition_lists_every_violation() {
        let err = BuildError::InvalidDefinition {
            violations: vec![
                DefinitionViolation::MissingHandler {
                    event: "submit".to_string(),
                },
                DefinitionViolation::UnknownHandler {
                    event: "publsh".to_string(),
                },
            ],
        };

        let message = err.to_string();
        assert!(message.contains("'submit' has no handler"));
        assert!(message.contains("undeclared event 'publsh'"));
        assert_eq!(err.violations().len(), 2);
    }
}
