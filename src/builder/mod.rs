//! Builder API for declaring state machines.
//!
//! This module provides fluent builders and macros for declaring
//! transitions and handlers, and the validation that turns a definition
//! into a transition table.

pub mod definition;
pub mod error;
pub mod macros;
pub mod transition;

pub use definition::{Definition, DefinitionBuilder};
pub use error::{BuildError, DefinitionViolation};
pub use transition::TransitionBuilder;

use crate::core::{FromStates, State, TransitionDefinition};

/// Shorthand for a transition definition.
///
/// # Example
///
/// ```
/// use statekeep::builder::transition;
///
/// let submit = transition("submit", "draft".to_string(), "review".to_string());
/// let archive = transition(
///     "archive",
///     vec!["draft".to_string(), "review".to_string()],
///     "archived".to_string(),
/// );
///
/// assert!(submit.applies("submit", &"draft".to_string()));
/// assert!(archive.applies("archive", &"review".to_string()));
/// ```
pub fn transition<S: State>(
    name: impl Into<String>,
    from: impl Into<FromStates<S>>,
    to: S,
) -> TransitionDefinition<S> {
    TransitionDefinition::new(name, from, to)
}
