//! Declarative state machine definitions and their validation.

use crate::builder::error::{BuildError, DefinitionViolation};
use crate::builder::transition::TransitionBuilder;
use crate::config::AmbiguityPolicy;
use crate::core::{State, TransitionDefinition, TransitionTable};
use crate::effects::Handler;
use crate::entity::Entity;
use crate::notify::is_reserved;
use std::collections::HashMap;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<DefinitionViolation>>;

fn check(ok: bool, violation: impl FnOnce() -> DefinitionViolation) -> Check {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

/// Raw declarative input: transitions plus one handler per event name.
///
/// The initial state is not part of a definition; it is read from the
/// entity when the overlay is armed.
pub struct Definition<S: State, E, A, R> {
    transitions: Vec<TransitionDefinition<S>>,
    handlers: Vec<(String, Handler<E, A, R>)>,
}

impl<S: State, E, A, R> Definition<S, E, A, R> {
    pub fn transitions(&self) -> &[TransitionDefinition<S>] {
        &self.transitions
    }

    /// Distinct event names in first-declared order.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for transition in &self.transitions {
            if !names.contains(&transition.name) {
                names.push(transition.name.clone());
            }
        }
        names
    }

    /// Check the definition, accumulating every violation.
    pub fn validate(&self, policy: AmbiguityPolicy) -> Result<(), BuildError> {
        if self.transitions.is_empty() {
            return Err(BuildError::NoTransitions);
        }

        let declared = self.event_names();
        let mut checks: Vec<Check> = Vec::new();

        for (index, transition) in self.transitions.iter().enumerate() {
            checks.push(check(!transition.name.is_empty(), || {
                DefinitionViolation::EmptyEventName { index }
            }));
            checks.push(check(!transition.from.is_empty(), || {
                DefinitionViolation::EmptySourceSet {
                    event: transition.name.clone(),
                }
            }));
        }

        for event in &declared {
            checks.push(check(!is_reserved(event), || {
                DefinitionViolation::ReservedEventName {
                    event: event.clone(),
                }
            }));
            let registered = self.handlers.iter().filter(|(name, _)| name == event).count();
            checks.push(check(registered > 0, || DefinitionViolation::MissingHandler {
                event: event.clone(),
            }));
            checks.push(check(registered < 2, || {
                DefinitionViolation::DuplicateHandler {
                    event: event.clone(),
                }
            }));
        }

        for (name, _) in &self.handlers {
            checks.push(check(declared.contains(name), || {
                DefinitionViolation::UnknownHandler {
                    event: name.clone(),
                }
            }));
        }

        let overlaps = self.overlaps();
        match policy {
            AmbiguityPolicy::Reject => {
                for (event, from) in overlaps {
                    checks.push(Validation::fail(DefinitionViolation::AmbiguousTransition {
                        event,
                        from,
                    }));
                }
            }
            AmbiguityPolicy::FirstMatch => {
                for (event, from) in overlaps {
                    tracing::warn!(
                        %event,
                        %from,
                        "Overlapping transitions; first declared candidate wins"
                    );
                }
            }
        }

        match Validation::all_vec(checks).map(|_| ()) {
            Validation::Success(()) => Ok(()),
            Validation::Failure(violations) => Err(BuildError::InvalidDefinition {
                violations: violations.iter().cloned().collect(),
            }),
        }
    }

    /// `(event, state)` pairs where more than one candidate accepts `state`.
    fn overlaps(&self) -> Vec<(String, String)> {
        let mut overlaps: Vec<(String, String)> = Vec::new();
        for (i, earlier) in self.transitions.iter().enumerate() {
            for later in self.transitions.iter().skip(i + 1) {
                if earlier.name != later.name {
                    continue;
                }
                for state in earlier.from.states() {
                    let pair = (earlier.name.clone(), state.name().to_string());
                    if later.from.matches(state) && !overlaps.contains(&pair) {
                        overlaps.push(pair);
                    }
                }
            }
        }
        overlaps
    }
}

impl<S: State, E: Entity, A: Send + 'static, R: Send + 'static> Definition<S, E, A, R> {
    /// Validate and turn the definition into an immutable table.
    pub fn compile(
        &self,
        policy: AmbiguityPolicy,
    ) -> Result<TransitionTable<S, Handler<E, A, R>>, BuildError> {
        self.validate(policy)?;

        let handlers: HashMap<String, Handler<E, A, R>> = self
            .handlers
            .iter()
            .map(|(name, handler)| (name.clone(), handler.clone()))
            .collect();

        Ok(TransitionTable::from_parts(self.transitions.clone(), handlers))
    }
}

/// Builder for constructing definitions with a fluent API.
pub struct DefinitionBuilder<S: State, E, A, R> {
    transitions: Vec<TransitionDefinition<S>>,
    handlers: Vec<(String, Handler<E, A, R>)>,
}

impl<S: State, E: Entity, A: Send + 'static, R: Send + 'static> DefinitionBuilder<S, E, A, R> {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
            handlers: Vec::new(),
        }
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn event(mut self, builder: TransitionBuilder<S>) -> Result<Self, BuildError> {
        self.transitions.push(builder.build()?);
        Ok(self)
    }

    /// Add a pre-built transition.
    pub fn transition(mut self, transition: TransitionDefinition<S>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once.
    pub fn transitions(mut self, transitions: Vec<TransitionDefinition<S>>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Register the handler for `event`.
    pub fn handler(mut self, event: impl Into<String>, handler: Handler<E, A, R>) -> Self {
        self.handlers.push((event.into(), handler));
        self
    }

    /// Register a handler for `event` that succeeds with `R::default()`.
    pub fn succeeds(self, event: impl Into<String>) -> Self
    where
        R: Default,
    {
        self.handler(event, Handler::succeeds())
    }

    /// Build the definition.
    ///
    /// Structural problems are reported here; overlapping sources are only
    /// rejected when the table is compiled under [`AmbiguityPolicy::Reject`].
    pub fn build(self) -> Result<Definition<S, E, A, R>, BuildError> {
        let definition = Definition {
            transitions: self.transitions,
            handlers: self.handlers,
        };
        definition.validate(AmbiguityPolicy::FirstMatch)?;
        Ok(definition)
    }
}

impl<S: State, E: Entity, A: Send + 'static, R: Send + 'static> Default
    for DefinitionBuilder<S, E, A, R>
{
    fn default() -> Self {
        Self::new()
    }
}
