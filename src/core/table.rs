//! Transition table and pure transition resolution.

use super::state::State;
use super::transition::TransitionDefinition;
use std::collections::HashMap;

/// Immutable mapping from event name to its ordered candidate transitions,
/// plus the handler registered for each event.
///
/// Tables are produced by [`Definition::compile`](crate::builder::Definition::compile),
/// which validates the declarative input first.
pub struct TransitionTable<S: State, H> {
    event_names: Vec<String>,
    candidates: HashMap<String, Vec<TransitionDefinition<S>>>,
    handlers: HashMap<String, H>,
}

impl<S: State, H> TransitionTable<S, H> {
    /// Group already-validated definitions by event name.
    pub(crate) fn from_parts(
        definitions: Vec<TransitionDefinition<S>>,
        handlers: HashMap<String, H>,
    ) -> Self {
        let mut event_names: Vec<String> = Vec::new();
        let mut candidates: HashMap<String, Vec<TransitionDefinition<S>>> = HashMap::new();

        for definition in definitions {
            if !candidates.contains_key(&definition.name) {
                event_names.push(definition.name.clone());
            }
            candidates
                .entry(definition.name.clone())
                .or_default()
                .push(definition);
        }

        Self {
            event_names,
            candidates,
            handlers,
        }
    }

    /// Find the transition for `event` from `current` (pure).
    ///
    /// The first candidate in declaration order whose source accepts
    /// `current` wins. Returns `None` when nothing matches.
    pub fn resolve(&self, event: &str, current: &S) -> Option<&TransitionDefinition<S>> {
        self.candidates
            .get(event)?
            .iter()
            .find(|definition| definition.from.matches(current))
    }

    pub fn declares(&self, event: &str) -> bool {
        self.candidates.contains_key(event)
    }

    /// Distinct event names in first-declared order.
    pub fn event_names(&self) -> &[String] {
        &self.event_names
    }

    pub fn candidates(&self, event: &str) -> &[TransitionDefinition<S>] {
        self.candidates.get(event).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn handler(&self, event: &str) -> Option<&H> {
        self.handlers.get(event)
    }

    /// Events that can fire from `current`, in declaration order.
    pub fn available(&self, current: &S) -> Vec<&str> {
        self.event_names
            .iter()
            .filter(|event| self.resolve(event, current).is_some())
            .map(String::as_str)
            .collect()
    }

    /// Every state mentioned as a source or target, deduplicated.
    pub fn states(&self) -> Vec<&S> {
        let mut states: Vec<&S> = Vec::new();
        for event in &self.event_names {
            for definition in self.candidates(event) {
                for state in definition.from.states().into_iter().chain([&definition.to]) {
                    if !states.contains(&state) {
                        states.push(state);
                    }
                }
            }
        }
        states
    }

    /// Number of transition definitions.
    pub fn len(&self) -> usize {
        self.candidates.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(name: &str) -> String {
        name.to_string()
    }

    fn table() -> TransitionTable<String, &'static str> {
        let definitions = vec![
            TransitionDefinition::new("submit", s("draft"), s("review")),
            TransitionDefinition::new("approve", s("review"), s("approved")),
            TransitionDefinition::new("approve", s("approved"), s("published")),
            TransitionDefinition::new("archive", vec![s("draft"), s("review")], s("archived")),
        ];
        let handlers = HashMap::from([
            (s("submit"), "submit-handler"),
            (s("approve"), "approve-handler"),
            (s("archive"), "archive-handler"),
        ]);
        TransitionTable::from_parts(definitions, handlers)
    }

    #[test]
    fn resolve_picks_candidate_by_source_state() {
        let table = table();

        assert_eq!(table.resolve("approve", &s("review")).unwrap().to, "approved");
        assert_eq!(table.resolve("approve", &s("approved")).unwrap().to, "published");
    }

    #[test]
    fn resolve_matches_source_sets() {
        let table = table();

        assert_eq!(table.resolve("archive", &s("draft")).unwrap().to, "archived");
        assert_eq!(table.resolve("archive", &s("review")).unwrap().to, "archived");
        assert!(table.resolve("archive", &s("published")).is_none());
    }

    #[test]
    fn resolve_returns_none_for_unknown_event_or_state() {
        let table = table();

        assert!(table.resolve("delete", &s("draft")).is_none());
        assert!(table.resolve("submit", &s("review")).is_none());
    }

    #[test]
    fn first_declared_candidate_wins_on_overlap() {
        let table: TransitionTable<String, ()> = TransitionTable::from_parts(
            vec![
                TransitionDefinition::new("close", vec![s("open"), s("stale")], s("closed")),
                TransitionDefinition::new("close", s("open"), s("rejected")),
            ],
            HashMap::new(),
        );

        assert_eq!(table.resolve("close", &s("open")).unwrap().to, "closed");
    }

    #[test]
    fn event_names_are_unique_in_declaration_order() {
        let table = table();

        assert_eq!(table.event_names(), &[s("submit"), s("approve"), s("archive")]);
        assert_eq!(table.candidates("approve").len(), 2);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn available_lists_events_for_state() {
        let table = table();

        assert_eq!(table.available(&s("draft")), vec!["submit", "archive"]);
        assert_eq!(table.available(&s("published")), Vec::<&str>::new());
    }

    #[test]
    fn handler_lookup_by_event() {
        let table = table();

        assert_eq!(table.handler("approve"), Some(&"approve-handler"));
        assert!(table.handler("delete").is_none());
    }

    #[test]
    fn states_are_deduplicated() {
        let table = table();
        let states = table.states();

        assert_eq!(states.len(), 5);
        assert!(states.contains(&&s("archived")));
    }
}
