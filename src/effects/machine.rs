//! State machine overlay that executes guarded transitions on an entity.

use crate::builder::{BuildError, Definition};
use crate::config::{CommitFailurePolicy, OverlayConfig};
use crate::core::{
    ActiveTransition, GuardState, State, StateHistory, TransitionGuard, TransitionRecord,
    TransitionTable,
};
use crate::effects::draft::Draft;
use crate::effects::error::DispatchError;
use crate::effects::handler::Handler;
use crate::entity::{Entity, StateAccessError, StateAccessor};
use crate::notify::{Emitter, Signal, SubscriptionId};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::Instrument;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Table and initial state captured when the machine was armed.
struct Armed<S: State, E, A, R> {
    table: TransitionTable<S, Handler<E, A, R>>,
    initial: S,
}

struct Shared<S: State, E, A, R> {
    entity: Mutex<E>,
    definition: Definition<S, E, A, R>,
    config: OverlayConfig,
    accessor: StateAccessor<S>,
    armed: OnceLock<Armed<S, E, A, R>>,
    guard: TransitionGuard<S>,
    emitter: Emitter<S>,
    history: Mutex<StateHistory<S>>,
}

/// A state machine attached to one entity instance.
///
/// Each declared event becomes an async operation that runs at most one at a
/// time per instance: a call made while another transition is in flight is
/// rejected, never queued. The entity stays the only owner of its state;
/// the machine reads and writes it through the configured state field.
///
/// The machine is a cheap handle; clones share the same entity, guard and
/// subscribers.
///
/// # Example
///
/// ```rust
/// use statekeep::builder::{transition, DefinitionBuilder};
/// use statekeep::entity::{MemoryStore, Record};
/// use statekeep::effects::StateMachine;
/// use serde_json::json;
///
/// # futures::executor::block_on(async {
/// let definition = DefinitionBuilder::<String, Record, (), ()>::new()
///     .transition(transition("submit", "draft".to_string(), "review".to_string()))
///     .succeeds("submit")
///     .build()
///     .unwrap();
///
/// let record = Record::new(MemoryStore::shared()).with_field("state", json!("draft"));
/// let machine = StateMachine::attach(record, definition);
/// machine.trigger("created").unwrap();
///
/// machine.fire("submit", ()).await.unwrap();
/// assert_eq!(machine.state().unwrap(), "review");
/// # });
/// ```
pub struct StateMachine<S: State, E, A = (), R = ()> {
    shared: Arc<Shared<S, E, A, R>>,
}

impl<S: State, E, A, R> Clone for StateMachine<S, E, A, R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S, E, A, R> StateMachine<S, E, A, R>
where
    S: State + 'static,
    E: Entity,
    A: Send + 'static,
    R: Send + 'static,
{
    /// Attach `definition` to `entity` with the default configuration.
    ///
    /// The machine starts unarmed; see [`trigger`](Self::trigger).
    pub fn attach(entity: E, definition: Definition<S, E, A, R>) -> Self {
        Self::with_config(entity, definition, OverlayConfig::default())
    }

    pub fn with_config(entity: E, definition: Definition<S, E, A, R>, config: OverlayConfig) -> Self {
        let accessor = StateAccessor::new(config.state_field.clone());
        Self {
            shared: Arc::new(Shared {
                entity: Mutex::new(entity),
                definition,
                config,
                accessor,
                armed: OnceLock::new(),
                guard: TransitionGuard::new(),
                emitter: Emitter::new(),
                history: Mutex::new(StateHistory::new()),
            }),
        }
    }

    // ----- arming -----

    /// Report an entity lifecycle event such as `created` or `fetched`.
    ///
    /// The first configured lifecycle event arms the machine; later ones are
    /// no-ops. Every lifecycle event is forwarded to subscribers after
    /// arming was attempted. Returns whether this call armed the machine.
    pub fn trigger(&self, lifecycle: &str) -> Result<bool, BuildError> {
        let armed = if self.shared.config.arms_on(lifecycle) {
            self.arm()
        } else {
            Ok(false)
        };

        self.shared.emitter.emit(&Signal::Lifecycle {
            name: lifecycle.to_string(),
        });
        armed
    }

    /// Build the transition table and take the entity's current state as
    /// the initial state. Returns `Ok(false)` if already armed.
    ///
    /// A failed attempt leaves the machine unarmed.
    pub fn arm(&self) -> Result<bool, BuildError> {
        let shared = &*self.shared;
        if shared.armed.get().is_some() {
            return Ok(false);
        }

        let table = shared.definition.compile(shared.config.on_ambiguity)?;
        let initial = shared.read_state()?;

        if !table.states().contains(&&initial) {
            tracing::warn!(
                state = %initial.name(),
                "Initial state is not referenced by any transition"
            );
        }

        let state_name = initial.name().to_string();
        if shared.armed.set(Armed { table, initial }).is_err() {
            return Ok(false);
        }

        tracing::info!(initial = %state_name, "State machine armed");
        Ok(true)
    }

    pub fn is_armed(&self) -> bool {
        self.shared.armed.get().is_some()
    }

    /// State read from the entity when the machine was armed.
    pub fn initial_state(&self) -> Option<S> {
        self.shared.armed.get().map(|armed| armed.initial.clone())
    }

    // ----- inspection -----

    /// Current state, read from the entity.
    pub fn state(&self) -> Result<S, StateAccessError> {
        self.shared.read_state()
    }

    /// Snapshot of the entity.
    pub fn entity(&self) -> E {
        lock(&self.shared.entity).clone()
    }

    pub fn with_entity<T>(&self, f: impl FnOnce(&E) -> T) -> T {
        f(&*lock(&self.shared.entity))
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.shared.config
    }

    pub fn is_busy(&self) -> bool {
        self.shared.guard.is_busy()
    }

    pub fn active_transition(&self) -> Option<ActiveTransition<S>> {
        self.shared.guard.active()
    }

    pub fn guard_state(&self) -> GuardState<S> {
        self.shared.guard.state()
    }

    /// Committed transitions, oldest first.
    pub fn history(&self) -> StateHistory<S> {
        lock(&self.shared.history).clone()
    }

    /// Declared event names in first-declared order.
    pub fn events(&self) -> Vec<String> {
        match self.shared.armed.get() {
            Some(armed) => armed.table.event_names().to_vec(),
            None => self.shared.definition.event_names(),
        }
    }

    /// Events that could fire right now.
    ///
    /// Empty while unarmed or while a transition is in flight.
    pub fn available_events(&self) -> Vec<String> {
        let Some(armed) = self.shared.armed.get() else {
            return Vec::new();
        };
        if self.shared.guard.is_busy() {
            return Vec::new();
        }
        match self.shared.read_state() {
            Ok(current) => armed
                .table
                .available(&current)
                .into_iter()
                .map(str::to_string)
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Whether `event` would currently be accepted.
    pub fn can(&self, event: &str) -> bool {
        self.available_events().iter().any(|e| e == event)
    }

    // ----- subscriptions -----

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&Signal<S>) + Send + Sync + 'static,
    {
        self.shared.emitter.subscribe(listener)
    }

    /// Listen to one signal name, e.g. `transitioned_to_review`.
    pub fn on<F>(&self, name: impl Into<String>, listener: F) -> SubscriptionId
    where
        F: Fn(&Signal<S>) + Send + Sync + 'static,
    {
        self.shared.emitter.on(name, listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.emitter.unsubscribe(id)
    }

    // ----- mutation -----

    /// Change fields of the entity other than its state field.
    ///
    /// Refused while a transition is in flight. A change to the state field
    /// is undone and reported.
    pub fn modify<T>(&self, f: impl FnOnce(&mut E) -> T) -> Result<T, DispatchError> {
        let shared = &*self.shared;
        let mut entity = lock(&shared.entity);
        if let Some(active) = shared.guard.active() {
            return Err(DispatchError::EntityLocked {
                active: active.event,
            });
        }

        let field = shared.accessor.field();
        let before = entity.get_field(field);
        let result = f(&mut *entity);

        if entity.get_field(field) != before {
            match before {
                Some(value) => entity.set_field(field, value),
                None => {
                    entity.remove_field(field);
                }
            }
            return Err(DispatchError::StateFieldProtected {
                field: field.to_string(),
            });
        }
        Ok(result)
    }

    /// Operation handle for one declared event.
    pub fn event(&self, name: &str) -> Option<Event<'_, S, E, A, R>> {
        self.events()
            .into_iter()
            .find(|event| event == name)
            .map(|name| Event {
                machine: self,
                name,
            })
    }

    // ----- dispatch -----

    /// Fire `event` with the caller's `args`.
    ///
    /// Resolves with the handler's result once the new state has been
    /// committed. The guard is released on every exit path.
    pub async fn fire(&self, event: &str, args: A) -> Result<R, DispatchError> {
        let span = tracing::debug_span!(
            "transition",
            event = %event,
            id = tracing::field::Empty
        );
        self.dispatch(event, args).instrument(span).await
    }

    async fn dispatch(&self, event: &str, args: A) -> Result<R, DispatchError> {
        let shared = &*self.shared;
        let armed = shared.armed.get().ok_or_else(|| DispatchError::NotArmed {
            event: event.to_string(),
        })?;
        let table = &armed.table;
        if !table.declares(event) {
            return Err(DispatchError::UnknownEvent {
                event: event.to_string(),
            });
        }

        // Busy instances reject before anything else is looked at
        if let Some(active) = shared.guard.active() {
            tracing::warn!(active = %active.event, "Transition already in progress");
            return Err(DispatchError::TransitionInProgress {
                event: event.to_string(),
                active: active.event,
            });
        }

        let from = shared.read_state()?;
        let Some(definition) = table.resolve(event, &from) else {
            tracing::warn!(from = %from.name(), "No transition for event from current state");
            return Err(DispatchError::InvalidTransition {
                from: from.name().to_string(),
                event: event.to_string(),
            });
        };
        let handler = table
            .handler(event)
            .ok_or_else(|| DispatchError::UnknownEvent {
                event: event.to_string(),
            })?;

        let active = ActiveTransition::begin(definition, from);
        let permit = shared
            .guard
            .try_acquire(active.clone())
            .map_err(|holder| DispatchError::TransitionInProgress {
                event: event.to_string(),
                active: holder.event,
            })?;
        tracing::Span::current().record("id", tracing::field::display(active.id));
        tracing::debug!(
            from = %active.from.name(),
            to = %active.to.name(),
            "Guard acquired"
        );

        shared.emitter.emit(&Signal::Transitioning {
            to: active.to.clone(),
            from: active.from.clone(),
            event: active.event.clone(),
        });

        let draft = Draft::new(lock(&shared.entity).clone());
        let result = handler.invoke(draft.clone(), args).await.map_err(|err| {
            tracing::warn!(error = %err, "Transition handler failed; state unchanged");
            DispatchError::Handler(err)
        })?;

        // The draft is committed as a whole and only then replaces the live entity
        let mut working = draft.snapshot();
        shared.accessor.write(&mut working, &active.to)?;
        let committed = working.commit().await;
        if let Err(err) = committed {
            tracing::error!(
                error = %err,
                to = %active.to.name(),
                "Commit failed; transition signals suppressed"
            );
            match shared.config.on_commit_failure {
                CommitFailurePolicy::KeepDivergence => *lock(&shared.entity) = working,
                CommitFailurePolicy::RollBack => {
                    tracing::debug!("Working copy discarded after failed commit");
                }
            }
            return Err(DispatchError::Persistence(err));
        }
        *lock(&shared.entity) = working;

        shared.journal(TransitionRecord::committed(active.clone()));
        permit.release();
        tracing::info!(
            from = %active.from.name(),
            to = %active.to.name(),
            "Transition committed"
        );

        shared.emitter.emit(&Signal::Transitioned {
            to: active.to.clone(),
            from: active.from.clone(),
            event: active.event.clone(),
        });
        shared.emitter.emit(&Signal::TransitionedTo {
            to: active.to,
            from: active.from,
            event: active.event,
        });

        Ok(result)
    }
}

impl<S: State, E: Entity, A, R> Shared<S, E, A, R> {
    fn read_state(&self) -> Result<S, StateAccessError> {
        self.accessor.read(&*lock(&self.entity))
    }

    fn journal(&self, record: TransitionRecord<S>) {
        let mut history = lock(&self.history);
        history.push(record);
        if self.config.history_limit > 0 {
            history.trim_to(self.config.history_limit);
        }
    }
}

/// One declared event of a [`StateMachine`], callable as an operation.
pub struct Event<'a, S: State, E, A, R> {
    machine: &'a StateMachine<S, E, A, R>,
    name: String,
}

impl<S, E, A, R> Event<'_, S, E, A, R>
where
    S: State + 'static,
    E: Entity,
    A: Send + 'static,
    R: Send + 'static,
{
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn can(&self) -> bool {
        self.machine.can(&self.name)
    }

    pub async fn call(&self, args: A) -> Result<R, DispatchError> {
        self.machine.fire(&self.name, args).await
    }
}
