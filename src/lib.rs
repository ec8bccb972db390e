//! Statekeep: a state machine overlay for persistent entities
//!
//! Statekeep attaches a finite state machine to an existing entity without
//! taking ownership of it. The entity keeps its state in one of its own
//! fields; the overlay turns every declared event into an async operation
//! that checks the current state, runs a handler, writes the target state
//! and commits the entity.
//!
//! Statekeep follows Stillwater's "pure core, imperative shell" split. The
//! transition table and its resolution are pure; handlers, commits and
//! notifications live in the shell.
//!
//! # Core Concepts
//!
//! - **State**: Type-safe state representation via the `State` trait
//! - **Guard**: At most one transition in flight per entity; others are rejected
//! - **Signals**: `transitioning`, `transitioned` and `transitioned_to_<state>`
//! - **Arming**: The machine activates on the first configured lifecycle event
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use statekeep::builder::{transition, DefinitionBuilder};
//! use statekeep::entity::{MemoryStore, Record};
//! use statekeep::{state_enum, StateMachine};
//!
//! state_enum! {
//!     pub enum DocState {
//!         Draft => "draft",
//!         Review => "review",
//!         Published => "published",
//!     }
//! }
//!
//! # futures::executor::block_on(async {
//! let definition = DefinitionBuilder::<DocState, Record, (), ()>::new()
//!     .transition(transition("submit", DocState::Draft, DocState::Review))
//!     .transition(transition("approve", DocState::Review, DocState::Published))
//!     .succeeds("submit")
//!     .succeeds("approve")
//!     .build()
//!     .unwrap();
//!
//! let store = MemoryStore::shared();
//! let record = Record::new(store.clone()).with_field("state", json!("draft"));
//! let machine = StateMachine::attach(record, definition);
//! machine.trigger("created").unwrap();
//!
//! machine.fire("submit", ()).await.unwrap();
//! assert_eq!(machine.state().unwrap(), DocState::Review);
//! assert_eq!(store.last_saved().unwrap()["state"], json!("review"));
//! # });
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod effects;
pub mod entity;
pub mod notify;

/// Error type produced by handlers and entity commits.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// Re-export commonly used types
pub use builder::{transition, BuildError, Definition, DefinitionBuilder};
pub use config::{AmbiguityPolicy, CommitFailurePolicy, OverlayConfig};
pub use core::{State, StateHistory, TransitionDefinition};
pub use effects::{DispatchError, Draft, Handler, StateMachine};
pub use entity::Entity;
pub use notify::Signal;
