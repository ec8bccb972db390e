//! Core overlay types and logic.
//!
//! This module contains the parts of the overlay that do not touch the
//! entity or run handlers:
//! - State definitions via the `State` trait
//! - Transition definitions and the table that resolves them
//! - The per-instance transition guard
//! - The journal of committed transitions
//!
//! Resolution is pure; the guard is the only piece of shared mutable state.

mod guard;
mod history;
mod state;
mod table;
mod transition;

pub use guard::{ActiveTransition, GuardPermit, GuardState, TransitionGuard};
pub use history::{StateHistory, TransitionRecord};
pub use state::State;
pub use table::TransitionTable;
pub use transition::{FromStates, TransitionDefinition};
