//! Effectful side of the overlay.
//!
//! This module is the "imperative shell" around the pure core: it runs
//! handlers, writes and commits the entity's state, and emits signals.
//!
//! # Key Concepts
//!
//! - **Handlers**: Business logic per event, either a Stillwater effect or a future
//! - **Drafts**: The working copy a handler mutates, committed with the new state
//! - **State Machine**: Arms on a lifecycle event and dispatches events under the guard
//! - **Errors**: Rejections, handler failures and commit failures stay distinguishable
//!
//! Handlers built from effects follow Stillwater 0.11.0 conventions: the
//! factory returns a `BoxedEffect` per call, built with `pure()`, `fail()`
//! or `from_fn()`, and runs with the entity's draft as its environment.

mod draft;
mod error;
mod handler;
mod machine;

pub use draft::Draft;
pub use error::DispatchError;
pub use handler::{EffectHandler, FutureHandler, Handler};
pub use machine::{Event, StateMachine};
