//! Lifecycle notifications.
//!
//! A dispatch emits `transitioning` before its handler runs and, only when
//! the new state was committed, `transitioned` followed by
//! `transitioned_to_<state>`. Lifecycle events forwarded by the overlay use
//! the same emitter.

mod emitter;
mod signal;

pub use emitter::{Emitter, Listener, SubscriptionId};
pub use signal::{
    is_reserved, transitioned_to, Signal, TRANSITIONED, TRANSITIONED_TO_PREFIX, TRANSITIONING,
};
