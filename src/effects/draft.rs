//! Working copy of an entity handed to a transition handler.

use crate::entity::Entity;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The entity a handler runs against.
///
/// A draft starts as a copy of the live entity taken when the transition
/// acquired the guard. Fields the handler sets are committed together with
/// the new state, and only replace the live entity once that commit
/// succeeds. A failed handler leaves the live entity untouched.
///
/// Clones share the same working copy. Any write to the state field is
/// overwritten with the transition's target before the commit.
pub struct Draft<E> {
    inner: Arc<Mutex<E>>,
}

impl<E> Clone for Draft<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: Entity> Draft<E> {
    pub fn new(entity: E) -> Self {
        Self {
            inner: Arc::new(Mutex::new(entity)),
        }
    }

    fn entity(&self) -> MutexGuard<'_, E> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_field(&self, name: &str) -> Option<Value> {
        self.entity().get_field(name)
    }

    pub fn set_field(&self, name: &str, value: Value) {
        self.entity().set_field(name, value);
    }

    pub fn read<T>(&self, f: impl FnOnce(&E) -> T) -> T {
        f(&*self.entity())
    }

    pub fn update<T>(&self, f: impl FnOnce(&mut E) -> T) -> T {
        f(&mut *self.entity())
    }

    /// Copy of the entity as the handler left it.
    pub fn snapshot(&self) -> E {
        self.entity().clone()
    }
}

impl<E: Entity + std::fmt::Debug> std::fmt::Debug for Draft<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Draft").field(&*self.entity()).finish()
    }
}
