//! In-memory store with failure injection.

use super::record::Store;
use crate::BoxError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Keeps every saved field set in memory.
///
/// Failures queued with [`fail_next`](Self::fail_next) are returned by the
/// following saves, one per save, before anything is recorded.
#[derive(Default)]
pub struct MemoryStore {
    saved: Mutex<Vec<Map<String, Value>>>,
    failures: Mutex<VecDeque<BoxError>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Make the next save fail with `error`.
    pub fn fail_next(&self, error: impl Into<BoxError>) {
        lock(&self.failures).push_back(error.into());
    }

    pub fn save_count(&self) -> usize {
        lock(&self.saved).len()
    }

    pub fn last_saved(&self) -> Option<Map<String, Value>> {
        lock(&self.saved).last().cloned()
    }

    pub fn saved(&self) -> Vec<Map<String, Value>> {
        lock(&self.saved).clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn save(&self, fields: &Map<String, Value>) -> Result<(), BoxError> {
        if let Some(error) = lock(&self.failures).pop_front() {
            tracing::debug!("MemoryStore rejecting save: {}", error);
            return Err(error);
        }
        lock(&self.saved).push(fields.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(state: &str) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("state".to_string(), json!(state));
        fields
    }

    #[tokio::test]
    async fn save_records_fields() {
        let store = MemoryStore::new();

        store.save(&fields("draft")).await.unwrap();
        store.save(&fields("review")).await.unwrap();

        assert_eq!(store.save_count(), 2);
        assert_eq!(store.last_saved(), Some(fields("review")));
    }

    #[tokio::test]
    async fn queued_failure_is_returned_once() {
        let store = MemoryStore::new();
        store.fail_next("disk full");

        let err = store.save(&fields("draft")).await.unwrap_err();
        assert_eq!(err.to_string(), "disk full");
        assert_eq!(store.save_count(), 0);

        store.save(&fields("draft")).await.unwrap();
        assert_eq!(store.save_count(), 1);
    }
}
