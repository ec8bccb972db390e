//! Field-map entity backed by a pluggable store.

use super::Entity;
use crate::BoxError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Durable storage for [`Record`] fields.
#[async_trait]
pub trait Store: Send + Sync {
    /// Persist the full set of fields.
    async fn save(&self, fields: &Map<String, Value>) -> Result<(), BoxError>;
}

/// An entity made of named JSON fields.
///
/// Cloning a record shares its store, so a snapshot commits to the same
/// place as the original.
#[derive(Clone)]
pub struct Record {
    fields: Map<String, Value>,
    store: Arc<dyn Store>,
}

impl Record {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            fields: Map::new(),
            store,
        }
    }

    /// Rehydrate a record from previously stored fields.
    pub fn from_fields(store: Arc<dyn Store>, fields: Map<String, Value>) -> Self {
        Self { fields, store }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Entity for Record {
    fn get_field(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }

    fn set_field(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }

    fn remove_field(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    async fn commit(&self) -> Result<(), BoxError> {
        self.store.save(&self.fields).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn commit_saves_all_fields() {
        let store = MemoryStore::shared();
        let record = Record::new(store.clone())
            .with_field("title", json!("Quarterly report"))
            .with_field("state", json!("draft"));

        record.commit().await.unwrap();

        let saved = store.last_saved().unwrap();
        assert_eq!(saved.get("title"), Some(&json!("Quarterly report")));
        assert_eq!(saved.get("state"), Some(&json!("draft")));
    }

    #[test]
    fn clones_are_independent_snapshots() {
        let original = Record::new(MemoryStore::shared()).with_field("state", json!("draft"));
        let mut snapshot = original.clone();

        snapshot.set_field("state", json!("review"));

        assert_eq!(original.get_field("state"), Some(json!("draft")));
        assert_eq!(snapshot.get_field("state"), Some(json!("review")));
    }

    #[test]
    fn remove_field_drops_the_key() {
        let mut record = Record::new(MemoryStore::shared()).with_field("state", json!("draft"));

        assert_eq!(record.remove_field("state"), Some(json!("draft")));
        assert_eq!(record.remove_field("state"), None);
        assert!(record.fields().is_empty());
    }

    #[test]
    fn from_fields_rehydrates() {
        let mut fields = Map::new();
        fields.insert("state".to_string(), json!("review"));

        let record = Record::from_fields(MemoryStore::shared(), fields);

        assert_eq!(record.field("state"), Some(&json!("review")));
        assert_eq!(record.fields().len(), 1);
    }
}
