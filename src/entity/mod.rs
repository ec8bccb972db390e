//! Entity persistence boundary.
//!
//! The overlay never decides how an entity stores or loads itself. It only
//! needs three things from it: read a field, write a field, and durably
//! commit all current field values.

mod accessor;
mod memory;
mod record;

pub use accessor::{StateAccessError, StateAccessor};
pub use memory::MemoryStore;
pub use record::{Record, Store};

use crate::BoxError;
use async_trait::async_trait;
use serde_json::Value;

/// A persistent object whose state field is governed by the overlay.
///
/// `commit` is called on the handler's working copy right after its state
/// field was written, so it sees every field the handler set. It is called
/// exactly once per successful handler.
#[async_trait]
pub trait Entity: Clone + Send + Sync + 'static {
    fn get_field(&self, name: &str) -> Option<Value>;

    fn set_field(&mut self, name: &str, value: Value);

    /// Remove a field, returning its previous value.
    fn remove_field(&mut self, name: &str) -> Option<Value>;

    /// Durably store all current field values.
    async fn commit(&self) -> Result<(), BoxError>;
}
