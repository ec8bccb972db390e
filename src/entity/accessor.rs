//! Typed access to the entity's state field.

use super::Entity;
use crate::core::State;
use std::marker::PhantomData;
use thiserror::Error;

/// Errors reading or writing the state field.
#[derive(Debug, Error)]
pub enum StateAccessError {
    #[error("Entity has no state field '{field}'")]
    MissingField { field: String },

    #[error("State field '{field}' holds an unknown state: {source}")]
    Decode {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("State could not be encoded for field '{field}': {source}")]
    Encode {
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads and writes the state field of an entity.
///
/// The accessor holds no state value of its own; every read goes to the
/// entity.
#[derive(Debug, Clone)]
pub struct StateAccessor<S: State> {
    field: String,
    _phantom: PhantomData<S>,
}

impl<S: State> StateAccessor<S> {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            _phantom: PhantomData,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Current state of `entity`.
    pub fn read<E: Entity>(&self, entity: &E) -> Result<S, StateAccessError> {
        let value = entity
            .get_field(&self.field)
            .ok_or_else(|| StateAccessError::MissingField {
                field: self.field.clone(),
            })?;

        serde_json::from_value(value).map_err(|source| StateAccessError::Decode {
            field: self.field.clone(),
            source,
        })
    }

    /// Write `state` into `entity`, returning the raw previous value.
    pub fn write<E: Entity>(
        &self,
        entity: &mut E,
        state: &S,
    ) -> Result<Option<serde_json::Value>, StateAccessError> {
        let value = serde_json::to_value(state).map_err(|source| StateAccessError::Encode {
            field: self.field.clone(),
            source,
        })?;

        let previous = entity.get_field(&self.field);
        entity.set_field(&self.field, value);
        Ok(previous)
    }
}
