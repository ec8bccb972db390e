//! State trait for entity state values.
//!
//! The overlay treats a state as an opaque comparable token. It is stored in
//! the entity's state field through serde, compared for transition
//! resolution, and named for signal routing.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for the values an entity's state field can hold.
///
/// # Required Traits
///
/// - `Clone`: states are copied into active transitions and the journal
/// - `PartialEq`: transition resolution compares the current state against sources
/// - `Debug`: states appear in errors and logs
/// - `Serialize` + `Deserialize`: states are read from and written to the entity field
///
/// # Example
///
/// ```rust
/// use statekeep::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// #[serde(rename_all = "lowercase")]
/// enum DocState {
///     Draft,
///     Review,
///     Published,
/// }
///
/// impl State for DocState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Draft => "draft",
///             Self::Review => "review",
///             Self::Published => "published",
///         }
///     }
/// }
///
/// assert_eq!(DocState::Review.name(), "review");
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Stable name of the state.
    ///
    /// Used to build the `transitioned_to_<name>` signal, so it should match
    /// the value persisted in the entity's state field.
    fn name(&self) -> &str;
}

impl State for String {
    fn name(&self) -> &str {
        self.as_str()
    }
}
