//! Transition handlers.

use super::draft::Draft;
use crate::entity::Entity;
use crate::BoxError;
use futures::future::{self, BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;
use stillwater::effect::{BoxedEffect, Effect};
use stillwater::prelude::*;

/// Factory producing a fresh effect per invocation; the effect runs with
/// the entity's draft as its environment.
pub type EffectHandler<E, A, R> =
    Arc<dyn Fn(A) -> BoxedEffect<R, BoxError, Draft<E>> + Send + Sync>;

/// Async function receiving the entity's draft and the caller's arguments.
pub type FutureHandler<E, A, R> =
    Arc<dyn Fn(Draft<E>, A) -> BoxFuture<'static, Result<R, BoxError>> + Send + Sync>;

/// Business logic run for an event before the new state is committed.
///
/// A handler runs against a [`Draft`] of the entity taken when the
/// transition was acquired. Fields it sets are committed with the new state.
/// Its result is handed back to the caller once the commit succeeds.
pub enum Handler<E, A, R> {
    Effect(EffectHandler<E, A, R>),
    Future(FutureHandler<E, A, R>),
}

impl<E, A, R> Clone for Handler<E, A, R> {
    fn clone(&self) -> Self {
        match self {
            Self::Effect(f) => Self::Effect(Arc::clone(f)),
            Self::Future(f) => Self::Future(Arc::clone(f)),
        }
    }
}

impl<E: Entity, A: Send + 'static, R: Send + 'static> Handler<E, A, R> {
    /// Handler built from a stillwater effect factory.
    ///
    /// # Example
    ///
    /// ```rust
    /// use statekeep::effects::{Draft, Handler};
    /// use statekeep::entity::Record;
    /// use stillwater::prelude::*;
    ///
    /// // Reads the entity it runs against
    /// let word_count: Handler<Record, (), usize> = Handler::effect(|_args: ()| {
    ///     from_fn(|draft: &Draft<Record>| {
    ///         let body = draft.get_field("body").unwrap_or_default();
    ///         Ok(body.as_str().map(|b| b.split_whitespace().count()).unwrap_or(0))
    ///     })
    ///     .boxed()
    /// });
    /// ```
    pub fn effect<F>(factory: F) -> Self
    where
        F: Fn(A) -> BoxedEffect<R, BoxError, Draft<E>> + Send + Sync + 'static,
    {
        Self::Effect(Arc::new(factory))
    }

    /// Handler built from an async function.
    ///
    /// # Example
    ///
    /// ```rust
    /// use serde_json::json;
    /// use statekeep::effects::Handler;
    /// use statekeep::entity::Record;
    /// use statekeep::BoxError;
    ///
    /// let assign: Handler<Record, String, ()> = Handler::future(|draft, reviewer: String| async move {
    ///     draft.set_field("reviewer", json!(reviewer));
    ///     Ok::<_, BoxError>(())
    /// });
    /// ```
    pub fn future<F, Fut>(f: F) -> Self
    where
        F: Fn(Draft<E>, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, BoxError>> + Send + 'static,
    {
        Self::Future(Arc::new(move |entity, args| f(entity, args).boxed()))
    }

    /// Handler that does nothing and succeeds with `R::default()`.
    pub fn succeeds() -> Self
    where
        R: Default,
    {
        Self::future(|_, _| future::ready(Ok(R::default())))
    }

    /// Run the handler against `draft` with the caller's `args`.
    pub async fn invoke(&self, draft: Draft<E>, args: A) -> Result<R, BoxError> {
        match self {
            Self::Effect(factory) => factory(args).run(&draft).await,
            Self::Future(f) => f(draft, args).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{MemoryStore, Record};
    use serde_json::json;

    #[derive(Debug, thiserror::Error)]
    #[error("network unreachable")]
    struct NetworkError;

    fn draft() -> Draft<Record> {
        Draft::new(Record::new(MemoryStore::shared()).with_field("title", json!("Release notes")))
    }

    #[tokio::test]
    async fn effect_handler_runs_against_entity() {
        let handler: Handler<Record, (), String> = Handler::effect(|_| {
            from_fn(|draft: &Draft<Record>| {
                Ok(draft
                    .get_field("title")
                    .and_then(|t| t.as_str().map(str::to_string))
                    .unwrap_or_default())
            })
            .boxed()
        });

        let title = handler.invoke(draft(), ()).await.unwrap();
        assert_eq!(title, "Release notes");
    }

    #[tokio::test]
    async fn pure_effect_returns_value() {
        let handler: Handler<Record, u32, u32> = Handler::effect(|n| pure(n * 2).boxed());

        assert_eq!(handler.invoke(draft(), 21).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn future_handler_receives_args() {
        let handler: Handler<Record, String, String> =
            Handler::future(|_, reviewer: String| async move {
                Ok::<_, BoxError>(format!("assigned {reviewer}"))
            });

        let result = handler.invoke(draft(), "ada".to_string()).await.unwrap();
        assert_eq!(result, "assigned ada");
    }

    #[tokio::test]
    async fn handler_errors_are_propagated() {
        let handler: Handler<Record, (), ()> =
            Handler::future(|_, _| async { Err::<(), BoxError>(NetworkError.into()) });

        let err = handler.invoke(draft(), ()).await.unwrap_err();
        assert!(err.downcast_ref::<NetworkError>().is_some());
    }

    #[tokio::test]
    async fn succeeds_returns_default() {
        let handler: Handler<Record, (), Vec<u8>> = Handler::succeeds();

        assert!(handler.invoke(draft(), ()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn field_writes_land_on_the_draft() {
        let handler: Handler<Record, (), ()> = Handler::future(|draft: Draft<Record>, _| async move {
            draft.set_field("published_at", json!("2026-10-16"));
            Ok::<_, BoxError>(())
        });
        let target = draft();

        handler.invoke(target.clone(), ()).await.unwrap();

        assert_eq!(target.get_field("published_at"), Some(json!("2026-10-16")));
    }

    #[tokio::test]
    async fn effect_handler_can_update_draft() {
        let handler: Handler<Record, u32, ()> = Handler::effect(|priority| {
            from_fn(move |draft: &Draft<Record>| {
                draft.set_field("priority", json!(priority));
                Ok(())
            })
            .boxed()
        });
        let target = draft();

        handler.invoke(target.clone(), 3).await.unwrap();

        assert_eq!(target.get_field("priority"), Some(json!(3)));
    }
}
