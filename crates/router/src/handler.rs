use crate::context::Context;
use crate::error::BoxError;
use crate::outcome::{IntoOutcome, Outcome};
use async_trait::async_trait;
use std::future::Future;

/// A request handler: takes the parameter bag, produces an outcome.
///
/// Failures surface to the error boundary of the router the handler was
/// registered on.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn invoke(&self, ctx: Context) -> Result<Outcome, BoxError>;
}

/// Adapter that lets any async closure over [`Context`] act as a handler.
pub struct FnHandler<F> {
    f: F,
}

pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Context) -> Fut + Send + Sync,
    Fut: Future + Send,
    Fut::Output: IntoOutcome,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Context) -> Fut + Send + Sync,
    Fut: Future + Send,
    Fut::Output: IntoOutcome,
{
    async fn invoke(&self, ctx: Context) -> Result<Outcome, BoxError> {
        (self.f)(ctx).await.into_outcome()
    }
}
