//! Handler and continuation contracts.
//!
//! # Design Decisions
//! - Every handler invocation is a suspension point awaited by the
//!   dispatcher, whether or not the underlying work is asynchronous
//! - Handlers are trait objects behind `Arc`, cloned cheaply out of the
//!   routing tree so the tree lock is released before the handler runs
//! - The continuation is one-shot: either the dispatcher consumes it on a
//!   miss, or the matched handler receives it and may delegate

use futures_util::future::BoxFuture;
use std::any::Any;
use std::sync::Arc;

use crate::error::EngineError;
use crate::http::context::{QueryMap, RequestContext};

/// Outcome of a handler invocation.
pub type HandlerResult = Result<(), EngineError>;

/// A registered request handler.
pub type Handler = Arc<dyn Respond>;

/// Opaque value shared with every handler invocation.
pub type SharedParam = Arc<dyn Any + Send + Sync>;

/// Asynchronous request handler: writes a response onto the context.
pub trait Respond: Send + Sync {
    fn call<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        inv: Invocation,
    ) -> BoxFuture<'a, HandlerResult>;
}

struct FnRespond<F>(F);

impl<F> Respond for FnRespond<F>
where
    F: for<'a> Fn(&'a mut RequestContext, Invocation) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync,
{
    fn call<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        inv: Invocation,
    ) -> BoxFuture<'a, HandlerResult> {
        (self.0)(ctx, inv)
    }
}

/// Wrap a handler function in the shared handler type.
pub fn handler_fn<F>(f: F) -> Handler
where
    F: for<'a> Fn(&'a mut RequestContext, Invocation) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnRespond(f))
}

/// Handler that responds with a fixed text body.
pub fn text_handler(text: impl Into<String>) -> Handler {
    Arc::new(TextRespond(text.into()))
}

struct TextRespond(String);

impl Respond for TextRespond {
    fn call<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        _inv: Invocation,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            ctx.set_text(self.0.clone());
            Ok(())
        })
    }
}

/// Access-check capability for filesystem-backed handlers. May suspend.
pub trait AccessCheck: Send + Sync {
    fn check<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        inv: &'a Invocation,
    ) -> BoxFuture<'a, bool>;
}

/// Everything a handler receives besides the context itself.
pub struct Invocation {
    /// Slash-delimited segments of the matched request path.
    pub segments: Vec<String>,
    /// Parsed query parameters.
    pub query: QueryMap,
    /// Values bound via the dispatcher's `add_params`/`set_params`.
    pub params: Arc<[SharedParam]>,
    /// The continuation, present when the dispatcher handed it to a matched
    /// handler. Consuming it delegates the request downstream.
    pub next: Option<Next>,
}

impl Invocation {
    pub fn new(segments: Vec<String>, query: QueryMap, params: Arc<[SharedParam]>) -> Self {
        Self {
            segments,
            query,
            params,
            next: None,
        }
    }

    /// An invocation with no segments, query, or params.
    pub fn empty() -> Self {
        Self::new(Vec::new(), QueryMap::new(), Arc::from(Vec::new()))
    }
}

/// One-shot continuation handed to dispatch: "defer to the next stage".
pub struct Next(Box<dyn Continue>);

/// The continuation body: concrete types needing asynchronous access to the
/// context implement this; plain functions go through [`Next::from_fn`].
pub trait Continue: Send {
    fn run<'a>(self: Box<Self>, ctx: &'a mut RequestContext) -> BoxFuture<'a, ()>;
}

struct FnContinue<F>(F);

impl<F> Continue for FnContinue<F>
where
    F: FnOnce(&mut RequestContext) -> BoxFuture<'static, ()> + Send,
{
    fn run<'a>(self: Box<Self>, ctx: &'a mut RequestContext) -> BoxFuture<'a, ()> {
        (self.0)(ctx)
    }
}

impl Next {
    pub fn new(c: impl Continue + 'static) -> Self {
        Self(Box::new(c))
    }

    /// Continuation from a function that may write to the context before
    /// returning its asynchronous tail.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce(&mut RequestContext) -> BoxFuture<'static, ()> + Send + 'static,
    {
        Self(Box::new(FnContinue(f)))
    }

    /// Continuation that does nothing.
    pub fn noop() -> Self {
        Self(Box::new(Noop))
    }

    pub async fn run(self, ctx: &mut RequestContext) {
        self.0.run(ctx).await;
    }
}

struct Noop;

impl Continue for Noop {
    fn run<'a>(self: Box<Self>, _ctx: &'a mut RequestContext) -> BoxFuture<'a, ()> {
        Box::pin(async {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_text_handler() {
        let handler = text_handler("hello");
        let mut ctx = RequestContext::new(Method::GET, "/", "localhost");
        handler.call(&mut ctx, Invocation::empty()).await.unwrap();
        assert_eq!(ctx.body_text(), "hello");
        assert_eq!(ctx.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_next_runs_once() {
        struct Mark;
        impl Continue for Mark {
            fn run<'a>(self: Box<Self>, ctx: &'a mut RequestContext) -> BoxFuture<'a, ()> {
                Box::pin(async move {
                    ctx.status = StatusCode::NOT_FOUND;
                })
            }
        }

        let mut ctx = RequestContext::new(Method::GET, "/", "localhost");
        Next::new(Mark).run(&mut ctx).await;
        assert_eq!(ctx.status, StatusCode::NOT_FOUND);
    }
}
