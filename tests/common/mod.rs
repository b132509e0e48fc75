//! Shared fixtures for integration tests.

use axum::http::{Method, StatusCode};
use futures_util::future::BoxFuture;
use tempfile::TempDir;

use adaptive_router::routing::{AccessCheck, Invocation, Next};
use adaptive_router::{Dispatcher, RequestContext};

/// Materialize a site fixture on disk from (relative path, content) pairs.
#[allow(dead_code)]
pub fn build_site(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (rel, content) in files {
        let path = dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
    }
    dir
}

/// Continuation that marks the request unmatched.
#[allow(dead_code)]
pub fn not_found_next() -> Next {
    Next::from_fn(mark_not_found)
}

fn mark_not_found(ctx: &mut RequestContext) -> BoxFuture<'static, ()> {
    ctx.status = StatusCode::NOT_FOUND;
    ctx.content_type = None;
    ctx.set_text("no match");
    Box::pin(async {})
}

/// Dispatch one request and return (status, content type, body text).
#[allow(dead_code)]
pub async fn request(
    dispatcher: &Dispatcher,
    method: Method,
    target: &str,
    hostname: &str,
) -> (u16, Option<String>, String) {
    let mut ctx = RequestContext::new(method, target, hostname);
    dispatcher
        .dispatch(&mut ctx, not_found_next())
        .await
        .unwrap();
    (ctx.status.as_u16(), ctx.content_type.clone(), ctx.body_text())
}

/// GET against the default hostname.
#[allow(dead_code)]
pub async fn get(dispatcher: &Dispatcher, target: &str) -> (u16, Option<String>, String) {
    request(dispatcher, Method::GET, target, "localhost").await
}

/// Access check that refuses everything.
#[allow(dead_code)]
pub struct DenyAll;

impl AccessCheck for DenyAll {
    fn check<'a>(
        &'a self,
        _ctx: &'a mut RequestContext,
        _inv: &'a Invocation,
    ) -> BoxFuture<'a, bool> {
        Box::pin(async { false })
    }
}

/// Access check that allows requests carrying a `token` query parameter.
#[allow(dead_code)]
pub struct TokenCheck;

impl AccessCheck for TokenCheck {
    fn check<'a>(
        &'a self,
        _ctx: &'a mut RequestContext,
        inv: &'a Invocation,
    ) -> BoxFuture<'a, bool> {
        let has_token = inv.query.contains_key("token");
        Box::pin(async move { has_token })
    }
}
