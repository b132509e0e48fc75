//! Precedence-ordered handler lookup.
//!
//! # Precedence (the contract, evaluated at every node)
//! 1. `exact[method]`, only when the node is the request's terminal segment
//! 2. dynamic directory for `method`, resolved against the remaining suffix
//! 3. `wildcard[method]`, regardless of remaining depth
//! 4. literal child matching the next segment, recursively
//! 5. `fallback[method]`, once everything deeper has failed
//!
//! A wildcard therefore shadows the node's own subtree; a fallback catches
//! only what the subtree could not. The whole walk is read-only.

use axum::http::Method;
use futures_util::future::BoxFuture;

use crate::fsdir::dynamic;
use crate::routing::handler::Handler;
use crate::routing::node::RouteNode;

/// Walk the tree for a handler. `segments` is the full request path split on
/// slashes; resolution may consult the filesystem for dynamic directories.
pub async fn find_handler(
    root: &RouteNode,
    method: &Method,
    segments: &[String],
) -> Option<Handler> {
    descend(root, method, segments, 0).await
}

fn descend<'a>(
    node: &'a RouteNode,
    method: &'a Method,
    segments: &'a [String],
    depth: usize,
) -> BoxFuture<'a, Option<Handler>> {
    Box::pin(async move {
        if depth == segments.len() {
            if let Some(handler) = node.exact.get(method) {
                return Some(handler.clone());
            }
        }
        if let Some(ddir) = &node.dynamic {
            if ddir.method() == method {
                if let Some(handler) = dynamic::resolve(ddir, &segments[depth..]).await {
                    return Some(handler);
                }
            }
        }
        if let Some(handler) = node.wildcard.get(method) {
            return Some(handler.clone());
        }
        if let Some(segment) = segments.get(depth) {
            if let Some(child) = node.children.get(segment) {
                if let Some(handler) = descend(child, method, segments, depth + 1).await {
                    return Some(handler);
                }
            }
        }
        node.fallback.get(method).cloned()
    })
}
