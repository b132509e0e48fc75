//! Tree mutation: insert, removal with ancestor pruning, deep merge.

use axum::http::Method;
use std::collections::hash_map::Entry;

use crate::http::context::path_segments;
use crate::routing::handler::Handler;
use crate::routing::node::{RouteNode, RouteSpec};

impl RouteNode {
    /// Register `handler` for `method` at `route` under the given slot,
    /// creating intermediate nodes as needed. Re-registering silently
    /// replaces. An empty route registers at this node itself.
    pub fn insert(&mut self, method: Method, route: &str, handler: Handler, spec: RouteSpec) {
        let segments = path_segments(route);
        let mut node = self;
        for segment in segments {
            node = node.children.entry(segment).or_default();
        }
        node.slot_mut(spec).insert(method, handler);
    }

    /// Register the same handler for every route in `routes`. Not atomic: a
    /// panic partway leaves earlier routes registered.
    pub fn insert_all<S: AsRef<str>>(
        &mut self,
        method: Method,
        routes: &[S],
        handler: Handler,
        spec: RouteSpec,
    ) {
        for route in routes {
            self.insert(method.clone(), route.as_ref(), handler.clone(), spec);
        }
    }

    /// Remove the handler registered for `method` at `route` under `spec`,
    /// then prune every ancestor left empty, stopping at the first one that
    /// still carries something. Missing segments make this a no-op, and so
    /// does an empty route.
    pub fn remove(&mut self, method: &Method, route: &str, spec: RouteSpec) {
        let segments = path_segments(route);
        if segments.is_empty() {
            return;
        }
        remove_pruning(self, &segments, method, spec);
    }

    /// Deep-merge `incoming` into this subtree. Literal children merge
    /// recursively; per-method slot entries from `incoming` overwrite the
    /// entry for the same method and leave other methods untouched; an
    /// incoming dynamic-directory descriptor replaces the current one.
    /// Last writer wins throughout.
    pub fn merge(&mut self, incoming: RouteNode) {
        for (segment, child) in incoming.children {
            match self.children.entry(segment) {
                Entry::Occupied(mut occupied) => occupied.get_mut().merge(child),
                Entry::Vacant(vacant) => {
                    vacant.insert(child);
                }
            }
        }
        self.exact.extend(incoming.exact);
        self.wildcard.extend(incoming.wildcard);
        self.fallback.extend(incoming.fallback);
        if incoming.dynamic.is_some() {
            self.dynamic = incoming.dynamic;
        }
    }
}

/// Descend along `segments`, remove the slot entry at the terminal node, and
/// drop each visited child that ends up empty as the recursion unwinds. The
/// unwind stops cascading by itself: a parent keeping a non-empty child is
/// itself non-empty.
fn remove_pruning(node: &mut RouteNode, segments: &[String], method: &Method, spec: RouteSpec) {
    match segments.split_first() {
        Some((head, rest)) => {
            if let Some(child) = node.children.get_mut(head) {
                remove_pruning(child, rest, method, spec);
                if child.is_empty() {
                    node.children.remove(head);
                }
            }
        }
        None => {
            node.slot_mut(spec).remove(method);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::context::RequestContext;
    use crate::routing::handler::{text_handler, Invocation};
    use crate::routing::lookup::find_handler;

    async fn resolve_body(root: &RouteNode, method: Method, path: &str) -> Option<String> {
        let segments = path_segments(path);
        match find_handler(root, &method, &segments).await {
            Some(handler) => {
                let mut ctx = RequestContext::new(method, path, "localhost");
                handler.call(&mut ctx, Invocation::empty()).await.unwrap();
                Some(ctx.body_text())
            }
            None => None,
        }
    }

    #[test]
    fn test_insert_creates_chain() {
        let mut root = RouteNode::new();
        root.insert(Method::GET, "/a/b/c", text_handler("x"), RouteSpec::Exact);

        let c = root.child("a").and_then(|a| a.child("b")).and_then(|b| b.child("c"));
        assert!(c.is_some());
        assert!(c.unwrap().handler(RouteSpec::Exact, &Method::GET).is_some());
    }

    #[tokio::test]
    async fn test_insert_overwrites_same_slot() {
        let mut root = RouteNode::new();
        root.insert(Method::GET, "/a", text_handler("old"), RouteSpec::Exact);
        root.insert(Method::GET, "/a", text_handler("new"), RouteSpec::Exact);

        assert_eq!(
            resolve_body(&root, Method::GET, "/a").await.as_deref(),
            Some("new")
        );
    }

    #[test]
    fn test_empty_route_registers_at_root() {
        let mut root = RouteNode::new();
        root.insert(Method::GET, "", text_handler("root"), RouteSpec::Exact);
        assert!(root.handler(RouteSpec::Exact, &Method::GET).is_some());
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_remove_prunes_dead_branch() {
        let mut root = RouteNode::new();
        root.insert(Method::GET, "/a/b", text_handler("x"), RouteSpec::Exact);
        root.remove(&Method::GET, "/a/b", RouteSpec::Exact);

        assert!(root.child("a").is_none());
        assert!(root.is_empty());
    }

    #[test]
    fn test_remove_stops_at_first_occupied_ancestor() {
        let mut root = RouteNode::new();
        root.insert(Method::GET, "/a/b", text_handler("b"), RouteSpec::Exact);
        root.insert(Method::GET, "/a/c", text_handler("c"), RouteSpec::Exact);
        root.remove(&Method::GET, "/a/b", RouteSpec::Exact);

        let a = root.child("a").expect("a retained");
        assert!(a.child("b").is_none());
        assert!(a.child("c").is_some());
    }

    #[test]
    fn test_remove_keeps_node_with_other_method() {
        let mut root = RouteNode::new();
        root.insert(Method::GET, "/a", text_handler("get"), RouteSpec::Exact);
        root.insert(Method::POST, "/a", text_handler("post"), RouteSpec::Exact);
        root.remove(&Method::GET, "/a", RouteSpec::Exact);

        let a = root.child("a").expect("a retained");
        assert!(a.handler(RouteSpec::Exact, &Method::GET).is_none());
        assert!(a.handler(RouteSpec::Exact, &Method::POST).is_some());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut root = RouteNode::new();
        root.insert(Method::GET, "/a", text_handler("a"), RouteSpec::Exact);
        root.remove(&Method::GET, "/a/missing/deeper", RouteSpec::Exact);
        root.remove(&Method::GET, "/other", RouteSpec::Exact);
        assert!(root.child("a").is_some());
    }

    #[test]
    fn test_remove_empty_route_is_noop() {
        let mut root = RouteNode::new();
        root.insert(Method::GET, "", text_handler("root"), RouteSpec::Exact);
        root.remove(&Method::GET, "", RouteSpec::Exact);
        // Root registrations are not removable through the path API.
        assert!(root.handler(RouteSpec::Exact, &Method::GET).is_some());
    }

    #[tokio::test]
    async fn test_merge_unions_methods_then_overwrites() {
        let mut root = RouteNode::new();
        root.insert(Method::POST, "/a", text_handler("h2"), RouteSpec::Exact);

        let mut incoming = RouteNode::new();
        incoming.insert(Method::GET, "/a", text_handler("h1"), RouteSpec::Exact);
        root.merge(incoming);

        assert_eq!(
            resolve_body(&root, Method::GET, "/a").await.as_deref(),
            Some("h1")
        );
        assert_eq!(
            resolve_body(&root, Method::POST, "/a").await.as_deref(),
            Some("h2")
        );

        let mut replacement = RouteNode::new();
        replacement.insert(Method::GET, "/a", text_handler("h3"), RouteSpec::Exact);
        root.merge(replacement);

        assert_eq!(
            resolve_body(&root, Method::GET, "/a").await.as_deref(),
            Some("h3")
        );
        assert_eq!(
            resolve_body(&root, Method::POST, "/a").await.as_deref(),
            Some("h2")
        );
    }

    #[test]
    fn test_insert_all_registers_every_route() {
        let mut root = RouteNode::new();
        root.insert_all(
            Method::GET,
            &["/one", "/two/nested", "/three"],
            text_handler("same"),
            RouteSpec::Exact,
        );
        assert!(root.child("one").is_some());
        assert!(root.child("two").and_then(|n| n.child("nested")).is_some());
        assert!(root.child("three").is_some());
    }
}
