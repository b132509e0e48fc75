//! Routing tree node.
//!
//! # Responsibilities
//! - Map literal path segments to child nodes
//! - Hold the typed reserved slots: exact, wildcard, fallback, dynamic
//!
//! # Design Decisions
//! - Reserved slots are typed fields, not sentinel keys in the child map, so
//!   a literal segment can never collide with them
//! - A parent exclusively owns its children; the tree has no cycles and no
//!   shared nodes, so removal is plain ownership drop

use axum::http::Method;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::fsdir::dynamic::DynamicDir;
use crate::routing::handler::Handler;

/// Which reserved slot a registration targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteSpec {
    /// Matches only when the node is the terminal segment of the request.
    Exact,
    /// Matches at the node regardless of remaining depth.
    Wildcard,
    /// Matches only after deeper and alternate resolution has failed.
    Fallback,
}

/// Per-slot method table.
pub type MethodTable = HashMap<Method, Handler>;

/// One node of the routing tree.
#[derive(Default)]
pub struct RouteNode {
    pub(crate) children: HashMap<String, RouteNode>,
    pub(crate) exact: MethodTable,
    pub(crate) wildcard: MethodTable,
    pub(crate) fallback: MethodTable,
    pub(crate) dynamic: Option<Arc<DynamicDir>>,
}

impl RouteNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Child node for a literal segment.
    pub fn child(&self, segment: &str) -> Option<&RouteNode> {
        self.children.get(segment)
    }

    /// Handler registered under `spec` for `method`, if any.
    pub fn handler(&self, spec: RouteSpec, method: &Method) -> Option<&Handler> {
        self.slot(spec).get(method)
    }

    /// The dynamic-directory descriptor attached to this node, if any.
    pub fn dynamic_dir(&self) -> Option<&Arc<DynamicDir>> {
        self.dynamic.as_ref()
    }

    /// True when the node carries nothing: no children, no handlers, no
    /// dynamic directory. Empty nodes are pruned on removal.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
            && self.exact.is_empty()
            && self.wildcard.is_empty()
            && self.fallback.is_empty()
            && self.dynamic.is_none()
    }

    pub(crate) fn slot(&self, spec: RouteSpec) -> &MethodTable {
        match spec {
            RouteSpec::Exact => &self.exact,
            RouteSpec::Wildcard => &self.wildcard,
            RouteSpec::Fallback => &self.fallback,
        }
    }

    pub(crate) fn slot_mut(&mut self, spec: RouteSpec) -> &mut MethodTable {
        match spec {
            RouteSpec::Exact => &mut self.exact,
            RouteSpec::Wildcard => &mut self.wildcard,
            RouteSpec::Fallback => &mut self.fallback,
        }
    }
}

impl fmt::Debug for RouteNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let methods = |table: &MethodTable| {
            let mut names: Vec<String> = table.keys().map(|m| m.to_string()).collect();
            names.sort();
            names
        };
        f.debug_struct("RouteNode")
            .field("children", &self.children)
            .field("exact", &methods(&self.exact))
            .field("wildcard", &methods(&self.wildcard))
            .field("fallback", &methods(&self.fallback))
            .field("dynamic", &self.dynamic.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::handler::text_handler;

    #[test]
    fn test_fresh_node_is_empty() {
        assert!(RouteNode::new().is_empty());
    }

    #[test]
    fn test_slot_entries_count_as_occupancy() {
        let mut node = RouteNode::new();
        node.slot_mut(RouteSpec::Fallback)
            .insert(Method::GET, text_handler("x"));
        assert!(!node.is_empty());
        assert!(node.handler(RouteSpec::Fallback, &Method::GET).is_some());
        assert!(node.handler(RouteSpec::Exact, &Method::GET).is_none());

        node.slot_mut(RouteSpec::Fallback).remove(&Method::GET);
        assert!(node.is_empty());
    }
}
