//! Request/response context shared with handlers.
//!
//! # Responsibilities
//! - Carry the request method, target, and hostname into dispatch
//! - Expose the mutable response fields handlers write to
//! - Split a raw request target into path and query parameters
//!
//! # Design Decisions
//! - Query parsing is deliberately simple: everything after the first `?` or
//!   `#` is treated as `&`-separated key/value pairs, a key without a value
//!   maps to the empty string, empty keys are dropped
//! - Path segments are not percent-decoded; handlers see them as sent

use axum::http::{Method, StatusCode};
use bytes::Bytes;
use std::collections::HashMap;

/// Parsed query parameters.
pub type QueryMap = HashMap<String, String>;

/// Per-request state: immutable request fields plus the mutable response.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    target: String,
    hostname: String,

    /// Response status. Defaults to 200.
    pub status: StatusCode,
    /// Response content type, rendered as the Content-Type header.
    pub content_type: Option<String>,
    /// Response body.
    pub body: Bytes,
}

impl RequestContext {
    /// Create a context for a request. `target` is the raw path plus optional
    /// query string, e.g. `/docs/index.html?lang=en`.
    pub fn new(method: Method, target: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            hostname: hostname.into(),
            status: StatusCode::OK,
            content_type: None,
            body: Bytes::new(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Set a text response body.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.body = Bytes::from(text.into());
    }

    /// Response body as UTF-8, for logging and tests.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Split a request target into its path and query parameters.
pub fn split_target(target: &str) -> (String, QueryMap) {
    let mut parts = target.split(['?', '#']);
    let path = parts.next().unwrap_or("").to_string();
    let mut query = QueryMap::new();
    for part in parts {
        for pair in part.split('&') {
            let mut kv = pair.splitn(2, '=');
            let key = kv.next().unwrap_or("");
            if !key.is_empty() {
                query.insert(key.to_string(), kv.next().unwrap_or("").to_string());
            }
        }
    }
    (path, query)
}

/// Split a path into its non-empty slash-delimited segments.
pub fn path_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_target_plain() {
        let (path, query) = split_target("/docs/guide");
        assert_eq!(path, "/docs/guide");
        assert!(query.is_empty());
    }

    #[test]
    fn test_split_target_query() {
        let (path, query) = split_target("/search?q=rust&page=2");
        assert_eq!(path, "/search");
        assert_eq!(query.get("q").map(String::as_str), Some("rust"));
        assert_eq!(query.get("page").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_split_target_valueless_and_fragment() {
        let (path, query) = split_target("/p?flag#frag?x=1");
        assert_eq!(path, "/p");
        assert_eq!(query.get("flag").map(String::as_str), Some(""));
        // Everything after a fragment separator is still parsed as pairs.
        assert_eq!(query.get("x").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_split_target_empty_key_dropped() {
        let (_, query) = split_target("/p?=orphan&ok=1");
        assert_eq!(query.len(), 1);
        assert_eq!(query.get("ok").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_path_segments() {
        assert_eq!(path_segments("/a/b/c"), vec!["a", "b", "c"]);
        assert_eq!(path_segments("//a//b/"), vec!["a", "b"]);
        assert!(path_segments("/").is_empty());
        assert!(path_segments("").is_empty());
    }
}
