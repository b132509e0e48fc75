//! Dynamic directory resolution.
//!
//! A dynamic directory binds a node to a live filesystem subtree: every
//! request resolves the remaining path suffix against the directory at that
//! moment, so files added or removed after registration are picked up without
//! re-registering.

use axum::http::Method;
use futures_util::future::BoxFuture;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::EngineError;
use crate::fsdir::media::{self, MediaTypes};
use crate::fsdir::ensure_access;
use crate::http::context::RequestContext;
use crate::routing::handler::{AccessCheck, Handler, HandlerResult, Invocation, Respond};

/// Descriptor for a directory served dynamically. Immutable once attached to
/// a routing node.
pub struct DynamicDir {
    pub(crate) root: PathBuf,
    pub(crate) method: Method,
    pub(crate) default_file: Option<String>,
    pub(crate) media: Arc<MediaTypes>,
    pub(crate) check_access: Option<Arc<dyn AccessCheck>>,
    pub(crate) access_denied: Option<Handler>,
}

/// Optional settings for a dynamic directory registration.
pub struct DynamicDirOptions {
    /// File served when the suffix resolves to a directory.
    pub default_file: Option<String>,
    /// Encoding and MIME lookups, defaulting to the built-in tables.
    pub media: Arc<MediaTypes>,
    /// Capability consulted before serving; refusal produces a denial
    /// response instead of file content.
    pub check_access: Option<Arc<dyn AccessCheck>>,
    /// Handler invoked on refusal instead of the default denial response.
    pub access_denied: Option<Handler>,
}

impl Default for DynamicDirOptions {
    fn default() -> Self {
        Self {
            default_file: None,
            media: Arc::new(MediaTypes::default()),
            check_access: None,
            access_denied: None,
        }
    }
}

impl DynamicDir {
    pub fn new(root: impl Into<PathBuf>, method: Method, options: DynamicDirOptions) -> Self {
        Self {
            root: root.into(),
            method,
            default_file: options.default_file,
            media: options.media,
            check_access: options.check_access,
            access_denied: options.access_denied,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }
}

/// Resolve a path suffix against the descriptor's root.
///
/// Yields a read-and-respond handler when the suffix names an existing file,
/// or the configured default file of an existing directory. Anything else is
/// a miss: the caller continues down the precedence chain.
pub(crate) async fn resolve(ddir: &Arc<DynamicDir>, suffix: &[String]) -> Option<Handler> {
    // Segments must stay inside the mount root.
    if suffix
        .iter()
        .any(|s| s == ".." || s.contains('/') || s.contains('\\'))
    {
        return None;
    }

    let mut path = ddir.root.clone();
    for segment in suffix {
        path.push(segment);
    }

    let meta = tokio::fs::metadata(&path).await.ok()?;
    let file_path = if meta.is_dir() {
        let default_file = ddir.default_file.as_ref()?;
        let candidate = path.join(default_file);
        let meta = tokio::fs::metadata(&candidate).await.ok()?;
        if meta.is_dir() {
            return None;
        }
        candidate
    } else {
        path
    };

    Some(Arc::new(DynamicFileHandler {
        dir: ddir.clone(),
        path: file_path,
    }))
}

/// Serves one resolved file from a dynamic directory. Built per request; the
/// file was present at resolution time, so a failing read here is a hard
/// failure of the request.
struct DynamicFileHandler {
    dir: Arc<DynamicDir>,
    path: PathBuf,
}

impl Respond for DynamicFileHandler {
    fn call<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        inv: Invocation,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            if ensure_access(&self.dir.check_access, &self.dir.access_denied, ctx, inv)
                .await?
                .is_none()
            {
                return Ok(());
            }

            let ext = media::path_extension(&self.path).unwrap_or_default();
            let encoding = self.dir.media.encoding_for(&ext);
            let body = media::read_file(&self.path, encoding).await.map_err(|e| {
                EngineError::Filesystem {
                    path: self.path.clone(),
                    source: e,
                }
            })?;
            if let Some(mime) = self.dir.media.mime_for(&ext) {
                ctx.content_type = Some(mime.to_string());
            }
            ctx.body = body;
            Ok(())
        })
    }
}
