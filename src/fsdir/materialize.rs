//! Static directory materialization.
//!
//! Walks a filesystem subtree once at registration time and installs one
//! exact handler per discovered file. The directory is assumed immutable
//! afterwards; files added later are not picked up (use a dynamic directory
//! for that).

use axum::http::Method;
use futures_util::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::manager::CacheManager;
use crate::cache::adaptive::AdaptationGroup;
use crate::cache::store::CacheEntry;
use crate::error::{EngineError, EngineResult};
use crate::fsdir::ensure_access;
use crate::fsdir::media::{self, MediaTypes};
use crate::http::context::{path_segments, RequestContext};
use crate::routing::handler::{AccessCheck, Handler, HandlerResult, Invocation, Respond};
use crate::routing::node::RouteNode;

/// How a static directory's content is cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachingMode {
    /// Every request reads from disk.
    None,
    /// Every file is read into the store at registration time.
    Full,
    /// Files are promoted on demand within a byte budget and rebalanced by
    /// observed request frequency.
    Adaptive { max_bytes: u64 },
}

/// Optional settings for a static directory registration.
pub struct StaticDirOptions {
    /// File name that is additionally served for its parent directory path.
    pub default_file: Option<String>,
    /// Encoding and MIME lookups, defaulting to the built-in tables.
    pub media: Arc<MediaTypes>,
    /// Capability consulted before serving.
    pub check_access: Option<Arc<dyn AccessCheck>>,
    /// Handler invoked on refusal instead of the default denial response.
    pub access_denied: Option<Handler>,
    pub caching: CachingMode,
}

impl Default for StaticDirOptions {
    fn default() -> Self {
        Self {
            default_file: None,
            media: Arc::new(MediaTypes::default()),
            check_access: None,
            access_denied: None,
            caching: CachingMode::None,
        }
    }
}

/// Scan `dir` and register an exact handler for every file under
/// `base_route`. A file named like `default_file` is additionally bound to
/// its parent node, so the directory path itself serves it.
///
/// The scan and any full-mode preload run before any route is installed; a
/// failure there aborts the whole call with the tree untouched.
pub async fn register_static_dir(
    root: &mut RouteNode,
    cache: &Arc<CacheManager>,
    method: Method,
    base_route: &str,
    dir: &Path,
    options: StaticDirOptions,
) -> EngineResult<()> {
    let files = collect_files(dir).await?;

    let caching_label = match options.caching {
        CachingMode::None => "none",
        CachingMode::Full => "full",
        CachingMode::Adaptive { .. } => "adaptive",
    };
    let group = match options.caching {
        CachingMode::None => None,
        CachingMode::Full => {
            preload_all(cache, dir, &files, &options.media).await?;
            None
        }
        CachingMode::Adaptive { max_bytes } => {
            Some(cache.create_group(max_bytes, options.media.clone()))
        }
    };

    let shared = Arc::new(StaticShared {
        media: options.media,
        check_access: options.check_access,
        access_denied: options.access_denied,
        cache: cache.clone(),
        group,
    });

    let mut base = root;
    for segment in path_segments(base_route) {
        base = base.children.entry(segment).or_default();
    }

    for rel in &files {
        let abs = dir.join(rel);
        let handler: Handler = Arc::new(StaticFileHandler {
            shared: shared.clone(),
            path: abs,
        });

        let segments: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let Some((leaf, parents)) = segments.split_last() else {
            continue;
        };

        let mut node = &mut *base;
        for segment in parents {
            node = node.children.entry(segment.clone()).or_default();
        }
        // Intentional double binding: the default file also answers for its
        // parent directory path.
        if options
            .default_file
            .as_deref()
            .is_some_and(|name| name == leaf.as_str())
        {
            node.exact.insert(method.clone(), handler.clone());
        }
        let leaf_node = node.children.entry(leaf.clone()).or_default();
        leaf_node.exact.insert(method.clone(), handler);
    }

    tracing::info!(
        dir = %dir.display(),
        base_route = %base_route,
        files = files.len(),
        caching = caching_label,
        "Static directory registered"
    );
    Ok(())
}

/// Read every discovered file into the store up front. Any failure aborts
/// the registration.
async fn preload_all(
    cache: &Arc<CacheManager>,
    dir: &Path,
    files: &[PathBuf],
    media_types: &Arc<MediaTypes>,
) -> EngineResult<()> {
    for rel in files {
        let abs = dir.join(rel);
        let ext = media::path_extension(&abs).unwrap_or_default();
        let encoding = media_types.encoding_for(&ext);
        let content_type = media_types.mime_for(&ext).map(str::to_string);
        let body = media::read_file(&abs, encoding)
            .await
            .map_err(|e| EngineError::Filesystem {
                path: abs.clone(),
                source: e,
            })?;
        cache.store().insert(abs, CacheEntry { body, content_type });
    }
    Ok(())
}

/// Recursively list the files under `dir`, as paths relative to it. Sorted
/// for deterministic registration order.
pub(crate) async fn collect_files(dir: &Path) -> EngineResult<Vec<PathBuf>> {
    let mut out = Vec::new();
    walk(dir, PathBuf::new(), &mut out).await?;
    out.sort();
    Ok(out)
}

fn walk<'a>(
    dir: &'a Path,
    rel: PathBuf,
    out: &'a mut Vec<PathBuf>,
) -> BoxFuture<'a, EngineResult<()>> {
    Box::pin(async move {
        let scan_err = |e: std::io::Error| EngineError::DirScan {
            path: dir.to_path_buf(),
            source: e,
        };
        let mut entries = tokio::fs::read_dir(dir).await.map_err(scan_err)?;
        while let Some(entry) = entries.next_entry().await.map_err(scan_err)? {
            let file_type = entry.file_type().await.map_err(scan_err)?;
            let child_rel = rel.join(entry.file_name());
            if file_type.is_dir() {
                let child_dir = entry.path();
                walk(&child_dir, child_rel, out).await?;
            } else if file_type.is_file() {
                out.push(child_rel);
            }
        }
        Ok(())
    })
}

struct StaticShared {
    media: Arc<MediaTypes>,
    check_access: Option<Arc<dyn AccessCheck>>,
    access_denied: Option<Handler>,
    cache: Arc<CacheManager>,
    group: Option<Arc<AdaptationGroup>>,
}

/// Serves one materialized file: store first, disk otherwise; records
/// request statistics when the registration is adaptive.
struct StaticFileHandler {
    shared: Arc<StaticShared>,
    path: PathBuf,
}

impl Respond for StaticFileHandler {
    fn call<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        inv: Invocation,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            if ensure_access(
                &self.shared.check_access,
                &self.shared.access_denied,
                ctx,
                inv,
            )
            .await?
            .is_none()
            {
                return Ok(());
            }

            if let Some(entry) = self.shared.cache.store().get(&self.path) {
                if let Some(mime) = &entry.content_type {
                    ctx.content_type = Some(mime.clone());
                }
                ctx.body = entry.body.clone();
                if let Some(group) = &self.shared.group {
                    let bytes = entry.body.len() as u64;
                    self.shared.cache.record_hit(group, &self.path, bytes, || {
                        CacheEntry {
                            body: entry.body.clone(),
                            content_type: entry.content_type.clone(),
                        }
                    });
                }
                return Ok(());
            }

            let ext = media::path_extension(&self.path).unwrap_or_default();
            let encoding = self.shared.media.encoding_for(&ext);
            let content_type = self.shared.media.mime_for(&ext).map(str::to_string);
            let body =
                media::read_file(&self.path, encoding)
                    .await
                    .map_err(|e| EngineError::Filesystem {
                        path: self.path.clone(),
                        source: e,
                    })?;
            if let Some(mime) = &content_type {
                ctx.content_type = Some(mime.clone());
            }
            ctx.body = body.clone();

            if let Some(group) = &self.shared.group {
                let bytes = body.len() as u64;
                self.shared.cache.record_hit(group, &self.path, bytes, || {
                    CacheEntry { body, content_type }
                });
            }
            Ok(())
        })
    }
}
