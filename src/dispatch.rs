//! Request dispatch and the registration API.
//!
//! # Responsibilities
//! - Resolve each request against the routing tree and run the handler
//! - Hand unmatched requests to the continuation
//! - Expose tree mutation (insert/remove/merge/bulk/directory mounts)
//! - Trigger the periodic cache rebalance after dispatch
//!
//! # Design Decisions
//! - The tree sits behind a read-write lock: lookups take shared read access
//!   and can overlap freely, registration takes exclusive write access, so
//!   runtime mutation is safe but serialized against in-flight lookups
//! - The matched handler is cloned out of the tree and invoked after the
//!   read guard could be released by the lookup scope
//! - The rebalance trigger is claimed with a compare-and-swap and runs on a
//!   spawned task; dispatch latency never includes a rebalance

use axum::http::Method;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::balancer::BalanceReport;
use crate::cache::manager::CacheManager;
use crate::config::schema::{RouterConfig, StaticDirMount};
use crate::error::{EngineError, EngineResult};
use crate::fsdir::dynamic::{DynamicDir, DynamicDirOptions};
use crate::fsdir::materialize::{register_static_dir, CachingMode, StaticDirOptions};
use crate::http::context::{path_segments, split_target, RequestContext};
use crate::routing::handler::{Handler, Invocation, Next, SharedParam};
use crate::routing::lookup::find_handler;
use crate::routing::node::{RouteNode, RouteSpec};

/// Dispatcher construction options.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Minimum time between adaptive cache rebalance passes. Zero disables
    /// rebalancing.
    pub balance_interval: Duration,
    /// Hostnames this dispatcher answers for. Empty means all.
    pub hostnames: Vec<String>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            balance_interval: Duration::ZERO,
            hostnames: Vec::new(),
        }
    }
}

/// The request-dispatch engine: routing tree, cache, and registration API.
pub struct Dispatcher {
    tree: tokio::sync::RwLock<RouteNode>,
    cache: Arc<CacheManager>,
    hostnames: Vec<String>,
    params: std::sync::RwLock<Arc<[SharedParam]>>,
}

impl Dispatcher {
    pub fn new(options: DispatchOptions) -> Self {
        Self {
            tree: tokio::sync::RwLock::new(RouteNode::new()),
            cache: Arc::new(CacheManager::new(options.balance_interval)),
            hostnames: options.hostnames,
            params: std::sync::RwLock::new(Arc::from(Vec::new())),
        }
    }

    /// Build a dispatcher and register every mount declared in the config.
    pub async fn from_config(config: &RouterConfig) -> EngineResult<Self> {
        let dispatcher = Self::new(DispatchOptions {
            balance_interval: Duration::from_millis(config.cache.balance_interval_ms),
            hostnames: config.hostnames.clone(),
        });

        for mount in &config.static_dirs {
            let options = StaticDirOptions {
                default_file: mount.default_file.clone(),
                caching: caching_mode(mount)?,
                ..StaticDirOptions::default()
            };
            dispatcher
                .add_static_dir(parse_method(&mount.method)?, &mount.route, &mount.dir, options)
                .await?;
        }
        for mount in &config.dynamic_dirs {
            let options = DynamicDirOptions {
                default_file: mount.default_file.clone(),
                ..DynamicDirOptions::default()
            };
            dispatcher
                .add_dynamic_dir(parse_method(&mount.method)?, &mount.route, &mount.dir, options)
                .await;
        }
        Ok(dispatcher)
    }

    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    /// Dispatch one request. Returns once the response fields are populated
    /// or the continuation has taken over. Handler I/O failures propagate;
    /// the caller turns them into a failure response.
    pub async fn dispatch(&self, ctx: &mut RequestContext, next: Next) -> EngineResult<()> {
        if !self.hostnames.is_empty()
            && !self.hostnames.iter().any(|h| h == ctx.hostname())
        {
            next.run(ctx).await;
            return Ok(());
        }

        let (path, query) = split_target(ctx.target());
        let segments = path_segments(&path);

        let handler = {
            let tree = self.tree.read().await;
            find_handler(&tree, ctx.method(), &segments).await
        };

        match handler {
            Some(handler) => {
                tracing::debug!(method = %ctx.method(), path = %path, "Handler matched");
                let invocation = Invocation {
                    segments,
                    query,
                    params: self.params_snapshot(),
                    next: Some(next),
                };
                handler.call(ctx, invocation).await?;
                self.cache.clone().maybe_spawn_rebalance();
                Ok(())
            }
            None => {
                tracing::debug!(method = %ctx.method(), path = %path, "No handler matched");
                next.run(ctx).await;
                Ok(())
            }
        }
    }

    /// Register a handler. An empty route registers at the tree root.
    pub async fn add_handler(
        &self,
        method: Method,
        route: &str,
        handler: Handler,
        spec: RouteSpec,
    ) {
        self.tree.write().await.insert(method, route, handler, spec);
    }

    /// Register the same handler for every route. Not atomic.
    pub async fn add_identical_handlers<S: AsRef<str>>(
        &self,
        method: Method,
        routes: &[S],
        handler: Handler,
        spec: RouteSpec,
    ) {
        self.tree
            .write()
            .await
            .insert_all(method, routes, handler, spec);
    }

    /// Remove a handler, pruning emptied ancestors. Missing routes and empty
    /// routes are no-ops.
    pub async fn remove_handler(&self, method: &Method, route: &str, spec: RouteSpec) {
        self.tree.write().await.remove(method, route, spec);
    }

    /// Deep-merge a prebuilt subtree into the routing tree.
    pub async fn merge_routes(&self, incoming: RouteNode) {
        self.tree.write().await.merge(incoming);
    }

    /// Register every file under `dir` as an exact route below `base_route`.
    pub async fn add_static_dir(
        &self,
        method: Method,
        base_route: &str,
        dir: &Path,
        options: StaticDirOptions,
    ) -> EngineResult<()> {
        let mut tree = self.tree.write().await;
        register_static_dir(&mut tree, &self.cache, method, base_route, dir, options).await
    }

    /// Attach a dynamic directory descriptor at `base_route`.
    pub async fn add_dynamic_dir(
        &self,
        method: Method,
        base_route: &str,
        dir: impl Into<PathBuf>,
        options: DynamicDirOptions,
    ) {
        let descriptor = Arc::new(DynamicDir::new(dir, method, options));
        let mut tree = self.tree.write().await;
        let mut node = &mut *tree;
        for segment in path_segments(base_route) {
            node = node.children.entry(segment).or_default();
        }
        node.dynamic = Some(descriptor);
    }

    /// Read access to the routing tree, for inspection and tests.
    pub async fn routes(&self) -> tokio::sync::RwLockReadGuard<'_, RouteNode> {
        self.tree.read().await
    }

    /// Append values passed to every handler invocation.
    pub fn add_params(&self, params: Vec<SharedParam>) {
        let mut current = self.params.write().expect("params lock poisoned");
        let mut all: Vec<SharedParam> = current.iter().cloned().collect();
        all.extend(params);
        *current = Arc::from(all);
    }

    /// Replace the values passed to every handler invocation.
    pub fn set_params(&self, params: Vec<SharedParam>) {
        *self.params.write().expect("params lock poisoned") = Arc::from(params);
    }

    /// Drop all cached content; counters survive.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Force a rebalance pass now, regardless of the interval.
    pub async fn rebalance(&self) -> BalanceReport {
        self.cache.rebalance().await
    }

    fn params_snapshot(&self) -> Arc<[SharedParam]> {
        self.params.read().expect("params lock poisoned").clone()
    }
}

fn parse_method(name: &str) -> EngineResult<Method> {
    Method::from_str(&name.to_uppercase())
        .map_err(|_| EngineError::Registration(format!("invalid HTTP method `{name}`")))
}

fn caching_mode(mount: &StaticDirMount) -> EngineResult<CachingMode> {
    match mount.caching.as_str() {
        "none" => Ok(CachingMode::None),
        "full" => Ok(CachingMode::Full),
        "adaptive" => Ok(CachingMode::Adaptive {
            max_bytes: mount.max_cache_bytes,
        }),
        other => Err(EngineError::Registration(format!(
            "unknown caching mode `{other}` for mount {}",
            mount.route
        ))),
    }
}
