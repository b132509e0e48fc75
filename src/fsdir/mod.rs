//! Filesystem-backed route registration and serving.
//!
//! # Data Flow
//! ```text
//! Static registration (setup time):
//!     directory scan → one RouteNode per path segment
//!     → exact handler per file (+ default-file alias on the parent)
//!     → caching mode wired in: none | full preload | adaptive group
//!
//! Dynamic registration (setup time):
//!     descriptor attached to one RouteNode
//!
//! Dynamic resolution (request time):
//!     remaining path suffix → stat under the descriptor root
//!     → read-and-respond handler, or no match
//! ```
//!
//! # Design Decisions
//! - Static scans happen once, at registration; a scan failure aborts the
//!   whole call before any route is installed
//! - Dynamic resolution never errors: a path that does not stat cleanly is
//!   a miss, letting lookup fall through to wildcard/fallback
//! - Access checks run before any disk read; denial is a response outcome

pub mod dynamic;
pub mod materialize;
pub mod media;

use std::sync::Arc;

use axum::http::StatusCode;

use crate::error::EngineError;
use crate::http::context::RequestContext;
use crate::routing::handler::{AccessCheck, Handler, Invocation};

pub use dynamic::{DynamicDir, DynamicDirOptions};
pub use materialize::{register_static_dir, CachingMode, StaticDirOptions};
pub use media::{ContentEncoding, MediaTypes};

/// Run the configured access check, writing the denial response when it
/// refuses. Returns the invocation back on success, `None` once a denial
/// response has been produced.
pub(crate) async fn ensure_access(
    check: &Option<Arc<dyn AccessCheck>>,
    denied: &Option<Handler>,
    ctx: &mut RequestContext,
    inv: Invocation,
) -> Result<Option<Invocation>, EngineError> {
    let Some(check) = check else {
        return Ok(Some(inv));
    };
    if check.check(ctx, &inv).await {
        return Ok(Some(inv));
    }
    match denied {
        Some(handler) => handler.call(ctx, inv).await?,
        None => {
            ctx.status = StatusCode::FORBIDDEN;
            ctx.content_type = None;
            ctx.set_text("Access denied");
        }
    }
    Ok(None)
}
