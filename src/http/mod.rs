//! HTTP front end.
//!
//! # Data Flow
//! ```text
//! axum request
//!     → server.rs (catch-all route, request ID, trace, timeout)
//!     → context.rs RequestContext
//!     → Dispatcher::dispatch
//!     → response built from the mutated context
//! ```
//!
//! # Design Decisions
//! - The engine core never sees axum requests; the glue adapts both ways
//! - No-match becomes 404 via the continuation, engine errors become 500

pub mod context;
pub mod server;

pub use context::{path_segments, split_target, QueryMap, RequestContext};
pub use server::DispatchServer;
