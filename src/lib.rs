//! Hierarchical request-dispatch engine with adaptive file caching.
//!
//! Maps an incoming request (HTTP method + slash-delimited path) to a
//! registered handler through a tree of path segments with exact, wildcard,
//! fallback, and filesystem-backed dynamic nodes; decides, from observed
//! request frequency, which served files are worth holding in memory under
//! per-group byte budgets.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────────┐
//!                    │                 ADAPTIVE ROUTER                    │
//!                    │                                                    │
//!   Request          │  ┌────────┐    ┌──────────┐    ┌───────────────┐  │
//!   ─────────────────┼─▶│  http  │───▶│ dispatch │───▶│    routing    │  │
//!                    │  │ server │    │          │    │ exact│wild│fb  │  │
//!                    │  └────────┘    └────┬─────┘    └───────┬───────┘  │
//!                    │                     │                  │          │
//!                    │                     │                  ▼          │
//!                    │                     │          ┌───────────────┐  │
//!                    │                     │          │     fsdir     │  │
//!                    │                     │          │ static│dynamic│  │
//!                    │                     │          └───────┬───────┘  │
//!                    │                     ▼                  │          │
//!   Response         │               ┌──────────┐             │          │
//!   ◀────────────────┼───────────────│  cache   │◀────────────┘          │
//!                    │               │ store +  │                        │
//!                    │               │ balancer │                        │
//!                    │               └──────────┘                        │
//!                    │                                                    │
//!                    │  ┌──────────────────────────────────────────────┐ │
//!                    │  │  config        observability (tracing,       │ │
//!                    │  │  (toml)        metrics)                      │ │
//!                    │  └──────────────────────────────────────────────┘ │
//!                    └───────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod routing;

// Content serving
pub mod cache;
pub mod fsdir;

// Cross-cutting concerns
pub mod observability;

pub use config::RouterConfig;
pub use dispatch::{DispatchOptions, Dispatcher};
pub use error::{EngineError, EngineResult};
pub use fsdir::{CachingMode, DynamicDirOptions, MediaTypes, StaticDirOptions};
pub use http::context::RequestContext;
pub use http::server::DispatchServer;
pub use routing::{Handler, Invocation, Next, Respond, RouteNode, RouteSpec};
