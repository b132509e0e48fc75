//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (method, path segments)
//!     → lookup.rs (precedence-ordered descent)
//!     → node.rs slots: exact | dynamic | wildcard | child | fallback
//!     → Return: matched Handler or explicit no-match
//!
//! Registration (setup or runtime, writer-exclusive):
//!     insert / remove / merge in mutate.rs
//!     → tree of RouteNode, parent exclusively owns children
//! ```
//!
//! # Design Decisions
//! - Lookup is a read-only traversal, safe for any number of concurrent
//!   readers; the dispatcher serializes writers against them with a lock
//! - Removal prunes emptied branches automatically
//! - Precedence order is fixed and documented in lookup.rs

pub mod handler;
pub mod lookup;
pub mod mutate;
pub mod node;

pub use handler::{
    handler_fn, text_handler, AccessCheck, Continue, Handler, Invocation, Next, Respond,
};
pub use lookup::find_handler;
pub use node::{MethodTable, RouteNode, RouteSpec};
