//! Engine error definitions.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by dispatch and registration.
///
/// Resolution-phase misses (no matching node, access denied) are response
/// outcomes, not errors, and never appear here. Filesystem failures on a file
/// that was present at resolution time are hard failures of the request.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Read or metadata failure on a path that was expected to be readable.
    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bulk directory scan failed during registration.
    #[error("directory scan failed at {}: {source}", path.display())]
    DirScan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A registration call was given arguments it cannot act on.
    #[error("invalid registration: {0}")]
    Registration(String),

    /// Failure raised by an application handler.
    #[error("handler error: {0}")]
    Handler(Box<dyn std::error::Error + Send + Sync>),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
