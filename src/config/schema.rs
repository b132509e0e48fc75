//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML config files,
//! and every field has a default so a minimal config stays minimal.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the router binary.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Hostnames answered by this router. Empty means all hostnames.
    pub hostnames: Vec<String>,

    /// Adaptive cache settings.
    pub cache: CacheConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Static directory mounts registered at startup.
    pub static_dirs: Vec<StaticDirMount>,

    /// Dynamic directory mounts registered at startup.
    pub dynamic_dirs: Vec<DynamicDirMount>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Adaptive cache settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Minimum milliseconds between rebalance passes. Zero disables them.
    pub balance_interval_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            balance_interval_ms: 0,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Whether to expose Prometheus metrics.
    pub metrics_enabled: bool,

    /// Address for the metrics exporter listener.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// One static directory mount.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StaticDirMount {
    /// HTTP method served (default GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Route the directory is mounted under.
    pub route: String,

    /// Directory to scan.
    pub dir: PathBuf,

    /// File name additionally served for its parent directory path.
    #[serde(default)]
    pub default_file: Option<String>,

    /// Caching mode: "none", "full", or "adaptive".
    #[serde(default = "default_caching")]
    pub caching: String,

    /// Byte budget for adaptive caching.
    #[serde(default)]
    pub max_cache_bytes: u64,
}

/// One dynamic directory mount.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DynamicDirMount {
    /// HTTP method served (default GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Route the directory is mounted under.
    pub route: String,

    /// Directory resolved per request.
    pub dir: PathBuf,

    /// File served when a suffix resolves to a directory.
    #[serde(default)]
    pub default_file: Option<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_caching() -> String {
    "none".to_string()
}
