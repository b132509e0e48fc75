//! Semantic configuration checks, run after deserialization.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::Method;

use crate::config::schema::RouterConfig;

/// One semantic problem found in a config.
#[derive(Debug)]
pub enum ValidationError {
    BadBindAddress(String),
    BadMetricsAddress(String),
    BadMethod { route: String, method: String },
    BadRoute(String),
    BadCachingMode { route: String, mode: String },
    ZeroCacheBudget(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::BadBindAddress(addr) => {
                write!(f, "listener.bind_address `{addr}` is not a socket address")
            }
            ValidationError::BadMetricsAddress(addr) => {
                write!(f, "observability.metrics_address `{addr}` is not a socket address")
            }
            ValidationError::BadMethod { route, method } => {
                write!(f, "mount {route}: `{method}` is not an HTTP method")
            }
            ValidationError::BadRoute(route) => {
                write!(f, "mount route `{route}` must start with `/`")
            }
            ValidationError::BadCachingMode { route, mode } => {
                write!(
                    f,
                    "mount {route}: caching mode `{mode}` is not one of none/full/adaptive"
                )
            }
            ValidationError::ZeroCacheBudget(route) => {
                write!(f, "mount {route}: adaptive caching needs max_cache_bytes > 0")
            }
        }
    }
}

/// Validate a parsed config, collecting every problem rather than stopping
/// at the first.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BadBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::BadMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    for mount in &config.static_dirs {
        check_route(&mount.route, &mut errors);
        check_method(&mount.route, &mount.method, &mut errors);
        match mount.caching.as_str() {
            "none" | "full" => {}
            "adaptive" => {
                if mount.max_cache_bytes == 0 {
                    errors.push(ValidationError::ZeroCacheBudget(mount.route.clone()));
                }
            }
            other => errors.push(ValidationError::BadCachingMode {
                route: mount.route.clone(),
                mode: other.to_string(),
            }),
        }
    }
    for mount in &config.dynamic_dirs {
        check_route(&mount.route, &mut errors);
        check_method(&mount.route, &mount.method, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_route(route: &str, errors: &mut Vec<ValidationError>) {
    // An empty route mounts at the tree root; anything else must be absolute.
    if !route.is_empty() && !route.starts_with('/') {
        errors.push(ValidationError::BadRoute(route.to_string()));
    }
}

fn check_method(route: &str, method: &str, errors: &mut Vec<ValidationError>) {
    if Method::from_str(&method.to_uppercase()).is_err() {
        errors.push(ValidationError::BadMethod {
            route: route.to_string(),
            method: method.to_string(),
        });
    }
}
