//! Observability: structured logging is initialized in `main`; metric
//! recording lives here.

pub mod metrics;
