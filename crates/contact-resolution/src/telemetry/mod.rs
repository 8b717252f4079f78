//! Telemetry for the contact resolution engine
//!
//! - `metrics` - Prometheus counters and histograms for resolutions
//!
//! Logging goes through `tracing` at the call sites; this module only owns
//! the metric registry.

pub mod metrics;

pub use metrics::{ResolutionMetrics, ResolutionMetricsRegistry, ResolutionTimer};

use thiserror::Error;

/// Telemetry errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Metrics error: {0}")]
    MetricsError(#[from] prometheus::Error),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
