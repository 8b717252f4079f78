//! Prometheus metrics for contact resolution
//!
//! - `contact_resolution_resolutions_total` (counter) - outcomes by label
//! - `contact_resolution_match_sets_total` (counter) - exact vs partial match sets
//! - `contact_resolution_ranked_candidates` (histogram) - candidates per ranking
//! - `contact_resolution_duration_seconds` (histogram) - time per resolution
//!
//! # Example
//!
//! ```rust
//! use contact_resolution::telemetry::ResolutionMetricsRegistry;
//!
//! let registry = ResolutionMetricsRegistry::new().unwrap();
//! let metrics = registry.resolution();
//! metrics.record_outcome("success");
//! metrics.record_match_set(false, 1);
//! assert!(registry.encode_text().unwrap().contains("resolutions_total"));
//! ```

use prometheus::{CounterVec, Histogram, HistogramOpts, Opts, Registry};
use std::sync::Arc;
use std::time::Instant;

use super::{Result, TelemetryError};

const NAMESPACE: &str = "contact_resolution";

/// Resolution metrics for Prometheus
pub struct ResolutionMetrics {
    /// Resolutions by outcome label
    resolutions_total: CounterVec,

    /// Match sets by source (exact or partial)
    match_sets_total: CounterVec,

    /// Number of ranked candidates per query
    ranked_candidates: Histogram,

    /// Resolution duration in seconds
    duration_seconds: Histogram,
}

impl ResolutionMetrics {
    /// Create the metrics and register them with `registry`
    pub fn new(registry: &Registry) -> Result<Self> {
        let resolutions_total = CounterVec::new(
            Opts::new("resolutions_total", "Total number of person resolutions by outcome")
                .namespace(NAMESPACE),
            &["outcome"],
        )?;

        let match_sets_total = CounterVec::new(
            Opts::new(
                "match_sets_total",
                "Candidate sets by source: exact matches or partial-match fallback",
            )
            .namespace(NAMESPACE),
            &["source"],
        )?;

        let ranked_candidates = Histogram::with_opts(
            HistogramOpts::new("ranked_candidates", "Number of candidates ranked per query")
                .namespace(NAMESPACE)
                .buckets(vec![0.0, 1.0, 2.0, 3.0, 5.0, 10.0, 25.0, 100.0]),
        )?;

        let duration_seconds = Histogram::with_opts(
            HistogramOpts::new("duration_seconds", "Person resolution duration in seconds")
                .namespace(NAMESPACE)
                .buckets(vec![0.00001, 0.0001, 0.001, 0.01, 0.1, 1.0]),
        )?;

        registry.register(Box::new(resolutions_total.clone()))?;
        registry.register(Box::new(match_sets_total.clone()))?;
        registry.register(Box::new(ranked_candidates.clone()))?;
        registry.register(Box::new(duration_seconds.clone()))?;

        Ok(Self {
            resolutions_total,
            match_sets_total,
            ranked_candidates,
            duration_seconds,
        })
    }

    /// Record a resolution outcome
    pub fn record_outcome(&self, outcome: &str) {
        self.resolutions_total.with_label_values(&[outcome]).inc();
    }

    /// Record how a candidate set was obtained and how large it was
    pub fn record_match_set(&self, used_fallback: bool, candidates: usize) {
        let source = if used_fallback { "partial" } else { "exact" };
        self.match_sets_total.with_label_values(&[source]).inc();
        self.ranked_candidates.observe(candidates as f64);
    }

    /// Observe a resolution duration
    pub fn observe_duration(&self, duration_secs: f64) {
        self.duration_seconds.observe(duration_secs);
    }

    /// Number of resolutions recorded for an outcome label
    pub fn outcome_count(&self, outcome: &str) -> u64 {
        self.resolutions_total.with_label_values(&[outcome]).get() as u64
    }

    /// Start a resolution timer (records the duration on drop)
    pub fn start_timer(&self) -> ResolutionTimer<'_> {
        ResolutionTimer {
            start: Instant::now(),
            metrics: self,
        }
    }
}

/// RAII guard for timing resolutions
pub struct ResolutionTimer<'a> {
    start: Instant,
    metrics: &'a ResolutionMetrics,
}

impl ResolutionTimer<'_> {
    /// Elapsed time in seconds so far
    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Drop for ResolutionTimer<'_> {
    fn drop(&mut self) {
        self.metrics.observe_duration(self.elapsed_secs());
    }
}

/// Registry owning the resolution metrics
pub struct ResolutionMetricsRegistry {
    registry: Arc<Registry>,
    resolution: Arc<ResolutionMetrics>,
}

impl ResolutionMetricsRegistry {
    /// Create a new metrics registry
    pub fn new() -> Result<Self> {
        Self::with_registry(Arc::new(Registry::new()))
    }

    /// Create with an existing Prometheus registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let resolution = Arc::new(ResolutionMetrics::new(&registry)?);
        Ok(Self {
            registry,
            resolution,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    /// Get resolution metrics
    pub fn resolution(&self) -> Arc<ResolutionMetrics> {
        Arc::clone(&self.resolution)
    }

    /// Gather all metrics in Prometheus format
    pub fn gather(&self) -> Vec<prometheus::proto::MetricFamily> {
        self.registry.gather()
    }

    /// Encode metrics as text for scraping
    pub fn encode_text(&self) -> Result<String> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.gather(), &mut buffer)
            .map_err(TelemetryError::MetricsError)?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::EncodingError(e.to_string()))
    }
}
