//! Prometheus metrics infrastructure for the microservices.
//!
//! This module provides:
//! - [`MetricsConfig`]: Configuration for the metrics system
//! - [`MetricsRegistry`]: An explicitly owned Prometheus recorder
//! - [`metrics_handler`]: Axum handler for the scrape endpoint
//!
//! The registry is never installed as the global `metrics` recorder. Every
//! update is routed through [`metrics::with_local_recorder`], so each
//! registry (one per process, one per test) keeps its own series.
//!
//! # Recorded series
//!
//! - `http_requests_total{method,path}`
//! - `http_request_duration_seconds{method,path}` (histogram)
//! - `http_errors_total{method,path,status_code}` for responses >= 400
//! - `app_uptime_seconds`
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use microservice_shared::metrics::{MetricsConfig, MetricsRegistry};
//!
//! let registry = MetricsRegistry::new(&MetricsConfig::default()).unwrap();
//! registry.record_request("POST", "/hash/", 200, Duration::from_millis(3));
//! assert!(registry.render().contains("http_requests_total"));
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::header::CONTENT_TYPE,
    response::IntoResponse,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::AppState;

/// Counter of handled requests.
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";

/// Histogram of request durations in seconds.
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

/// Counter of responses with status >= 400.
pub const HTTP_ERRORS_TOTAL: &str = "http_errors_total";

/// Gauge of seconds since process start.
pub const APP_UPTIME_SECONDS: &str = "app_uptime_seconds";

/// Default duration buckets, in seconds.
pub const DEFAULT_DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// Content type of the Prometheus text exposition format.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Configuration for the metrics system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Path for the metrics endpoint (e.g., "/metrics").
    pub path: String,
    /// Upper bounds for the request duration histogram.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            path: "/metrics".to_string(),
            duration_buckets: DEFAULT_DURATION_BUCKETS.to_vec(),
        }
    }
}

/// Errors that can occur while building the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    /// The Prometheus builder rejected the configuration.
    #[error("failed to build metrics recorder: {0}")]
    Build(String),
}

/// Process-wide metrics registry.
///
/// Created once at startup and stored in [`AppState`]. Clones share the same
/// series; all updates are atomic.
#[derive(Clone)]
pub struct MetricsRegistry {
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
    started_at: Instant,
}

impl MetricsRegistry {
    /// Build a registry with the configured histogram buckets.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Build`] if the bucket list is empty.
    pub fn new(config: &MetricsConfig) -> Result<Self, MetricsError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(HTTP_REQUEST_DURATION_SECONDS.to_string()),
                &config.duration_buckets,
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?
            .build_recorder();
        let handle = recorder.handle();

        let registry = Self {
            recorder: Arc::new(recorder),
            handle,
            started_at: Instant::now(),
        };
        registry.describe();
        Ok(registry)
    }

    fn scoped<T>(&self, f: impl FnOnce() -> T) -> T {
        metrics::with_local_recorder(self.recorder.as_ref(), f)
    }

    fn describe(&self) {
        self.scoped(|| {
            metrics::describe_counter!(HTTP_REQUESTS_TOTAL, "Total HTTP requests");
            metrics::describe_histogram!(
                HTTP_REQUEST_DURATION_SECONDS,
                metrics::Unit::Seconds,
                "Histogram of HTTP request durations"
            );
            metrics::describe_counter!(HTTP_ERRORS_TOTAL, "Total HTTP error responses");
            metrics::describe_gauge!(
                APP_UPTIME_SECONDS,
                metrics::Unit::Seconds,
                "Application uptime in seconds"
            );
        });
    }

    /// Record one completed request.
    ///
    /// Always increments the request counter and records the duration; the
    /// error counter is incremented only for statuses >= 400.
    pub fn record_request(&self, method: &str, path: &str, status: u16, duration: Duration) {
        self.scoped(|| {
            metrics::counter!(
                HTTP_REQUESTS_TOTAL,
                "method" => method.to_string(),
                "path" => path.to_string()
            )
            .increment(1);

            metrics::histogram!(
                HTTP_REQUEST_DURATION_SECONDS,
                "method" => method.to_string(),
                "path" => path.to_string()
            )
            .record(duration.as_secs_f64());

            if status >= 400 {
                metrics::counter!(
                    HTTP_ERRORS_TOTAL,
                    "method" => method.to_string(),
                    "path" => path.to_string(),
                    "status_code" => status.to_string()
                )
                .increment(1);
            }
        });
    }

    /// Overwrite the uptime gauge.
    pub fn set_uptime(&self, seconds: f64) {
        self.scoped(|| metrics::gauge!(APP_UPTIME_SECONDS).set(seconds));
    }

    /// Elapsed time since the registry was created.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Set the uptime gauge to the current elapsed seconds and return them.
    pub fn refresh_uptime(&self) -> f64 {
        let seconds = self.uptime().as_secs_f64();
        self.set_uptime(seconds);
        seconds
    }

    /// Render all series in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Drain pending histogram samples into their buckets.
    ///
    /// Rendering does this as well; running it periodically bounds memory
    /// when the scrape endpoint is not polled.
    pub fn run_upkeep(&self) {
        self.handle.run_upkeep();
    }
}

impl std::fmt::Debug for MetricsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRegistry")
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

/// Axum handler for the metrics endpoint.
///
/// Returns Prometheus exposition format text.
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        state.metrics().render(),
    )
}
