//! Test utilities for microservice handler testing.
//!
//! This module provides a router factory backed by a private metrics
//! registry, a scripted [`Operation`] and a reader for rendered Prometheus
//! text.

use axum::Router;
use serde::Serialize;

use crate::{build_router, AppState, MetricsRegistry, Operation, ServiceConfig, ServiceError};

/// Build the full router for `operation` with default configuration.
///
/// Returns the registry the router records into so tests can assert on
/// metrics without touching any global state.
///
/// # Panics
///
/// Panics if the default metrics configuration is rejected, which indicates
/// a test configuration issue.
pub fn test_app<O: Operation>(operation: O) -> (Router, MetricsRegistry) {
    let config = test_config(O::NAME);
    let registry = MetricsRegistry::new(&config.metrics)
        .unwrap_or_else(|e| panic!("failed to build test metrics registry: {e}"));
    let state = AppState::new(&config, O::DISPLAY_NAME, registry.clone());
    (build_router(operation, state, &config), registry)
}

/// Default configuration for `<name>-service` with span export disabled.
pub fn test_config(name: &str) -> ServiceConfig {
    let mut config = ServiceConfig::new(format!("{name}-service"));
    config.tracing.enabled = false;
    config
}

/// Read one sample from Prometheus text exposition output.
///
/// Matches the series named exactly `name` whose label set contains every
/// pair in `labels` (order-insensitive). Returns `None` if no series matches.
pub fn sample_value(rendered: &str, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
    rendered
        .lines()
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| line.rsplit_once(' '))
        .find(|(series, _)| {
            let (series_name, series_labels) = match series.split_once('{') {
                Some((n, rest)) => (n, rest.trim_end_matches('}')),
                None => (*series, ""),
            };
            series_name == name
                && labels
                    .iter()
                    .all(|(k, v)| series_labels.contains(&format!("{k}=\"{v}\"")))
        })
        .and_then(|(_, value)| value.trim().parse().ok())
}

/// Response body of [`TestOperation`].
#[derive(Debug, Clone, Serialize)]
pub struct EchoResponse {
    pub echo: String,
}

/// Scripted operation mounted at `/echo/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestOperation {
    /// Echo the input; empty input is `InvalidInput`.
    Echo,
    /// Always fail with `ComputationFailed`.
    Fail,
    /// Panic with a message that must never reach the client.
    Panic,
}

impl Operation for TestOperation {
    const NAME: &'static str = "echo";
    const DISPLAY_NAME: &'static str = "Echo Service";
    type Response = EchoResponse;

    fn execute(&self, input: &str) -> Result<EchoResponse, ServiceError> {
        match self {
            Self::Echo if input.is_empty() => {
                Err(ServiceError::invalid_input("Input string cannot be empty"))
            }
            Self::Echo => Ok(EchoResponse {
                echo: input.to_string(),
            }),
            Self::Fail => Err(ServiceError::computation_failed(
                Self::NAME,
                "Failed to compute echo",
            )
            .with_detail("error", "backend unavailable")),
            Self::Panic => panic!("secret internal state: {input}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RENDERED: &str = "\
# HELP http_requests_total Total HTTP requests
# TYPE http_requests_total counter
http_requests_total{method=\"POST\",path=\"/hash/\"} 3
http_requests_total{method=\"GET\",path=\"/health/\"} 1
app_uptime_seconds 12.5
";

    #[test]
    fn test_sample_value_matches_labels() {
        assert_eq!(
            sample_value(RENDERED, "http_requests_total", &[("path", "/hash/")]),
            Some(3.0)
        );
        assert_eq!(
            sample_value(
                RENDERED,
                "http_requests_total",
                &[("path", "/health/"), ("method", "GET")]
            ),
            Some(1.0)
        );
    }

    #[test]
    fn test_sample_value_unlabeled_and_missing() {
        assert_eq!(sample_value(RENDERED, "app_uptime_seconds", &[]), Some(12.5));
        assert_eq!(sample_value(RENDERED, "http_errors_total", &[]), None);
        assert_eq!(
            sample_value(RENDERED, "http_requests_total", &[("method", "PUT")]),
            None
        );
    }

    #[test]
    fn test_config_disables_export() {
        let config = test_config("echo");
        assert_eq!(config.app_name, "echo-service");
        assert!(!config.tracing.enabled);
    }
}
