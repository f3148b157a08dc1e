//! Application state for HTTP microservices.
//!
//! This module provides the shared state structure that axum handlers use to
//! reach the metrics registry and service identity.

use std::sync::Arc;

use crate::{MetricsRegistry, ServiceConfig};

/// Shared application state for all axum handlers.
///
/// This struct is cheaply cloneable (using `Arc` internally) and should be
/// shared via axum's `State` extractor.
///
/// # Example
///
/// ```
/// use microservice_shared::{AppState, MetricsRegistry, ServiceConfig};
///
/// let config = ServiceConfig::new("hash-service");
/// let registry = MetricsRegistry::new(&config.metrics).unwrap();
/// let state = AppState::new(&config, "Hash Service", registry);
/// assert_eq!(state.service_name(), "hash-service");
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    service_name: String,
    service_version: String,
    display_name: String,
    metrics: MetricsRegistry,
}

impl AppState {
    /// Create state for a service from its configuration and metrics registry.
    pub fn new(
        config: &ServiceConfig,
        display_name: impl Into<String>,
        metrics: MetricsRegistry,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                service_name: config.app_name.clone(),
                service_version: config.app_version.clone(),
                display_name: display_name.into(),
                metrics,
            }),
        }
    }

    /// Configured service name.
    pub fn service_name(&self) -> &str {
        &self.inner.service_name
    }

    /// Configured service version.
    pub fn service_version(&self) -> &str {
        &self.inner.service_version
    }

    /// Human-readable service name, e.g. "Length Service".
    pub fn display_name(&self) -> &str {
        &self.inner.display_name
    }

    /// Process-wide metrics registry.
    pub fn metrics(&self) -> &MetricsRegistry {
        &self.inner.metrics
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_name", &self.inner.service_name)
            .field("service_version", &self.inner.service_version)
            .finish_non_exhaustive()
    }
}
