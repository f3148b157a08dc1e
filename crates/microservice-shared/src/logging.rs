//! Structured logging and distributed tracing setup.
//!
//! This module provides:
//! - [`LoggingConfig`]: Configuration for the logging system
//! - [`init_logging`]: Install the `tracing` subscriber, optionally with an
//!   OpenTelemetry layer exporting spans over OTLP/gRPC
//!
//! # Environment Variables
//!
//! - `LOG_FORMAT`: Output format, either `json` (default) or `text`
//! - `RUST_LOG`: Log level filter (default: `info`)
//!
//! Span export is governed by [`TracingConfig`]. When it is disabled no
//! exporter or tracer provider is created at all; spans still exist locally
//! for log context.
//!
//! # Example
//!
//! ```no_run
//! use microservice_shared::logging::{init_logging, LoggingConfig};
//! use microservice_shared::TracingConfig;
//!
//! # async fn start() -> Result<(), Box<dyn std::error::Error>> {
//! let config = LoggingConfig::from_env().with_service("hash-service");
//! let _guard = init_logging(&config, &TracingConfig::default())?;
//! # Ok(())
//! # }
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    runtime,
    trace::{self, Sampler},
    Resource,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::TracingConfig;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON structured logging (default, production).
    #[default]
    Json,
    /// Human-readable text logging (development).
    Text,
}

impl LogFormat {
    /// Parse log format from string.
    ///
    /// Accepts "json", "text", or "pretty" (alias for text).
    /// Returns `Json` for any other value.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => LogFormat::Text,
            _ => LogFormat::Json,
        }
    }
}

/// Configuration for the logging system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Output format (json or text).
    pub format: LogFormat,
    /// Log level filter (e.g., "info", "debug", "warn").
    pub level: String,
    /// Service name reported on exported spans.
    pub service: Option<String>,
    /// Service version reported on exported spans.
    pub version: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            level: "info".to_string(),
            service: None,
            version: None,
        }
    }
}

impl LoggingConfig {
    /// Create configuration from environment variables.
    ///
    /// - `LOG_FORMAT`: "json" (default) or "text"
    /// - `RUST_LOG`: Log level filter (default: "info")
    pub fn from_env() -> Self {
        let format = std::env::var("LOG_FORMAT")
            .map(|v| LogFormat::parse(&v))
            .unwrap_or(LogFormat::Json);

        let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            format,
            level,
            ..Self::default()
        }
    }

    /// Set the service name.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Set the service version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    fn service_name(&self) -> String {
        self.service
            .clone()
            .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
    }
}

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The OTLP tracer pipeline could not be built.
    #[error("failed to initialize tracer: {0}")]
    TracerInit(#[from] opentelemetry::trace::TraceError),

    /// A global subscriber is already installed.
    #[error("failed to install tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Guard that flushes and shuts down the tracer provider on drop.
///
/// Holds nothing when span export is disabled.
#[must_use = "dropping the guard shuts down span export"]
pub struct TelemetryGuard {
    provider: Option<opentelemetry_sdk::trace::TracerProvider>,
}

impl TelemetryGuard {
    /// Whether spans are being exported.
    pub fn is_exporting(&self) -> bool {
        self.provider.is_some()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("error shutting down tracer provider: {e:?}");
            }
        }
    }
}

fn build_tracer_provider(
    config: &LoggingConfig,
    tracing_config: &TracingConfig,
) -> Result<opentelemetry_sdk::trace::TracerProvider, TelemetryError> {
    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(tracing_config.endpoint());

    let mut attributes = vec![KeyValue::new("service.name", config.service_name())];
    if let Some(version) = &config.version {
        attributes.push(KeyValue::new("service.version", version.clone()));
    }

    let provider = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(
            trace::Config::default()
                .with_sampler(Sampler::AlwaysOn)
                .with_resource(Resource::new(attributes)),
        )
        .install_batch(runtime::Tokio)?;

    Ok(provider)
}

/// Initialize the tracing subscriber with the given configuration.
///
/// Must be called once, from within a Tokio runtime, at application startup.
///
/// # JSON Format (default)
///
/// ```json
/// {"timestamp":"2025-12-30T10:00:00Z","level":"INFO","fields":{"message":"request completed","status":200},"target":"microservice_shared::middleware"}
/// ```
///
/// # Errors
///
/// Returns [`TelemetryError`] if the OTLP pipeline cannot be built or a
/// subscriber is already installed.
pub fn init_logging(
    config: &LoggingConfig,
    tracing_config: &TracingConfig,
) -> Result<TelemetryGuard, TelemetryError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let provider = if tracing_config.enabled {
        Some(build_tracer_provider(config, tracing_config)?)
    } else {
        None
    };
    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(config.service_name()))
    });

    let registry = tracing_subscriber::registry().with(filter).with(otel_layer);

    let installed = match config.format {
        LogFormat::Text => registry.with(fmt::layer().pretty()).try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .try_init(),
    };
    installed.map_err(|e| TelemetryError::SubscriberInit(e.to_string()))?;

    tracing::info!(
        service = %config.service_name(),
        exporting = tracing_config.enabled,
        endpoint = %tracing_config.endpoint(),
        "logging initialized"
    );

    Ok(TelemetryGuard { provider })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("text"), LogFormat::Text);
        assert_eq!(LogFormat::parse("TEXT"), LogFormat::Text);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Text);
        assert_eq!(LogFormat::parse("unknown"), LogFormat::Json);
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "info");
        assert!(config.service.is_none());
        assert_eq!(config.service_name(), "microservice-shared");
    }

    #[test]
    fn test_logging_config_with_service() {
        let config = LoggingConfig::default()
            .with_service("hash-service")
            .with_version("1.0.0");
        assert_eq!(config.service_name(), "hash-service");
        assert_eq!(config.version.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn test_disabled_guard_is_not_exporting() {
        let guard = TelemetryGuard { provider: None };
        assert!(!guard.is_exporting());
    }
}
