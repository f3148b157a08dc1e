//! Environment-sourced service configuration.
//!
//! # Environment Variables
//!
//! - `APP_NAME`: Service name reported in logs and exported spans
//! - `APP_VERSION`: Service version (default: `1.0.0`)
//! - `OTLP_HOST` / `OTLP_PORT`: Trace collector address
//! - `DISABLE_OTEL`: `true` disables tracing setup and span export
//! - `CORS_ALLOW_ORIGINS`: Comma-separated origin allow-list, `*` for any
//! - `SERVICE_PORT`: HTTP port (default: 8080)
//! - `METRICS_PATH`: Path for the metrics endpoint (default: `/metrics`)

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metrics::MetricsConfig;

/// Default trace collector host.
pub const DEFAULT_OTLP_HOST: &str = "jaeger-collector.default.svc.cluster.local";

/// Default trace collector port (OTLP/gRPC).
pub const DEFAULT_OTLP_PORT: u16 = 4317;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default service version.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Origins allowed when `CORS_ALLOW_ORIGINS` is unset.
pub const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:8080", "http://localhost"];

/// Errors raised while reading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A numeric variable could not be parsed as a port.
    #[error("invalid port in {var}: {value:?}")]
    InvalidPort { var: &'static str, value: String },
}

/// Distributed tracing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracingConfig {
    /// Whether spans are exported to the collector.
    pub enabled: bool,
    /// Collector host name.
    pub otlp_host: String,
    /// Collector gRPC port.
    pub otlp_port: u16,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            otlp_host: DEFAULT_OTLP_HOST.to_string(),
            otlp_port: DEFAULT_OTLP_PORT,
        }
    }
}

impl TracingConfig {
    /// Collector endpoint URL used by the OTLP exporter.
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.otlp_host, self.otlp_port)
    }
}

/// Cross-origin policy settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. A single `*` entry allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}

impl CorsConfig {
    /// Whether the allow-list is the `*` wildcard.
    pub fn allows_any(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// Complete configuration for one microservice process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name (e.g. "hash-service").
    pub app_name: String,
    /// Service version.
    pub app_version: String,
    /// HTTP port to bind on all interfaces.
    pub port: u16,
    pub tracing: TracingConfig,
    pub cors: CorsConfig,
    pub metrics: MetricsConfig,
}

impl ServiceConfig {
    /// Create a configuration with defaults for the given service name.
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            app_version: DEFAULT_VERSION.to_string(),
            port: DEFAULT_PORT,
            tracing: TracingConfig::default(),
            cors: CorsConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// `default_name` is used when `APP_NAME` is not set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPort`] if `OTLP_PORT` or `SERVICE_PORT`
    /// is set but is not a valid port number.
    pub fn from_env(default_name: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(default_name, |key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(default_name: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(lookup("APP_NAME").unwrap_or_else(|| default_name.to_string()));

        if let Some(version) = lookup("APP_VERSION") {
            config.app_version = version;
        }
        if let Some(port) = parse_port(&lookup, "SERVICE_PORT")? {
            config.port = port;
        }

        if let Some(host) = lookup("OTLP_HOST") {
            config.tracing.otlp_host = host;
        }
        if let Some(port) = parse_port(&lookup, "OTLP_PORT")? {
            config.tracing.otlp_port = port;
        }
        config.tracing.enabled = !lookup("DISABLE_OTEL")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        if let Some(origins) = lookup("CORS_ALLOW_ORIGINS") {
            config.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(path) = lookup("METRICS_PATH") {
            config.metrics.path = path;
        }

        Ok(config)
    }
}

fn parse_port<F>(lookup: &F, var: &'static str) -> Result<Option<u16>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<u16>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidPort { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = ServiceConfig::from_lookup("hash-service", lookup_from(&[])).unwrap();

        assert_eq!(config.app_name, "hash-service");
        assert_eq!(config.app_version, "1.0.0");
        assert_eq!(config.port, 8080);
        assert!(config.tracing.enabled);
        assert_eq!(
            config.tracing.endpoint(),
            "http://jaeger-collector.default.svc.cluster.local:4317"
        );
        assert_eq!(
            config.cors.allowed_origins,
            vec!["http://localhost:8080", "http://localhost"]
        );
        assert_eq!(config.metrics.path, "/metrics");
    }

    #[test]
    fn test_config_overrides() {
        let config = ServiceConfig::from_lookup(
            "hash-service",
            lookup_from(&[
                ("APP_NAME", "hasher"),
                ("APP_VERSION", "2.1.0"),
                ("SERVICE_PORT", "9000"),
                ("OTLP_HOST", "collector"),
                ("OTLP_PORT", "4318"),
                ("CORS_ALLOW_ORIGINS", "https://a.example, https://b.example,"),
                ("METRICS_PATH", "/internal/metrics"),
            ]),
        )
        .unwrap();

        assert_eq!(config.app_name, "hasher");
        assert_eq!(config.app_version, "2.1.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.tracing.endpoint(), "http://collector:4318");
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.metrics.path, "/internal/metrics");
    }

    #[test]
    fn test_disable_otel_flag() {
        let disabled =
            ServiceConfig::from_lookup("svc", lookup_from(&[("DISABLE_OTEL", "TRUE")])).unwrap();
        assert!(!disabled.tracing.enabled);

        let enabled =
            ServiceConfig::from_lookup("svc", lookup_from(&[("DISABLE_OTEL", "no")])).unwrap();
        assert!(enabled.tracing.enabled);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = ServiceConfig::from_lookup("svc", lookup_from(&[("SERVICE_PORT", "http")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidPort {
                var: "SERVICE_PORT",
                value: "http".to_string()
            }
        );
        assert!(err.to_string().contains("SERVICE_PORT"));
    }

    #[test]
    fn test_cors_wildcard() {
        let config =
            ServiceConfig::from_lookup("svc", lookup_from(&[("CORS_ALLOW_ORIGINS", "*")])).unwrap();
        assert!(config.cors.allows_any());
        assert!(!CorsConfig::default().allows_any());
    }
}
