//! SHA-256 hashing HTTP microservice.
//!
//! # Endpoints
//!
//! - `POST /hash/` - Hash `{"input_string": "..."}` into `{"hash": "<64 hex chars>"}`
//! - `GET /health/` - Health check
//! - `GET /` - Service greeting
//! - `GET /metrics` - Prometheus metrics endpoint
//!
//! # Configuration
//!
//! - `APP_NAME` / `APP_VERSION` - Service identity (default: hash-service / 1.0.0)
//! - `OTLP_HOST` / `OTLP_PORT` - Trace collector address
//! - `DISABLE_OTEL` - Set to `true` to disable span export
//! - `CORS_ALLOW_ORIGINS` - Comma-separated origin allow-list
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text

use hash_service::HashOperation;
use microservice_shared::{LoggingConfig, ServiceConfig, init_logging, run};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::from_env("hash-service")?;

    let logging_config = LoggingConfig::from_env()
        .with_service(&config.app_name)
        .with_version(&config.app_version);
    let _telemetry = init_logging(&logging_config, &config.tracing)?;

    info!(port = config.port, tracing = config.tracing.enabled, "starting hash service");

    run(HashOperation, config).await.map_err(|e| {
        error!(error = %e, "hash service stopped with an error");
        e
    })?;

    Ok(())
}
