//! String length HTTP microservice.
//!
//! # Endpoints
//!
//! - `POST /length/` - Count the characters of `{"input_string": "..."}` into `{"length": n}`
//! - `GET /health/` - Health check
//! - `GET /` - Service greeting
//! - `GET /metrics` - Prometheus metrics endpoint
//!
//! # Configuration
//!
//! - `APP_NAME` / `APP_VERSION` - Service identity (default: length-service / 1.0.0)
//! - `OTLP_HOST` / `OTLP_PORT` - Trace collector address
//! - `DISABLE_OTEL` - Set to `true` to disable span export
//! - `CORS_ALLOW_ORIGINS` - Comma-separated origin allow-list
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text

use length_service::LengthOperation;
use microservice_shared::{LoggingConfig, ServiceConfig, init_logging, run};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::from_env("length-service")?;

    let logging_config = LoggingConfig::from_env()
        .with_service(&config.app_name)
        .with_version(&config.app_version);
    let _telemetry = init_logging(&logging_config, &config.tracing)?;

    info!(port = config.port, tracing = config.tracing.enabled, "starting length service");

    run(LengthOperation, config).await.map_err(|e| {
        error!(error = %e, "length service stopped with an error");
        e
    })?;

    Ok(())
}
