//! Shared HTTP scaffold for the hash and length microservices.
//!
//! Both services expose a single computation endpoint and differ only in the
//! [`Operation`] they plug in. Everything else lives here:
//!
//! - [`ServiceConfig`]: Environment-sourced configuration
//! - [`ServiceError`]: Typed domain failures with a fixed HTTP status each
//! - [`ErrorEnvelope`]: Uniform JSON error body written by the error translator
//! - [`ValidatedJson`]: Request body extraction with schema-failure envelopes
//! - [`metrics`]: Prometheus registry owned by the application state
//! - [`logging`]: Structured logging and OTLP span export
//! - [`middleware`]: Request span and request/error/duration metrics
//! - [`server`]: Router construction, uptime updater and HTTP serving
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  ObservabilityLayer (http-request span, metrics) → CORS     │
//! │    → CatchPanic (generic 500)                               │
//! │      → Handler (<operation>-endpoint span)                  │
//! │        → Operation::execute                                 │
//! │        ← ServiceError → ErrorEnvelope                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Testing Support
//!
//! The [`test_utils`] module builds routers and reads rendered metrics. Enable
//! the `test-utils` feature to access it from dependent crates.

#![deny(warnings)]

pub mod config;
mod error;
mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod operation;
mod request;
pub mod server;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{ConfigError, CorsConfig, ServiceConfig, TracingConfig};
pub use error::{Details, ErrorEnvelope, RequestValidationError, ServiceError};
pub use health::{health_check, service_info, HealthStatus, ServiceInfo};
pub use logging::{init_logging, LogFormat, LoggingConfig, TelemetryError, TelemetryGuard};
pub use self::metrics::{metrics_handler, MetricsConfig, MetricsError, MetricsRegistry};
pub use middleware::{build_cors_layer, ObservabilityLayer};
pub use operation::Operation;
pub use request::{ComputeRequest, ValidatedJson};
pub use server::{
    build_router, run, spawn_metrics_upkeep, spawn_uptime_updater, ServerError,
    METRICS_UPKEEP_INTERVAL, UPTIME_REFRESH_INTERVAL,
};
pub use state::AppState;
