//! Router construction and process bootstrap.
//!
//! [`build_router`] assembles the full HTTP surface for an [`Operation`]:
//!
//! - `POST /<operation>/` - run the operation
//! - `GET /health/` - health check
//! - `GET /` - service greeting
//! - `GET /metrics` - Prometheus scrape endpoint (path configurable)
//!
//! [`run`] wires that router to a fresh [`MetricsRegistry`], starts the uptime
//! updater and histogram upkeep, and serves until Ctrl-C or SIGTERM.

use std::any::Any;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    http::{StatusCode, Uri},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use thiserror::Error;
use tokio::task::JoinHandle;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{info, info_span, warn};

use crate::{
    build_cors_layer, health_check, metrics_handler, service_info, AppState, ComputeRequest,
    ErrorEnvelope, MetricsError, MetricsRegistry, ObservabilityLayer, Operation, ServiceConfig,
    ServiceError, ValidatedJson,
};
use crate::error::TYPE_NOT_FOUND;

/// Interval between uptime gauge refreshes.
pub const UPTIME_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Interval between histogram upkeep runs.
pub const METRICS_UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Errors that stop the server from starting or serving.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Metrics(#[from] MetricsError),

    /// Binding or serving the listener failed.
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run `operation` on a request body inside its `<operation>-endpoint` span.
async fn operation_handler<O: Operation>(
    operation: O,
    ValidatedJson(request): ValidatedJson<ComputeRequest>,
) -> Result<Json<O::Response>, ServiceError> {
    let span = info_span!(
        "operation",
        otel.name = %O::span_name(),
        operation = O::NAME,
        input_len = request.input_string.len(),
    );

    let result = span.in_scope(|| operation.execute(&request.input_string));

    match result {
        Ok(response) => Ok(Json(response)),
        Err(error) => {
            span.in_scope(|| {
                warn!(
                    error = %error,
                    status = error.status().as_u16(),
                    kind = %error.type_tag(),
                    "operation failed"
                )
            });
            Err(error)
        }
    }
}

/// Translate a panic into a generic 500 envelope.
///
/// The panic payload is logged but never returned to the caller.
fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let reason = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(reason = %reason, "unhandled fault while serving request");

    ErrorEnvelope::internal().into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Fallback for paths outside the route table.
async fn not_found(uri: Uri) -> Response {
    ErrorEnvelope::new(format!("No route for {}", uri.path()), TYPE_NOT_FOUND)
        .into_response_with(StatusCode::NOT_FOUND)
}

/// Build the router for `operation`.
///
/// Layers, outermost first: observability (span and metrics), CORS, panic
/// translation. Observability sits outside CORS so preflight requests
/// answered by the CORS layer are still traced and counted. Domain errors are translated by [`ServiceError`]'s
/// `IntoResponse` implementation inside the handler.
pub fn build_router<O: Operation>(operation: O, state: AppState, config: &ServiceConfig) -> Router {
    let metrics = state.metrics().clone();

    Router::new()
        .route(
            &O::route(),
            post(move |body: ValidatedJson<ComputeRequest>| {
                operation_handler(operation.clone(), body)
            }),
        )
        .route("/health/", get(health_check))
        .route("/", get(service_info))
        .route(&config.metrics.path, get(metrics_handler))
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(build_cors_layer(&config.cors))
        .layer(ObservabilityLayer::new(metrics))
        .with_state(state)
}

/// Start the background task refreshing the uptime gauge.
///
/// The gauge is set immediately and then every `period`. The task runs until
/// the runtime shuts down; callers may drop the handle.
pub fn spawn_uptime_updater(registry: MetricsRegistry, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            registry.refresh_uptime();
        }
    })
}

/// Start the background task draining histogram samples.
///
/// Keeps recorder memory bounded when nothing scrapes the metrics endpoint.
pub fn spawn_metrics_upkeep(registry: MetricsRegistry, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            registry.run_upkeep();
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}

/// Build, instrument and serve `operation` until a shutdown signal arrives.
///
/// # Errors
///
/// Returns [`ServerError`] if the metrics registry cannot be built or the
/// listener cannot be bound.
pub async fn run<O: Operation>(operation: O, config: ServiceConfig) -> Result<(), ServerError> {
    let registry = MetricsRegistry::new(&config.metrics)?;
    let state = AppState::new(&config, O::DISPLAY_NAME, registry.clone());
    let app = build_router(operation, state, &config);

    // Detached: the handles are dropped and the tasks end with the runtime.
    drop(spawn_metrics_upkeep(registry.clone(), METRICS_UPKEEP_INTERVAL));
    drop(spawn_uptime_updater(registry, UPTIME_REFRESH_INTERVAL));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        addr = %addr,
        service = %config.app_name,
        version = %config.app_version,
        route = %O::route(),
        "listening on"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
