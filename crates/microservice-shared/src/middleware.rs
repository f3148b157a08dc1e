//! HTTP middleware for the microservices.
//!
//! This module provides:
//! - [`ObservabilityLayer`]: Tower middleware wrapping every request in an
//!   `http-request` span and recording request metrics
//! - [`build_cors_layer`]: CORS policy from [`CorsConfig`]
//!
//! # Metrics Recording
//!
//! For every response, regardless of status, the layer increments
//! `http_requests_total` and records `http_request_duration_seconds`, both
//! labeled by method and path. Responses with status >= 400 also increment
//! `http_errors_total`, additionally labeled by status code.
//!
//! Labels are bounded: the path label is the matched route template, or
//! [`UNMATCHED_PATH`] when no route matched, and the method label is one of
//! the standard HTTP methods or [`OTHER_METHOD`].

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::extract::MatchedPath;
use axum::http::{HeaderValue, Method, Request, Response};
use pin_project_lite::pin_project;
use tower::{Layer, Service};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tracing::{info_span, Span};

use crate::{CorsConfig, MetricsRegistry};

/// Path label for requests that matched no route.
pub const UNMATCHED_PATH: &str = "unmatched";

/// Method label for extension methods.
pub const OTHER_METHOD: &str = "OTHER";

/// Resolve the metric label for a request path.
///
/// Uses the matched route template. Raw paths are never used as labels, so
/// arbitrary 404 paths cannot create new series.
pub fn metric_path<B>(req: &Request<B>) -> &str {
    req.extensions()
        .get::<MatchedPath>()
        .map(MatchedPath::as_str)
        .unwrap_or(UNMATCHED_PATH)
}

/// Resolve the metric label for a request method.
pub fn metric_method(method: &Method) -> &'static str {
    match method.as_str() {
        "GET" => "GET",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "PATCH" => "PATCH",
        "HEAD" => "HEAD",
        "OPTIONS" => "OPTIONS",
        "CONNECT" => "CONNECT",
        "TRACE" => "TRACE",
        _ => OTHER_METHOD,
    }
}

// =============================================================================
// ObservabilityLayer - Tower middleware for request spans and metrics
// =============================================================================

/// Tower layer recording request spans and metrics into a [`MetricsRegistry`].
#[derive(Debug, Clone)]
pub struct ObservabilityLayer {
    registry: MetricsRegistry,
}

impl ObservabilityLayer {
    /// Create a layer recording into `registry`.
    pub fn new(registry: MetricsRegistry) -> Self {
        Self { registry }
    }
}

impl<S> Layer<S> for ObservabilityLayer {
    type Service = ObservabilityMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ObservabilityMiddleware {
            inner,
            registry: self.registry.clone(),
        }
    }
}

/// Middleware service produced by [`ObservabilityLayer`].
#[derive(Debug, Clone)]
pub struct ObservabilityMiddleware<S> {
    inner: S,
    registry: MetricsRegistry,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for ObservabilityMiddleware<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: http_body::Body + Send + 'static,
    ResBody: http_body::Body + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = ObservabilityFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let start = Instant::now();

        let method = metric_method(req.method());
        let path = metric_path(&req).to_string();

        let span = info_span!(
            "http-request",
            otel.kind = "server",
            http.method = method,
            http.route = %path,
            http.status_code = tracing::field::Empty,
        );

        {
            let _enter = span.enter();
            tracing::debug!("handling request");
        }

        let future = {
            let _enter = span.enter();
            self.inner.call(req)
        };

        ObservabilityFuture {
            inner: future,
            start,
            method,
            path,
            registry: self.registry.clone(),
            span,
        }
    }
}

pin_project! {
    /// Future wrapper that records metrics on completion.
    pub struct ObservabilityFuture<F> {
        #[pin]
        inner: F,
        start: Instant,
        method: &'static str,
        path: String,
        registry: MetricsRegistry,
        span: Span,
    }
}

impl<F, ResBody, E> Future for ObservabilityFuture<F>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
    ResBody: http_body::Body,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let _enter = this.span.enter();

        match this.inner.poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(result) => {
                let duration = this.start.elapsed();
                let latency_ms = duration.as_secs_f64() * 1000.0;

                // Service errors never reach the client as a response; count them as 500.
                let status = match &result {
                    Ok(response) => response.status().as_u16(),
                    Err(_) => 500,
                };

                this.registry
                    .record_request(this.method, this.path, status, duration);
                this.span.record("http.status_code", status);

                if status >= 500 {
                    tracing::error!(status = status, latency_ms = latency_ms, "request failed");
                } else {
                    tracing::info!(status = status, latency_ms = latency_ms, "request completed");
                }

                Poll::Ready(result)
            }
        }
    }
}

// =============================================================================
// CORS
// =============================================================================

/// Build the CORS layer from configuration.
///
/// Methods and request headers are mirrored back, which permits any of them.
/// An explicit origin allow-list also allows credentials; the `*` wildcard
/// allows any origin without credentials.
pub fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());

    if config.allows_any() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}
