//! Health and service-info handlers.
//!
//! `/health/` never checks dependencies: the services hold no external
//! resources, so a responding process is a healthy one.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health status response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Always "healthy" while the process serves requests.
    pub status: String,
}

impl HealthStatus {
    /// Create a healthy status.
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// Greeting returned by the root endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
}

/// Health check handler.
///
/// # Example
///
/// ```text
/// GET /health/
/// {"status":"healthy"}
/// ```
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus::healthy())
}

/// Root handler identifying the service.
///
/// ```text
/// GET /
/// {"message":"Hash Service!"}
/// ```
pub async fn service_info(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: format!("{}!", state.display_name()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_healthy() {
        let status = HealthStatus::healthy();
        assert_eq!(status.status, "healthy");
    }

    #[test]
    fn test_health_status_serialization() {
        let json = serde_json::to_string(&HealthStatus::healthy()).unwrap();
        assert_eq!(json, r#"{"status":"healthy"}"#);
    }

    #[tokio::test]
    async fn test_health_check_handler() {
        let Json(status) = health_check().await;
        assert_eq!(status, HealthStatus::healthy());
    }
}
