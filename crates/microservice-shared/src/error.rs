//! Typed service failures and their JSON error envelope.
//!
//! Every [`ServiceError`] variant maps to exactly one HTTP status. Handlers
//! return `Result<_, ServiceError>` and axum invokes the [`IntoResponse`]
//! implementation below, which is the only place domain errors are turned
//! into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Structured details attached to a failure.
pub type Details = Map<String, Value>;

/// Type tag for [`ServiceError::InvalidInput`].
pub const TYPE_INVALID_INPUT: &str = "invalidinputerror";

/// Type tag for request bodies that do not match the expected schema.
pub const TYPE_REQUEST_VALIDATION: &str = "requestvalidationerror";

/// Type tag for paths outside the route table.
pub const TYPE_NOT_FOUND: &str = "notfounderror";

/// Type tag for unhandled faults.
pub const TYPE_INTERNAL: &str = "internalservererror";

/// Uniform JSON body for every error response.
///
/// # Example
///
/// ```
/// use microservice_shared::ServiceError;
///
/// let envelope = ServiceError::invalid_input("Input string cannot be empty").to_envelope();
/// assert_eq!(envelope.kind, "invalidinputerror");
/// assert!(envelope.details.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Human-readable message.
    pub message: String,

    /// Stable lowercase identifier of the error kind.
    #[serde(rename = "type")]
    pub kind: String,

    /// Structured details, serialized as `null` when absent.
    pub details: Option<Vec<Details>>,
}

impl ErrorEnvelope {
    /// Create an envelope without details.
    pub fn new(message: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: kind.into(),
            details: None,
        }
    }

    /// Append one structured record to the details list.
    pub fn with_details(mut self, record: Details) -> Self {
        self.details.get_or_insert_with(Vec::new).push(record);
        self
    }

    /// Generic envelope for unexpected faults. Carries no internal detail.
    pub fn internal() -> Self {
        Self::new("Internal Server Error", TYPE_INTERNAL)
    }

    /// Render this envelope with the given status code.
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// Domain failure raised by an [`Operation`](crate::Operation).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    /// The caller supplied empty or otherwise unusable input (HTTP 400).
    #[error("{message}")]
    InvalidInput {
        message: String,
        details: Option<Details>,
    },

    /// The operation failed on otherwise valid input (HTTP 422).
    #[error("{message}")]
    ComputationFailed {
        /// Name of the failing operation, used for the type tag.
        operation: &'static str,
        message: String,
        details: Option<Details>,
    },
}

impl ServiceError {
    /// Create an [`ServiceError::InvalidInput`] without details.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            details: None,
        }
    }

    /// Create a [`ServiceError::ComputationFailed`] for `operation`.
    pub fn computation_failed(operation: &'static str, message: impl Into<String>) -> Self {
        Self::ComputationFailed {
            operation,
            message: message.into(),
            details: None,
        }
    }

    /// Attach a detail entry.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let details = match &mut self {
            Self::InvalidInput { details, .. } | Self::ComputationFailed { details, .. } => details,
        };
        details
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// HTTP status for this variant.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Self::ComputationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Machine-readable type tag, e.g. `invalidinputerror` or `hashcomputationerror`.
    pub fn type_tag(&self) -> String {
        match self {
            Self::InvalidInput { .. } => TYPE_INVALID_INPUT.to_string(),
            Self::ComputationFailed { operation, .. } => {
                format!("{}computationerror", operation.to_lowercase())
            }
        }
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput { message, .. } | Self::ComputationFailed { message, .. } => message,
        }
    }

    /// Structured details, if any.
    pub fn details(&self) -> Option<&Details> {
        match self {
            Self::InvalidInput { details, .. } | Self::ComputationFailed { details, .. } => {
                details.as_ref()
            }
        }
    }

    /// Build the error envelope for this failure.
    pub fn to_envelope(&self) -> ErrorEnvelope {
        let envelope = ErrorEnvelope::new(self.message(), self.type_tag());
        match self.details() {
            Some(details) => envelope.with_details(details.clone()),
            None => envelope,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        self.to_envelope().into_response_with(status)
    }
}

/// Request body did not match the expected schema.
///
/// Raised by [`ValidatedJson`](crate::ValidatedJson) before any domain code
/// runs. Always answered with HTTP 422.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("request validation failed: {reason}")]
pub struct RequestValidationError {
    /// Parser or content-type failure description.
    pub reason: String,
}

impl RequestValidationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl IntoResponse for RequestValidationError {
    fn into_response(self) -> Response {
        let mut record = Details::new();
        record.insert("error".to_string(), Value::String(self.reason));

        ErrorEnvelope::new("Request body failed validation", TYPE_REQUEST_VALIDATION)
            .with_details(record)
            .into_response_with(StatusCode::UNPROCESSABLE_ENTITY)
    }
}
