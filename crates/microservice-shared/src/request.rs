//! Request types and body extraction for HTTP endpoints.

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::RequestValidationError;

/// Request body shared by every computation endpoint.
///
/// An empty `input_string` is well-formed here; rejecting it is the
/// operation's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeRequest {
    /// Text the operation is applied to.
    pub input_string: String,
}

/// JSON body extractor that answers schema failures with an error envelope.
///
/// Malformed JSON, missing or mistyped fields and a missing
/// `Content-Type: application/json` header all become a
/// [`RequestValidationError`] (HTTP 422).
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = RequestValidationError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(reason = %rejection.body_text(), "request body rejected");
                Err(RequestValidationError::new(rejection.body_text()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;

    fn json_request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/hash/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[test]
    fn test_compute_request_deserialization() {
        let request: ComputeRequest = serde_json::from_str(r#"{"input_string":"test"}"#).unwrap();
        assert_eq!(request.input_string, "test");
    }

    #[test]
    fn test_compute_request_accepts_empty_string() {
        let request: ComputeRequest = serde_json::from_str(r#"{"input_string":""}"#).unwrap();
        assert!(request.input_string.is_empty());
    }

    #[test]
    fn test_compute_request_rejects_wrong_type() {
        let result = serde_json::from_str::<ComputeRequest>(r#"{"input_string":123}"#);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_validated_json_extracts_body() {
        let ValidatedJson(request) =
            ValidatedJson::<ComputeRequest>::from_request(json_request(r#"{"input_string":"abc"}"#), &())
                .await
                .unwrap();
        assert_eq!(request.input_string, "abc");
    }

    #[tokio::test]
    async fn test_validated_json_missing_field() {
        let err = ValidatedJson::<ComputeRequest>::from_request(json_request("{}"), &())
            .await
            .unwrap_err();
        assert!(err.reason.contains("input_string"));
    }

    #[tokio::test]
    async fn test_validated_json_missing_content_type() {
        let request = Request::builder()
            .method("POST")
            .uri("/hash/")
            .body(Body::from(r#"{"input_string":"abc"}"#))
            .unwrap();

        let result = ValidatedJson::<ComputeRequest>::from_request(request, &()).await;
        assert!(result.is_err());
    }
}
