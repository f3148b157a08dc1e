//! The seam between the scaffold and a service's domain logic.

use serde::Serialize;

use crate::ServiceError;

/// A pure computation exposed at `POST /<NAME>/`.
///
/// Implementations validate their input and return either the response body
/// or a typed [`ServiceError`]. The scaffold supplies routing, tracing,
/// metrics and error translation.
///
/// # Example
///
/// ```
/// use microservice_shared::{Operation, ServiceError};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct EchoResponse {
///     echo: String,
/// }
///
/// #[derive(Clone)]
/// struct Echo;
///
/// impl Operation for Echo {
///     const NAME: &'static str = "echo";
///     const DISPLAY_NAME: &'static str = "Echo Service";
///     type Response = EchoResponse;
///
///     fn execute(&self, input: &str) -> Result<EchoResponse, ServiceError> {
///         if input.is_empty() {
///             return Err(ServiceError::invalid_input("Input string cannot be empty"));
///         }
///         Ok(EchoResponse { echo: input.to_string() })
///     }
/// }
///
/// assert_eq!(Echo::route(), "/echo/");
/// assert_eq!(Echo::span_name(), "echo-endpoint");
/// ```
pub trait Operation: Clone + Send + Sync + 'static {
    /// Lowercase operation name; also the route segment.
    const NAME: &'static str;

    /// Human-readable service name, e.g. "Hash Service".
    const DISPLAY_NAME: &'static str;

    /// Successful response body.
    type Response: Serialize + Send + 'static;

    /// Run the operation on `input`.
    fn execute(&self, input: &str) -> Result<Self::Response, ServiceError>;

    /// Route path for the operation endpoint.
    fn route() -> String {
        format!("/{}/", Self::NAME)
    }

    /// Name of the span wrapping each invocation.
    fn span_name() -> String {
        format!("{}-endpoint", Self::NAME)
    }
}
