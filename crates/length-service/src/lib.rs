//! String length operation.
//!
//! The HTTP surface lives in `microservice-shared`; this crate only defines
//! what `POST /length/` computes.

use microservice_shared::{Operation, ServiceError};
use serde::{Deserialize, Serialize};

/// Response body for `POST /length/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthResponse {
    /// Number of characters in the input.
    pub length: usize,
}

/// Count the characters (Unicode scalar values) in `input_string`.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidInput`] if the input is empty. Counting
/// characters of a `&str` cannot fail, so `ComputationFailed` is never
/// produced here even though the taxonomy allows it.
///
/// # Example
///
/// ```
/// use length_service::compute_length;
///
/// assert_eq!(compute_length("test").unwrap(), 4);
/// ```
pub fn compute_length(input_string: &str) -> Result<usize, ServiceError> {
    if input_string.is_empty() {
        return Err(ServiceError::invalid_input("Input string cannot be empty"));
    }

    Ok(input_string.chars().count())
}

/// The length operation mounted at `/length/`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthOperation;

impl Operation for LengthOperation {
    const NAME: &'static str = "length";
    const DISPLAY_NAME: &'static str = "Length Service";
    type Response = LengthResponse;

    fn execute(&self, input: &str) -> Result<LengthResponse, ServiceError> {
        compute_length(input).map(|length| LengthResponse { length })
    }
}
