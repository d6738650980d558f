//! HTTP plumbing shared by the provider implementations.

use super::GenerationError;
use std::time::Duration;

/// Build a client that enforces the per-request timeout.
pub(super) fn client(timeout: Duration) -> Result<reqwest::Client, GenerationError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Ensure the response has a success status code. Returns the response
/// unchanged on success; maps 429 to [`GenerationError::QuotaExhausted`] and
/// any other failure to [`GenerationError::Api`] with the body text.
pub(super) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, GenerationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    Err(classify_failure(status.as_u16(), body))
}

pub(super) fn classify_failure(status: u16, body: String) -> GenerationError {
    if status == 429 {
        GenerationError::QuotaExhausted { status, body }
    } else {
        GenerationError::Api { status, body }
    }
}

/// Reject blank generations.
pub(super) fn non_empty(text: String) -> Result<String, GenerationError> {
    if text.trim().is_empty() {
        Err(GenerationError::EmptyResponse)
    } else {
        Ok(text)
    }
}
