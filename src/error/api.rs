use axum::http::StatusCode;
use thiserror::Error as ThisError;

/// Failures surfaced by the request orchestrator client.
///
/// None of these are retried; every failure is reported to the caller of
/// the client method that produced it.
#[derive(Debug, ThisError)]
pub enum ApiError {
    /// The relay or the local transport failed before an upstream response
    /// was produced.
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx reply. `message` carries the provider's error text when the
    /// body held a parseable error envelope.
    #[error("API request failed ({status}): {message}")]
    UpstreamStatus { status: StatusCode, message: String },

    /// 2xx reply whose payload is not a usable chat completion.
    #[error("Malformed chat completion response: {0}")]
    MalformedResponse(String),
}
