use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

/// Failures the relay reports to its local caller.
///
/// The wire format is fixed: client-input problems are 400 with a plain
/// text body, upstream transport problems are 500 with the failure text.
/// Upstream application errors never take this path; their status and
/// body pass through verbatim.
#[derive(Debug, ThisError)]
pub enum RelayError {
    #[error("Missing target URL")]
    MissingTargetUrl,

    #[error("Invalid target URL: {0}")]
    InvalidTargetUrl(#[from] url::ParseError),

    #[error("Proxy error: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match &self {
            RelayError::MissingTargetUrl | RelayError::InvalidTargetUrl(_) => {
                StatusCode::BAD_REQUEST
            }
            RelayError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
