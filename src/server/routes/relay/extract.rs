use crate::error::RelayError;
use crate::server::router::RelayState;
use axum::extract::{FromRequest, Request};
use tracing::debug;
use url::Url;

/// Where a relayed request is headed.
#[derive(Debug, Clone)]
pub struct ForwardContext {
    pub target: Url,
}

/// Reads the target URL out of the carrier header, leaving the request
/// itself untouched so its body can still be streamed.
pub struct ForwardPreprocess(pub Request, pub ForwardContext);

impl FromRequest<RelayState> for ForwardPreprocess {
    type Rejection = RelayError;

    async fn from_request(req: Request, state: &RelayState) -> Result<Self, Self::Rejection> {
        let raw = req
            .headers()
            .get(&state.target_url_header)
            .and_then(|value| value.to_str().ok())
            .ok_or(RelayError::MissingTargetUrl)?;

        let target = Url::parse(raw)?;

        debug!(method = %req.method(), target = %target, "Relaying request");

        Ok(ForwardPreprocess(req, ForwardContext { target }))
    }
}
