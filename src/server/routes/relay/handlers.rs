use super::extract::{ForwardContext, ForwardPreprocess};
use super::{respond, strip_hop_by_hop};
use crate::error::RelayError;
use crate::server::router::RelayState;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    response::Response,
};
use tracing::warn;

/// Preflight requests are answered locally and never forwarded; the CORS
/// triple rides in on the response middleware.
pub async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

/// Relays one request: same method, headers copied verbatim (minus Host
/// and hop-by-hop), body streamed out, and the upstream reply streamed
/// back. Transport failures surface as 500; nothing is retried.
pub async fn forward_handler(
    State(state): State<RelayState>,
    ForwardPreprocess(req, ctx): ForwardPreprocess,
) -> Result<Response, RelayError> {
    let upstream_resp = forward_upstream(&state, &ctx, req)
        .await
        .inspect_err(|error| {
            warn!(target = %ctx.target, %error, "Upstream leg failed");
        })?;

    Ok(respond::passthrough_response(upstream_resp))
}

async fn forward_upstream(
    state: &RelayState,
    ctx: &ForwardContext,
    req: Request,
) -> Result<reqwest::Response, RelayError> {
    let (parts, body) = req.into_parts();

    let mut headers = parts.headers;
    let send_body = has_request_body(&headers);

    strip_hop_by_hop(&mut headers);
    // Host is derived from the target URL by the client, which is the
    // rewrite the upstream expects; the inbound value names the relay.
    headers.remove(header::HOST);

    let mut outbound = state
        .client
        .request(parts.method, ctx.target.clone())
        .headers(headers);

    // Bodyless requests must not grow a chunked body on the wire.
    if send_body {
        outbound = outbound.body(reqwest::Body::wrap_stream(body.into_data_stream()));
    }

    Ok(outbound.send().await?)
}

fn has_request_body(headers: &HeaderMap) -> bool {
    if headers.contains_key(header::TRANSFER_ENCODING) {
        return true;
    }
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())
        .is_some_and(|length| length > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn body_presence_follows_framing_headers() {
        let mut headers = HeaderMap::new();
        assert!(!has_request_body(&headers));

        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("0"));
        assert!(!has_request_body(&headers));

        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("42"));
        assert!(has_request_body(&headers));

        let mut chunked = HeaderMap::new();
        chunked.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        assert!(has_request_body(&chunked));
    }
}
