use super::strip_hop_by_hop;
use axum::{body::Body, response::Response};

/// Copies the upstream reply onto the inbound response: status and headers
/// verbatim (minus hop-by-hop), body as an unbuffered stream. The relay
/// never inspects or transforms the payload.
pub fn passthrough_response(upstream_resp: reqwest::Response) -> Response {
    let status = upstream_resp.status();
    let mut headers = upstream_resp.headers().clone();
    strip_hop_by_hop(&mut headers);

    let mut resp = Response::new(Body::from_stream(upstream_resp.bytes_stream()));
    *resp.status_mut() = status;
    *resp.headers_mut() = headers;
    resp
}
