pub mod extract;
pub mod handlers;
pub mod respond;

use crate::server::router::RelayState;
use axum::{
    Router,
    http::{HeaderMap, header},
    routing::{MethodRouter, options},
};
use handlers::{forward_handler, preflight_handler};

/// Routing is ignored by design: every path and every method forwards,
/// except OPTIONS, which is answered locally.
fn relay_method_router() -> MethodRouter<RelayState> {
    options(preflight_handler).fallback(forward_handler)
}

pub fn router() -> Router<RelayState> {
    Router::new()
        .route("/", relay_method_router())
        .route("/{*path}", relay_method_router())
}

/// Hop-by-hop headers are connection-scoped and must not cross the relay
/// in either direction.
pub(crate) fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in [
        header::CONNECTION,
        header::PROXY_AUTHENTICATE,
        header::TE,
        header::TRAILER,
        header::TRANSFER_ENCODING,
        header::UPGRADE,
    ] {
        headers.remove(&name);
    }
    headers.remove("keep-alive");
    headers.remove("proxy-connection");
}
