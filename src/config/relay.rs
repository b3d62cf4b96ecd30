use serde::{Deserialize, Serialize};

/// Relay forwarding configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
    /// Request header carrying the upstream target URL.
    /// TOML: `relay.target_url_header`. Default: `x-target-url`.
    #[serde(default = "default_target_url_header")]
    pub target_url_header: String,

    /// Optional connect timeout for the upstream leg, in seconds.
    /// TOML: `relay.connect_timeout_secs`. Default: unset (none imposed).
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,

    /// Optional total timeout for the upstream leg, in seconds. Unset
    /// means a slow upstream may hold its connection open indefinitely.
    /// TOML: `relay.upstream_timeout_secs`. Default: unset.
    #[serde(default)]
    pub upstream_timeout_secs: Option<u64>,

    /// Allow HTTP/2 multiplexing toward upstreams; disabled forces HTTP/1
    /// with one connection per request.
    /// TOML: `relay.enable_multiplexing`. Default: `false`.
    #[serde(default)]
    pub enable_multiplexing: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            target_url_header: default_target_url_header(),
            connect_timeout_secs: None,
            upstream_timeout_secs: None,
            enable_multiplexing: false,
        }
    }
}

fn default_target_url_header() -> String {
    "x-target-url".to_string()
}
