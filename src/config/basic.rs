use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

/// Basic (core) configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicConfig {
    /// HTTP listen address for the relay. The relay trusts every caller,
    /// so binding anything other than loopback widens who can reach it.
    /// TOML: `basic.listen_addr`. Default: `127.0.0.1`.
    #[serde(default = "default_listen_ip")]
    pub listen_addr: IpAddr,

    /// HTTP listen port. Port 0 asks the OS for an ephemeral port; the
    /// assigned port is read back from `RelayServer::local_addr`.
    /// TOML: `basic.listen_port`. Default: `0`.
    #[serde(default)]
    pub listen_port: u16,

    /// Database URL for SQLite.
    /// TOML: `basic.database_url`. Default: `sqlite://promptdock.db`.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Log level for tracing subscriber initialization (e.g., "error", "warn", "info", "debug", "trace").
    /// TOML: `basic.loglevel`. Default: `info`.
    #[serde(default = "default_loglevel")]
    pub loglevel: String,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_ip(),
            listen_port: 0,
            database_url: default_database_url(),
            loglevel: default_loglevel(),
        }
    }
}

/// Default listen address; loopback keeps the relay local-only.
fn default_listen_ip() -> IpAddr {
    Ipv4Addr::new(127, 0, 0, 1).into()
}

fn default_database_url() -> String {
    "sqlite://promptdock.db".to_string()
}

fn default_loglevel() -> String {
    "info".to_string()
}
