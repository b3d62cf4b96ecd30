pub mod router;
pub mod routes;

pub use router::{RelayState, relay_router};

use axum::Router;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// A relay bound to its listen address but not yet serving.
///
/// Binding and serving are split so the starter can learn the OS-assigned
/// port (listen_port 0) before the first request is accepted.
pub struct RelayServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    app: Router,
}

impl RelayServer {
    pub async fn bind(addr: SocketAddr, app: Router) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
            app,
        })
    }

    /// The bound address; a hosting process hands this to its `ChatClient`.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves until `shutdown` resolves. In-flight upstream legs are
    /// abandoned on shutdown; there is no drain or rebind path.
    pub async fn serve<F>(self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
