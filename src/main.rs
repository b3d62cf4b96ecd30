use mimalloc::MiMalloc;
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use promptdock::config::Config;
use promptdock::server::{RelayServer, RelayState, relay_router};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::from_optional_toml();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        database_url = %cfg.basic.database_url,
        loglevel = %cfg.basic.loglevel,
        target_url_header = %cfg.relay.target_url_header,
        "Starting promptdock"
    );

    let store = promptdock::db::spawn(&cfg.basic.database_url).await;
    let projects = store.load_projects().await?;
    info!("Loaded {} projects", projects.len());

    let state = RelayState::new(&cfg.relay);
    let app = relay_router(state);

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let relay = RelayServer::bind(addr, app).await?;
    // The assigned port is the value a hosting UI hands to its ChatClient.
    info!("Relay listening on {}", relay.local_addr());

    relay.serve(shutdown_signal()).await?;
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { /* ... */ },
        _ = terminate => { /* ... */ },
    }
}
