use std::sync::Arc;

use relay_state::{Clock, RelayStateStore, SystemClock};
use rpc_endpoint::{
    config,
    http::server::{RpcEndpointServer, RpcEndpointState},
};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::get_config()?;

    let subscriber = tracing_subscriber::registry().with(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Default to debug for our crates if RUST_LOG environment variable is not set
            "rpc_endpoint=debug,relay_state=debug,tower_http=debug,axum=debug".into()
        }),
    );

    match config.server.log_format {
        config::LogFormat::Json => subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        config::LogFormat::Pretty => subscriber.with(tracing_subscriber::fmt::layer()).init(),
    }

    let version = env!("CARGO_PKG_VERSION");
    tracing::info!(version, "Starting rpc endpoint");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Fails here, not on the first request, if Redis is unreachable or rejects auth
    let relay_state = RelayStateStore::connect(&config.redis, clock.clone()).await?;
    tracing::info!("Relay state store initialized");

    let mut server = RpcEndpointServer::new(RpcEndpointState {
        version,
        clock,
        relay_state: Arc::new(relay_state),
    });

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    let local_addr = server.start(listener)?;

    tracing::info!(%local_addr, "Server started, waiting for shutdown signal");
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
    }
    tracing::info!("Shutdown signal received");

    if let Err(e) = server.shutdown().await {
        tracing::error!("Error during shutdown: {}", e);
    } else {
        tracing::info!("Server shut down successfully");
    }

    Ok(())
}
