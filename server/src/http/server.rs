use std::{net::SocketAddr, sync::Arc};

use axum::{Router, routing::get};
use relay_state::{Clock, RedisBackend, RelayStateStore, StateBackend};
use tokio::{sync::watch, task::JoinHandle};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::routes::{admin::relay_diagnostics, health::health};

pub struct RpcEndpointState<B = RedisBackend> {
    pub version: &'static str,
    pub clock: Arc<dyn Clock>,
    pub relay_state: Arc<RelayStateStore<B>>,
}

impl<B> Clone for RpcEndpointState<B> {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            clock: self.clock.clone(),
            relay_state: self.relay_state.clone(),
        }
    }
}

pub fn build_router<B: StateBackend>(state: RpcEndpointState<B>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_credentials(false);

    Router::new()
        .route("/health", get(health::<B>))
        .route(
            "/admin/relay-state/tx/{tx_hash}",
            get(relay_diagnostics::get_tx_relay_state::<B>),
        )
        .route(
            "/admin/relay-state/account/{address}",
            get(relay_diagnostics::get_account_relay_state::<B>),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Owns the HTTP task. `start` binds nothing itself, so callers pick the
/// listener (tests use an ephemeral port).
pub struct RpcEndpointServer {
    app: Router,
    running: Option<RunningServer>,
}

struct RunningServer {
    stop: watch::Sender<bool>,
    task: JoinHandle<std::io::Result<()>>,
}

impl RpcEndpointServer {
    pub fn new<B: StateBackend>(state: RpcEndpointState<B>) -> Self {
        Self {
            app: build_router(state),
            running: None,
        }
    }

    pub fn start(&mut self, listener: tokio::net::TcpListener) -> std::io::Result<SocketAddr> {
        let local_addr = listener.local_addr()?;
        let (stop, mut stop_rx) = watch::channel(false);
        let app = self.app.clone();

        let task = tokio::spawn(async move {
            tracing::info!(%local_addr, "HTTP server listening");
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    // a dropped sender also stops the server
                    let _ = stop_rx.wait_for(|stopped| *stopped).await;
                    tracing::info!("HTTP server draining connections");
                })
                .await
        });

        self.running = Some(RunningServer { stop, task });
        Ok(local_addr)
    }

    /// Stop accepting connections and wait for in-flight requests. A no-op
    /// if the server was never started.
    pub async fn shutdown(&mut self) -> std::io::Result<()> {
        let Some(RunningServer { stop, task }) = self.running.take() else {
            return Ok(());
        };
        stop.send_replace(true);

        task.await
            .map_err(|e| std::io::Error::other(format!("HTTP server task failed: {e}")))?
            .inspect_err(|e| tracing::error!(error = %e, "HTTP server exited with error"))
    }
}
