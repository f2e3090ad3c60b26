use std::sync::Arc;

use relay_state::{Clock, ManualClock, MemoryBackend, RelayStateKeys, RelayStateStore};
use rpc_endpoint::{RpcEndpointServer, RpcEndpointState};
use serde_json::{Value, json};

fn server() -> RpcEndpointServer {
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::from_unix_seconds(1_700_000_000));
    let store = RelayStateStore::with_backend(
        MemoryBackend::new(clock.clone()),
        RelayStateKeys::new("lifecycle-test"),
        clock.clone(),
    );
    RpcEndpointServer::new(RpcEndpointState {
        version: "test-version",
        clock,
        relay_state: Arc::new(store),
    })
}

#[tokio::test]
async fn test_server_serves_until_shutdown() {
    let mut server = server();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = server.start(listener).unwrap();
    let health_url = format!("http://{addr}/health");

    let response = reqwest::get(&health_url).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({"time": "2023-11-14T22:13:20Z", "version": "test-version"})
    );

    server.shutdown().await.unwrap();

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap();
    assert!(client.get(&health_url).send().await.is_err());
}

#[tokio::test]
async fn test_shutdown_without_start_is_noop() {
    let mut server = server();
    server.shutdown().await.unwrap();
    server.shutdown().await.unwrap();
}
