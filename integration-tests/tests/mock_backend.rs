use std::sync::Arc;

use integration_tests::{MockRpcBackend, MockRpcMethod, jsonrpc::METHOD_NOT_FOUND};
use relay_state::{Clock, ManualClock};
use serde_json::{Value, json};

const FAILED_RAW_TX: &str = "0xf86c808504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83";
const FAILED_TX_HASH: &str = "0xfb4c8f5f9cfe2b6d3b35ad5c3b3e1c4f4f0c0b7b2b0a7b8c9d0e1f2a3b4c5d6e";

async fn spawn_backend() -> (Arc<MockRpcBackend>, String) {
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::from_unix_seconds(1_700_000_000));
    let backend = Arc::new(MockRpcBackend::new(clock, FAILED_RAW_TX, FAILED_TX_HASH));
    let (addr, _handle) = backend.clone().spawn().await.expect("Failed to spawn backend");
    (backend, format!("http://{addr}/"))
}

async fn call(url: &str, body: Value) -> (reqwest::header::HeaderMap, Value) {
    let response = reqwest::Client::new()
        .post(url)
        .header("Test", "some-test")
        .json(&body)
        .send()
        .await
        .unwrap();
    let headers = response.headers().clone();
    (headers, response.json().await.unwrap())
}

#[tokio::test]
async fn test_known_methods_answer() {
    let (backend, url) = spawn_backend().await;

    let (headers, body) = call(
        &url,
        json!({"jsonrpc": "2.0", "id": 1, "method": "eth_getTransactionCount", "params": ["0xabc", "latest"]}),
    )
    .await;
    assert_eq!(body, json!({"jsonrpc": "2.0", "id": 1, "result": "0x22"}));
    assert_eq!(headers.get("test").unwrap(), "some-test");

    let (_, body) = call(&url, json!({"jsonrpc": "2.0", "id": 2, "method": "net_version"})).await;
    assert_eq!(body["result"], json!("3"));

    let (_, body) = call(
        &url,
        json!({"jsonrpc": "2.0", "id": 3, "method": "eth_getBundleStatusByTransactionHash", "params": [FAILED_TX_HASH]}),
    )
    .await;
    assert_eq!(
        body["result"],
        json!({"txHash": FAILED_TX_HASH, "status": "FAILED_BUNDLE"})
    );

    let last = backend.last_request().await.unwrap();
    assert_eq!(last.request.method, "eth_getBundleStatusByTransactionHash");
    assert_eq!(last.test_header.as_deref(), Some("some-test"));
    assert_eq!(last.received_at.timestamp(), 1_700_000_000);
    assert_eq!(backend.requests().await.len(), 3);
}

#[tokio::test]
async fn test_null_result_differs_from_unhandled_method() {
    let (_, url) = spawn_backend().await;

    let (_, null) = call(&url, json!({"jsonrpc": "2.0", "id": 1, "method": "null"})).await;
    assert_eq!(null, json!({"jsonrpc": "2.0", "id": 1, "result": null}));

    let (_, receipt) = call(
        &url,
        json!({"jsonrpc": "2.0", "id": 2, "method": "eth_getTransactionReceipt", "params": ["0x1"]}),
    )
    .await;
    assert_eq!(receipt["result"], Value::Null);
    assert!(receipt.get("error").is_none());

    let (_, unhandled) = call(&url, json!({"jsonrpc": "2.0", "id": 3, "method": "eth_chainId"})).await;
    assert!(unhandled.get("result").is_none());
    assert_eq!(unhandled["error"]["code"], json!(METHOD_NOT_FOUND));
    assert_eq!(
        unhandled["error"]["message"],
        json!("no RPC method handler implemented for eth_chainId")
    );
}

#[tokio::test]
async fn test_private_transaction_and_parse_errors() {
    let (backend, url) = spawn_backend().await;

    let (_, body) = call(
        &url,
        json!({"jsonrpc": "2.0", "id": 1, "method": "eth_sendPrivateTransaction", "params": [{"tx": FAILED_RAW_TX}]}),
    )
    .await;
    assert_eq!(body["result"], json!(FAILED_TX_HASH));
    assert_eq!(
        backend
            .count_calls(MockRpcMethod::SendPrivateTransaction)
            .await,
        1
    );

    let response = reqwest::Client::new()
        .post(&url)
        .body("{not json")
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], json!(-32700));
    assert_eq!(body["id"], json!(-1));
}
