use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue},
    routing::post,
};
use chrono::{DateTime, Utc};
use relay_state::Clock;
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::Mutex, task::JoinHandle};

use crate::jsonrpc::{
    INVALID_PARAMS, JsonRpcRequest, JsonRpcResponse, METHOD_NOT_FOUND, PARSE_ERROR,
};

pub const TEST_HEADER: &str = "test";

/// Methods the mock node knows. Anything else is [`MockRpcError::MethodNotFound`],
/// never an empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockRpcMethod {
    GetTransactionCount,
    Call,
    GetTransactionReceipt,
    SendRawTransaction,
    SendPrivateTransaction,
    NetVersion,
    Null,
    GetBundleStatusByTransactionHash,
}

impl MockRpcMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MockRpcMethod::GetTransactionCount => "eth_getTransactionCount",
            MockRpcMethod::Call => "eth_call",
            MockRpcMethod::GetTransactionReceipt => "eth_getTransactionReceipt",
            MockRpcMethod::SendRawTransaction => "eth_sendRawTransaction",
            MockRpcMethod::SendPrivateTransaction => "eth_sendPrivateTransaction",
            MockRpcMethod::NetVersion => "net_version",
            MockRpcMethod::Null => "null",
            MockRpcMethod::GetBundleStatusByTransactionHash => {
                "eth_getBundleStatusByTransactionHash"
            }
        }
    }
}

impl FromStr for MockRpcMethod {
    type Err = MockRpcError;

    fn from_str(method: &str) -> Result<Self, Self::Err> {
        Ok(match method {
            "eth_getTransactionCount" => MockRpcMethod::GetTransactionCount,
            "eth_call" => MockRpcMethod::Call,
            "eth_getTransactionReceipt" => MockRpcMethod::GetTransactionReceipt,
            "eth_sendRawTransaction" => MockRpcMethod::SendRawTransaction,
            "eth_sendPrivateTransaction" => MockRpcMethod::SendPrivateTransaction,
            "net_version" => MockRpcMethod::NetVersion,
            "null" => MockRpcMethod::Null,
            "eth_getBundleStatusByTransactionHash" => {
                MockRpcMethod::GetBundleStatusByTransactionHash
            }
            other => return Err(MockRpcError::MethodNotFound(other.to_string())),
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MockRpcError {
    #[error("no RPC method handler implemented for {0}")]
    MethodNotFound(String),

    #[error("invalid params for {method}: {reason}")]
    InvalidParams {
        method: &'static str,
        reason: String,
    },
}

impl MockRpcError {
    pub fn code(&self) -> i64 {
        match self {
            MockRpcError::MethodNotFound(_) => METHOD_NOT_FOUND,
            MockRpcError::InvalidParams { .. } => INVALID_PARAMS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub request: JsonRpcRequest,
    pub test_header: Option<String>,
    pub received_at: DateTime<Utc>,
}

/// In-process Ethereum JSON-RPC node with canned answers.
///
/// Every parsed request is recorded with the injected clock's time so tests
/// can assert on what the gateway forwarded, and when.
pub struct MockRpcBackend {
    clock: Arc<dyn Clock>,
    failed_bundle_raw_tx: String,
    failed_bundle_tx_hash: String,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockRpcBackend {
    pub fn new(
        clock: Arc<dyn Clock>,
        failed_bundle_raw_tx: impl Into<String>,
        failed_bundle_tx_hash: impl Into<String>,
    ) -> Self {
        Self {
            clock,
            failed_bundle_raw_tx: failed_bundle_raw_tx.into(),
            failed_bundle_tx_hash: failed_bundle_tx_hash.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn dispatch(&self, request: &JsonRpcRequest) -> Result<Value, MockRpcError> {
        let method: MockRpcMethod = request.method.parse()?;

        let result = match method {
            MockRpcMethod::GetTransactionCount => json!("0x22"),
            MockRpcMethod::Call => json!("0x12345"),
            // unknown receipts are null on a real node too
            MockRpcMethod::GetTransactionReceipt => Value::Null,
            MockRpcMethod::SendRawTransaction => json!("tx-hash1"),
            MockRpcMethod::SendPrivateTransaction => {
                let raw_tx = request
                    .params
                    .first()
                    .and_then(|param| param.get("tx"))
                    .and_then(Value::as_str)
                    .ok_or_else(|| MockRpcError::InvalidParams {
                        method: method.as_str(),
                        reason: "expected [{\"tx\": <raw tx>}]".to_string(),
                    })?;

                if raw_tx == self.failed_bundle_raw_tx {
                    json!(self.failed_bundle_tx_hash)
                } else {
                    json!("tx-hash2")
                }
            }
            MockRpcMethod::NetVersion => json!("3"),
            MockRpcMethod::Null => Value::Null,
            MockRpcMethod::GetBundleStatusByTransactionHash => json!({
                "txHash": self.failed_bundle_tx_hash,
                "status": "FAILED_BUNDLE",
            }),
        };

        Ok(result)
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().await.last().cloned()
    }

    pub async fn count_calls(&self, method: MockRpcMethod) -> usize {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|recorded| recorded.request.method == method.as_str())
            .count()
    }

    pub fn router(self: Arc<Self>) -> Router {
        Router::new().route("/", post(handle_rpc)).with_state(self)
    }

    /// Serve on an ephemeral localhost port.
    pub async fn spawn(self: Arc<Self>) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = self.router();

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Mock RPC backend stopped: {}", e);
            }
        });

        tracing::info!("Mock RPC backend listening on {}", addr);
        Ok((addr, handle))
    }
}

async fn handle_rpc(
    State(backend): State<Arc<MockRpcBackend>>,
    headers: HeaderMap,
    body: Bytes,
) -> (HeaderMap, Json<JsonRpcResponse>) {
    let test_header = headers
        .get(TEST_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let mut response_headers = HeaderMap::new();
    if let Some(value) = test_header
        .as_deref()
        .and_then(|value| HeaderValue::from_str(value).ok())
    {
        response_headers.insert(TEST_HEADER, value);
    }

    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Mock RPC backend got unparseable request: {}", e);
            return (
                response_headers,
                Json(JsonRpcResponse::error(
                    json!(-1),
                    PARSE_ERROR,
                    format!("failed to parse JSON RPC request: {e}"),
                )),
            );
        }
    };

    backend.requests.lock().await.push(RecordedRequest {
        request: request.clone(),
        test_header,
        received_at: backend.clock.now(),
    });

    let response = match backend.dispatch(&request) {
        Ok(result) => JsonRpcResponse::result(request.id, result),
        Err(e) => {
            tracing::debug!(method = %request.method, error = %e, "Mock RPC backend error");
            JsonRpcResponse::error(request.id, e.code(), e.to_string())
        }
    };

    (response_headers, Json(response))
}
