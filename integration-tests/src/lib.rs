//! Test support for the rpc endpoint: a stand-in Ethereum JSON-RPC node that
//! answers the handful of methods the gateway flows need.

pub mod jsonrpc;
pub mod rpc_backend;

pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use rpc_backend::{MockRpcBackend, MockRpcError, MockRpcMethod, RecordedRequest};
