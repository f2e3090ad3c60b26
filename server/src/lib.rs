pub mod config;
pub mod http;

pub use config::{LogFormat, RpcEndpointConfig, ServerConfig};
pub use http::server::{RpcEndpointServer, RpcEndpointState, build_router};
