use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use relay_state::{Clock, StateBackend};
use serde::Serialize;

use crate::http::server::RpcEndpointState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub time: DateTime<Utc>,
    pub version: String,
}

/// Liveness of the HTTP process. Does not touch the relay state.
pub async fn health<B: StateBackend>(
    State(state): State<RpcEndpointState<B>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        time: state.clock.now(),
        version: state.version.to_string(),
    })
}
