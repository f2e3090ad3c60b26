use alloy::primitives::{Address, B256};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use relay_state::{StateBackend, StateId};
use serde::{Deserialize, Serialize};

use crate::http::{error::ApiError, server::RpcEndpointState};

// ===== TYPES =====

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxRelayStateResponse {
    pub tx_hash: String,
    pub sent_to_relay_at: Option<DateTime<Utc>>,
    pub sender: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRelayStateResponse {
    pub address: String,
    pub last_tx_hash: Option<String>,
    pub nonce_fix_attempts: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash_for_nonce: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AccountQuery {
    pub nonce: Option<u64>,
}

// ===== ROUTE HANDLERS =====

/// What the relay state remembers about one transaction hash.
pub async fn get_tx_relay_state<B: StateBackend>(
    State(state): State<RpcEndpointState<B>>,
    Path(tx_hash): Path<String>,
) -> Result<Json<TxRelayStateResponse>, ApiError> {
    let tx_hash: B256 = tx_hash
        .parse()
        .map_err(|_| ApiError::validation("Invalid transaction hash format"))?;

    let store = &state.relay_state;
    let (sent_to_relay_at, sender) = tokio::try_join!(
        store.sent_to_relay().lookup(&tx_hash),
        store.sender_of_tx_hash().lookup(&tx_hash),
    )?;

    Ok(Json(TxRelayStateResponse {
        tx_hash: tx_hash.state_id(),
        sent_to_relay_at,
        sender,
    }))
}

/// What the relay state remembers about one sender. With `?nonce=` also
/// resolves which hash currently holds that nonce slot.
pub async fn get_account_relay_state<B: StateBackend>(
    State(state): State<RpcEndpointState<B>>,
    Path(address): Path<String>,
    Query(query): Query<AccountQuery>,
) -> Result<Json<AccountRelayStateResponse>, ApiError> {
    let address: Address = address
        .parse()
        .map_err(|_| ApiError::validation("Invalid address format"))?;

    let store = &state.relay_state;
    let (last_tx_hash, nonce_fix_attempts) = tokio::try_join!(
        store.last_tx_hash_of_account().lookup(&address),
        store.nonce_fix().lookup_or_zero(&address),
    )?;

    let tx_hash_for_nonce = match query.nonce {
        Some(nonce) => {
            store
                .tx_hash_for_sender_and_nonce()
                .lookup(&address, nonce)
                .await?
        }
        None => None,
    };

    Ok(Json(AccountRelayStateResponse {
        address: address.state_id(),
        last_tx_hash,
        nonce_fix_attempts,
        nonce: query.nonce,
        tx_hash_for_nonce,
    }))
}
