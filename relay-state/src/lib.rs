//! Relay state: TTL-indexed lookup tables shared by the gateway's request
//! handlers.
//!
//! Five independent indices live under one key prefix:
//!
//! | index | key | value | ttl |
//! |---|---|---|---|
//! | [`sent_to_relay`](RelayStateStore::sent_to_relay) | tx hash | unix seconds | 24h |
//! | [`tx_hash_for_sender_and_nonce`](RelayStateStore::tx_hash_for_sender_and_nonce) | sender + nonce | tx hash | 24h |
//! | [`nonce_fix`](RelayStateStore::nonce_fix) | sender | attempts | 2h |
//! | [`sender_of_tx_hash`](RelayStateStore::sender_of_tx_hash) | tx hash | sender | 24h |
//! | [`last_tx_hash_of_account`](RelayStateStore::last_tx_hash_of_account) | sender | tx hash | 24h |
//!
//! Lookups return `Ok(None)` for a missing or expired key; errors are reserved
//! for transport failures and values that do not parse.

pub mod backend;
pub mod clock;
pub mod error;
pub mod indices;
pub mod keys;
pub mod lifecycle;
pub mod store;

pub use backend::{MemoryBackend, RedisBackend, StateBackend};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{RelayStateError, RelayStateResult};
pub use keys::{RelayStateKeys, StateId};
pub use lifecycle::{RelayStatus, RelaySubmission};
pub use store::{RelayStateConfig, RelayStateStore};

pub use redis;
