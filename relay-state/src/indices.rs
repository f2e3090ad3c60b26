use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::{
    backend::StateBackend,
    error::{RelayStateError, RelayStateResult},
    keys::StateId,
    store::RelayStateStore,
};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Covers the window in which a forwarded transaction may be disputed or replaced
pub const TX_SENT_TO_RELAY_TTL: Duration = DAY;
pub const TX_HASH_FOR_SENDER_AND_NONCE_TTL: Duration = DAY;
/// Roughly how long a stuck transaction lingers in mempools
pub const NONCE_FIX_FOR_ACCOUNT_TTL: Duration = Duration::from_secs(2 * 60 * 60);
pub const SENDER_OF_TX_HASH_TTL: Duration = DAY;
pub const LAST_TX_HASH_OF_ACCOUNT_TTL: Duration = DAY;

/// Index handles only borrow the store, so they are `Copy` whatever the backend.
macro_rules! impl_index_handle {
    ($name:ident) => {
        impl<B> Clone for $name<'_, B> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<B> Copy for $name<'_, B> {}
    };
}

impl<B: StateBackend> RelayStateStore<B> {
    /// txHash -> time it was first forwarded to the relay
    pub fn sent_to_relay(&self) -> SentToRelayIndex<'_, B> {
        SentToRelayIndex { store: self }
    }

    /// (sender, nonce) -> txHash currently occupying that nonce slot
    pub fn tx_hash_for_sender_and_nonce(&self) -> SenderNonceIndex<'_, B> {
        SenderNonceIndex { store: self }
    }

    /// sender -> nonce-fix attempts so far
    pub fn nonce_fix(&self) -> NonceFixCounter<'_, B> {
        NonceFixCounter { store: self }
    }

    /// txHash -> sender
    pub fn sender_of_tx_hash(&self) -> SenderIndex<'_, B> {
        SenderIndex { store: self }
    }

    /// sender -> most recent txHash
    pub fn last_tx_hash_of_account(&self) -> LastTxHashIndex<'_, B> {
        LastTxHashIndex { store: self }
    }
}

/// Dedup index for relay forwarding.
///
/// A hit means the hash was already sent to the relay at the returned time; a
/// miss means it was never sent, or the record expired, and the caller is free
/// to forward it.
pub struct SentToRelayIndex<'a, B> {
    store: &'a RelayStateStore<B>,
}

impl_index_handle!(SentToRelayIndex);

impl<B: StateBackend> SentToRelayIndex<'_, B> {
    /// Stamp `tx_hash` with the current time. Re-recording overwrites the
    /// timestamp and restarts the TTL.
    pub async fn record(self, tx_hash: &(impl StateId + ?Sized)) -> RelayStateResult<()> {
        let key = self.store.keys().tx_sent_to_relay_key_name(tx_hash);
        let sent_at = self.store.clock().now().timestamp();
        self.store
            .write(&key, &sent_at.to_string(), TX_SENT_TO_RELAY_TTL)
            .await
    }

    pub async fn lookup(
        self,
        tx_hash: &(impl StateId + ?Sized),
    ) -> RelayStateResult<Option<DateTime<Utc>>> {
        let key = self.store.keys().tx_sent_to_relay_key_name(tx_hash);
        let Some(seconds) = self.store.read_parsed::<i64>(&key).await? else {
            return Ok(None);
        };

        DateTime::from_timestamp(seconds, 0)
            .map(Some)
            .ok_or_else(|| RelayStateError::InvalidValue {
                key,
                value: seconds.to_string(),
                reason: "timestamp out of range".to_string(),
            })
    }
}

/// Replacement detection. Whoever records last owns the nonce slot.
pub struct SenderNonceIndex<'a, B> {
    store: &'a RelayStateStore<B>,
}

impl_index_handle!(SenderNonceIndex);

impl<B: StateBackend> SenderNonceIndex<'_, B> {
    pub async fn record(
        self,
        sender: &(impl StateId + ?Sized),
        nonce: u64,
        tx_hash: &(impl StateId + ?Sized),
    ) -> RelayStateResult<()> {
        let key = self
            .store
            .keys()
            .tx_hash_for_sender_and_nonce_key_name(sender, nonce);
        self.store
            .write(&key, &tx_hash.state_id(), TX_HASH_FOR_SENDER_AND_NONCE_TTL)
            .await
    }

    pub async fn lookup(
        self,
        sender: &(impl StateId + ?Sized),
        nonce: u64,
    ) -> RelayStateResult<Option<String>> {
        let key = self
            .store
            .keys()
            .tx_hash_for_sender_and_nonce_key_name(sender, nonce);
        self.store.read(&key).await
    }
}

/// Nonce-fix attempts per account.
///
/// Holds an absolute count computed by the caller; nothing here increments.
pub struct NonceFixCounter<'a, B> {
    store: &'a RelayStateStore<B>,
}

impl_index_handle!(NonceFixCounter);

impl<B: StateBackend> NonceFixCounter<'_, B> {
    pub async fn record(
        self,
        account: &(impl StateId + ?Sized),
        attempts: u64,
    ) -> RelayStateResult<()> {
        let key = self.store.keys().nonce_fix_for_account_key_name(account);
        self.store
            .write(&key, &attempts.to_string(), NONCE_FIX_FOR_ACCOUNT_TTL)
            .await
    }

    /// Clear the counter once the stuck transaction is resolved, so the next
    /// episode starts from zero.
    pub async fn delete(self, account: &(impl StateId + ?Sized)) -> RelayStateResult<()> {
        let key = self.store.keys().nonce_fix_for_account_key_name(account);
        self.store.delete(&key).await
    }

    pub async fn lookup(self, account: &(impl StateId + ?Sized)) -> RelayStateResult<Option<u64>> {
        let key = self.store.keys().nonce_fix_for_account_key_name(account);
        self.store.read_parsed::<u64>(&key).await
    }

    pub async fn lookup_or_zero(self, account: &(impl StateId + ?Sized)) -> RelayStateResult<u64> {
        Ok(self.lookup(account).await?.unwrap_or(0))
    }
}

/// Who sent a hash, without re-parsing the signed transaction.
pub struct SenderIndex<'a, B> {
    store: &'a RelayStateStore<B>,
}

impl_index_handle!(SenderIndex);

impl<B: StateBackend> SenderIndex<'_, B> {
    pub async fn record(
        self,
        tx_hash: &(impl StateId + ?Sized),
        sender: &(impl StateId + ?Sized),
    ) -> RelayStateResult<()> {
        let key = self.store.keys().sender_of_tx_hash_key_name(tx_hash);
        self.store
            .write(&key, &sender.state_id(), SENDER_OF_TX_HASH_TTL)
            .await
    }

    pub async fn lookup(self, tx_hash: &(impl StateId + ?Sized)) -> RelayStateResult<Option<String>> {
        let key = self.store.keys().sender_of_tx_hash_key_name(tx_hash);
        self.store.read(&key).await
    }
}

pub struct LastTxHashIndex<'a, B> {
    store: &'a RelayStateStore<B>,
}

impl_index_handle!(LastTxHashIndex);

impl<B: StateBackend> LastTxHashIndex<'_, B> {
    pub async fn record(
        self,
        sender: &(impl StateId + ?Sized),
        tx_hash: &(impl StateId + ?Sized),
    ) -> RelayStateResult<()> {
        let key = self.store.keys().last_tx_hash_of_account_key_name(sender);
        self.store
            .write(&key, &tx_hash.state_id(), LAST_TX_HASH_OF_ACCOUNT_TTL)
            .await
    }

    pub async fn lookup(self, sender: &(impl StateId + ?Sized)) -> RelayStateResult<Option<String>> {
        let key = self.store.keys().last_tx_hash_of_account_key_name(sender);
        self.store.read(&key).await
    }
}
