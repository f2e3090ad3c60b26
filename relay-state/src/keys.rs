use alloy::primitives::{Address, FixedBytes};

pub const DEFAULT_KEY_PREFIX: &str = "rpc-endpoint";

/// Identifier that can be used as (part of) a relay state key or value.
///
/// Hashes and addresses are always stored as lowercase hex so that a lookup in
/// a different case hits the same entry.
pub trait StateId {
    fn state_id(&self) -> String;
}

impl StateId for str {
    fn state_id(&self) -> String {
        self.to_ascii_lowercase()
    }
}

impl StateId for String {
    fn state_id(&self) -> String {
        self.as_str().state_id()
    }
}

impl StateId for Address {
    fn state_id(&self) -> String {
        format!("{self:#x}")
    }
}

impl<const N: usize> StateId for FixedBytes<N> {
    fn state_id(&self) -> String {
        format!("{self:#x}")
    }
}

/// Key names for the relay state indices, all under one shared prefix.
#[derive(Debug, Clone)]
pub struct RelayStateKeys {
    prefix: String,
}

impl Default for RelayStateKeys {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

impl RelayStateKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix: String = prefix.into();
        Self {
            prefix: prefix.trim_end_matches(':').to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key read once at startup to check that the backend answers
    pub fn liveness_probe_key_name(&self) -> String {
        format!("{}:liveness-probe", self.prefix)
    }

    /// txHash -> unix seconds at which it was first sent to the relay
    pub fn tx_sent_to_relay_key_name(&self, tx_hash: &(impl StateId + ?Sized)) -> String {
        format!("{}:tx-sent-to-relay:{}", self.prefix, tx_hash.state_id())
    }

    /// (sender, nonce) -> txHash currently bound to that nonce slot
    pub fn tx_hash_for_sender_and_nonce_key_name(
        &self,
        sender: &(impl StateId + ?Sized),
        nonce: u64,
    ) -> String {
        format!(
            "{}:txsender-and-nonce-to-txhash:{}_{nonce}",
            self.prefix,
            sender.state_id()
        )
    }

    /// sender -> number of nonce-fix attempts
    pub fn nonce_fix_for_account_key_name(&self, account: &(impl StateId + ?Sized)) -> String {
        format!("{}:txsender-with-nonce-fix:{}", self.prefix, account.state_id())
    }

    /// txHash -> sender
    pub fn sender_of_tx_hash_key_name(&self, tx_hash: &(impl StateId + ?Sized)) -> String {
        format!("{}:txsender-of-txhash:{}", self.prefix, tx_hash.state_id())
    }

    /// sender -> most recent txHash
    pub fn last_tx_hash_of_account_key_name(&self, sender: &(impl StateId + ?Sized)) -> String {
        format!("{}:last-txhash-of-txsender:{}", self.prefix, sender.state_id())
    }
}
